use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Rows keyed by id with a monotonically increasing id counter.
#[derive(Debug)]
pub(crate) struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    pub(crate) fn new(rows: impl IntoIterator<Item = (i64, T)>) -> Self {
        let rows: BTreeMap<i64, T> = rows.into_iter().collect();
        let next_id = rows.keys().next_back().map_or(1, |max| max + 1);
        Self { rows, next_id }
    }

    pub(crate) fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub(crate) fn put(&mut self, id: i64, row: T) {
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        self.rows.insert(id, row);
    }

    pub(crate) fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Rows in id order.
    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub(crate) fn to_vec(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

pub(crate) type Shared<T> = Arc<RwLock<Table<T>>>;

pub(crate) fn shared<T: Clone>(rows: impl IntoIterator<Item = (i64, T)>) -> Shared<T> {
    Arc::new(RwLock::new(Table::new(rows)))
}
