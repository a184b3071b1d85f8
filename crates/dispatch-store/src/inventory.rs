//! In-memory item and category repositories.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use dispatch_core::{
    Category, CategoryRepository, CreateCategoryRequest, CreateItemRequest, Error, Item,
    ItemRepository, Result, UpdateCategoryRequest, UpdateItemRequest,
};
use tracing::debug;

use crate::table::{shared, Shared, Table};

// =============================================================================
// ITEMS
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryItemRepository {
    table: Shared<Item>,
}

impl MemoryItemRepository {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            table: shared(items.into_iter().map(|i| (i.id, i))),
        }
    }
}

impl Default for MemoryItemRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn item_not_found(id: i64) -> Error {
    Error::NotFound(format!("Item {}", id))
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn list(&self) -> Result<Vec<Item>> {
        Ok(self.table.read().await.to_vec())
    }

    async fn fetch(&self, id: i64) -> Result<Item> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| item_not_found(id))
    }

    async fn insert(&self, req: CreateItemRequest) -> Result<Item> {
        let now = Utc::now();
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let item = Item {
            id,
            name: req.name,
            sku: req.sku,
            weight_lbs: req.weight_lbs,
            length_in: req.length_in,
            width_in: req.width_in,
            height_in: req.height_in,
            notes: req.notes,
            requires_large_truck: req.requires_large_truck,
            category_id: req.category_id,
            created_at: now,
            updated_at: now,
        };
        table.put(id, item.clone());
        debug!(item_id = id, category_id = ?item.category_id, "Inserted item");
        Ok(item)
    }

    async fn update(&self, id: i64, req: UpdateItemRequest) -> Result<Item> {
        let mut table = self.table.write().await;
        let item = table.get_mut(id).ok_or_else(|| item_not_found(id))?;
        if let Some(v) = req.name {
            item.name = v;
        }
        if let Some(v) = req.sku {
            item.sku = Some(v);
        }
        if let Some(v) = req.weight_lbs {
            item.weight_lbs = Some(v);
        }
        if let Some(v) = req.notes {
            item.notes = Some(v);
        }
        if let Some(v) = req.requires_large_truck {
            item.requires_large_truck = v;
        }
        if let Some(v) = req.category_id {
            item.category_id = Some(v);
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.table
            .write()
            .await
            .remove(id)
            .map(|_| debug!(item_id = id, "Deleted item"))
            .ok_or_else(|| item_not_found(id))
    }

    async fn uncategorize(&self, category_ids: &[i64]) -> Result<usize> {
        let ids: HashSet<i64> = category_ids.iter().copied().collect();
        let now = Utc::now();
        let mut table = self.table.write().await;
        let mut touched = 0;
        for item in table.values_mut() {
            if item.category_id.is_some_and(|c| ids.contains(&c)) {
                item.category_id = None;
                item.updated_at = now;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

// =============================================================================
// CATEGORIES
// =============================================================================

#[derive(Debug, Clone)]
pub struct MemoryCategoryRepository {
    table: Shared<Category>,
}

impl MemoryCategoryRepository {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            table: shared(categories.into_iter().map(|c| (c.id, c))),
        }
    }
}

impl Default for MemoryCategoryRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn category_not_found(id: i64) -> Error {
    Error::NotFound(format!("Category {}", id))
}

/// `id` and every category nested beneath it, breadth-first.
fn subtree(table: &Table<Category>, id: i64) -> Vec<i64> {
    let mut out = vec![id];
    let mut cursor = 0;
    while cursor < out.len() {
        let parent = out[cursor];
        out.extend(
            table
                .values()
                .filter(|c| c.parent_id == Some(parent) && !out.contains(&c.id))
                .map(|c| c.id)
                .collect::<Vec<_>>(),
        );
        cursor += 1;
    }
    out
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.table.read().await.to_vec())
    }

    async fn fetch(&self, id: i64) -> Result<Category> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| category_not_found(id))
    }

    async fn insert(&self, req: CreateCategoryRequest) -> Result<Category> {
        let mut table = self.table.write().await;
        if let Some(parent) = req.parent_id {
            if table.get(parent).is_none() {
                return Err(Error::InvalidInput(format!(
                    "parent category {} does not exist",
                    parent
                )));
            }
        }
        let now = Utc::now();
        let id = table.allocate_id();
        let category = Category {
            id,
            name: req.name,
            description: req.description,
            parent_id: req.parent_id,
            created_at: now,
            updated_at: now,
        };
        table.put(id, category.clone());
        debug!(category_id = id, parent_id = ?category.parent_id, "Inserted category");
        Ok(category)
    }

    async fn update(&self, id: i64, req: UpdateCategoryRequest) -> Result<Category> {
        let mut table = self.table.write().await;
        if table.get(id).is_none() {
            return Err(category_not_found(id));
        }
        if let Some(parent) = req.parent_id {
            if table.get(parent).is_none() {
                return Err(Error::InvalidInput(format!(
                    "parent category {} does not exist",
                    parent
                )));
            }
            if subtree(&table, id).contains(&parent) {
                return Err(Error::InvalidInput(
                    "a category cannot be moved under itself".to_string(),
                ));
            }
        }
        let category = table.get_mut(id).ok_or_else(|| category_not_found(id))?;
        if let Some(v) = req.name {
            category.name = v;
        }
        if let Some(v) = req.description {
            category.description = v;
        }
        if let Some(v) = req.parent_id {
            category.parent_id = Some(v);
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_subtree(&self, id: i64) -> Result<Vec<i64>> {
        let mut table = self.table.write().await;
        if table.get(id).is_none() {
            return Err(category_not_found(id));
        }
        let removed = subtree(&table, id);
        for cid in &removed {
            table.remove(*cid);
        }
        debug!(category_id = id, removed = removed.len(), "Deleted category subtree");
        Ok(removed)
    }
}
