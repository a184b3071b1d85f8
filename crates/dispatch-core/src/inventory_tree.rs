//! Category → item tree and the selection state layered on top of it.
//!
//! The tree is an arena: nodes live in a flat vector and refer to each other
//! by index, with a key → index map for id lookups. Selection is kept apart
//! from the tree in [`TreeSelection`] so a re-fetched tree can be swapped in
//! without losing what the planner picked.
//!
//! Only items are selectable. Categories carry an expanded/collapsed flag and
//! a derived [`SelectionState`] computed from the items beneath them.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Category, CategoryWithItems, Item};

/// Identity of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKey {
    Category(i64),
    Item(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Category {
        description: String,
    },
    Item {
        sku: Option<String>,
        requires_large_truck: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl TreeNode {
    pub fn is_category(&self) -> bool {
        matches!(self.kind, NodeKind::Category { .. })
    }

    fn sku(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Item { sku, .. } => sku.as_deref(),
            NodeKind::Category { .. } => None,
        }
    }
}

/// Arena-backed inventory tree.
#[derive(Debug, Clone, Default)]
pub struct InventoryTree {
    nodes: Vec<TreeNode>,
    index: HashMap<NodeKey, usize>,
    roots: Vec<usize>,
}

impl InventoryTree {
    /// Build the tree from flat category and item lists.
    ///
    /// Categories nest through `parent_id`; a category whose parent is unknown
    /// or whose link would close a cycle becomes a root. Items hang under
    /// their category, or at the root when uncategorized. Children are
    /// ordered sub-categories first, then items, each in input order.
    pub fn build(categories: &[Category], items: &[Item]) -> Self {
        let mut tree = Self::default();

        for category in categories {
            if tree.index.contains_key(&NodeKey::Category(category.id)) {
                continue;
            }
            tree.push(TreeNode {
                key: NodeKey::Category(category.id),
                name: category.name.clone(),
                kind: NodeKind::Category {
                    description: category.description.clone(),
                },
                parent: None,
                children: Vec::new(),
            });
        }

        for category in categories {
            let idx = tree.index[&NodeKey::Category(category.id)];
            if tree.nodes[idx].parent.is_some() || tree.roots.contains(&idx) {
                continue;
            }
            let parent = category
                .parent_id
                .and_then(|pid| tree.index.get(&NodeKey::Category(pid)).copied())
                .filter(|&pidx| !tree.is_ancestor_or_self(idx, pidx));
            tree.attach(idx, parent);
        }

        for item in items {
            if tree.index.contains_key(&NodeKey::Item(item.id)) {
                continue;
            }
            let idx = tree.push(TreeNode {
                key: NodeKey::Item(item.id),
                name: item.name.clone(),
                kind: NodeKind::Item {
                    sku: item.sku.clone(),
                    requires_large_truck: item.requires_large_truck,
                },
                parent: None,
                children: Vec::new(),
            });
            let parent = item
                .category_id
                .and_then(|cid| tree.index.get(&NodeKey::Category(cid)).copied());
            tree.attach(idx, parent);
        }

        tree
    }

    /// Build from the `categoriesWithItems` listing plus uncategorized items.
    pub fn from_grouped(groups: &[CategoryWithItems], uncategorized: &[Item]) -> Self {
        let mut categories = Vec::with_capacity(groups.len());
        let mut items = Vec::new();
        for group in groups {
            let (category, mut members) = group.clone().into_parts();
            for item in &mut members {
                item.category_id = Some(category.id);
            }
            categories.push(category);
            items.extend(members);
        }
        items.extend(uncategorized.iter().cloned());
        Self::build(&categories, &items)
    }

    fn push(&mut self, node: TreeNode) -> usize {
        let idx = self.nodes.len();
        self.index.insert(node.key, idx);
        self.nodes.push(node);
        idx
    }

    fn attach(&mut self, idx: usize, parent: Option<usize>) {
        match parent {
            Some(pidx) => {
                self.nodes[idx].parent = Some(pidx);
                self.nodes[pidx].children.push(idx);
            }
            None => self.roots.push(idx),
        }
    }

    /// Whether `candidate` is `idx` or one of its ancestors-to-be, i.e. whether
    /// linking `idx` under `candidate` would form a loop.
    fn is_ancestor_or_self(&self, idx: usize, candidate: usize) -> bool {
        let mut cursor = Some(candidate);
        while let Some(c) = cursor {
            if c == idx {
                return true;
            }
            cursor = self.nodes[c].parent;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: NodeKey) -> Option<&TreeNode> {
        self.index.get(&key).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn roots(&self) -> Vec<NodeKey> {
        self.roots.iter().map(|&idx| self.nodes[idx].key).collect()
    }

    pub fn children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.get(key)
            .map(|node| node.children.iter().map(|&c| self.nodes[c].key).collect())
            .unwrap_or_default()
    }

    /// Every item id beneath a category, depth-first.
    pub fn descendant_items(&self, category_id: i64) -> Vec<i64> {
        let Some(&start) = self.index.get(&NodeKey::Category(category_id)) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[start].children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            match node.key {
                NodeKey::Item(id) => out.push(id),
                NodeKey::Category(_) => stack.extend(node.children.iter().rev().copied()),
            }
        }
        out
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut cursor = self.index.get(&key).and_then(|&idx| self.nodes[idx].parent);
        while let Some(idx) = cursor {
            out.push(self.nodes[idx].key);
            cursor = self.nodes[idx].parent;
        }
        out
    }

    /// Categories with their depth, in display order.
    pub fn flatten_categories(&self) -> Vec<(i64, String, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            if let NodeKey::Category(id) = node.key {
                out.push((id, node.name.clone(), depth));
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        out
    }

    /// Items whose name or SKU contains `query` (case-insensitive), plus
    /// their ancestor categories.
    pub fn matching(&self, query: &str) -> HashSet<NodeKey> {
        let needle = query.trim().to_lowercase();
        let mut out = HashSet::new();
        for node in &self.nodes {
            if node.is_category() {
                continue;
            }
            let hit = node.name.to_lowercase().contains(&needle)
                || node
                    .sku()
                    .map(|s| s.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            if hit {
                out.insert(node.key);
                out.extend(self.ancestors(node.key));
            }
        }
        out
    }
}

/// Tri-state checkbox value of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Checked,
    Partial,
    Unchecked,
}

/// One rendered row of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub key: NodeKey,
    pub name: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub state: SelectionState,
}

/// Expanded categories and selected items.
///
/// The two sets are independent: expanding never changes the selection and
/// selecting never changes what is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSelection {
    #[serde(default)]
    expanded: BTreeSet<i64>,
    #[serde(default)]
    selected: BTreeSet<i64>,
}

impl TreeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, category_id: i64) -> bool {
        self.expanded.contains(&category_id)
    }

    pub fn is_selected(&self, item_id: i64) -> bool {
        self.selected.contains(&item_id)
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    pub fn expanded_ids(&self) -> Vec<i64> {
        self.expanded.iter().copied().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Flip a category between expanded and collapsed. Returns the new state;
    /// unknown categories are ignored.
    pub fn toggle_expand(&mut self, tree: &InventoryTree, category_id: i64) -> bool {
        if !tree.contains(NodeKey::Category(category_id)) {
            return false;
        }
        if !self.expanded.remove(&category_id) {
            self.expanded.insert(category_id);
        }
        self.is_expanded(category_id)
    }

    /// Flip one item in or out of the selection. Returns whether it is now
    /// selected; ids that are not items of the tree are ignored.
    pub fn toggle_item(&mut self, tree: &InventoryTree, item_id: i64) -> bool {
        if !tree.contains(NodeKey::Item(item_id)) {
            return false;
        }
        if !self.selected.remove(&item_id) {
            self.selected.insert(item_id);
        }
        self.is_selected(item_id)
    }

    /// Select every item beneath a category. Returns how many were added.
    pub fn select_category(&mut self, tree: &InventoryTree, category_id: i64) -> usize {
        tree.descendant_items(category_id)
            .into_iter()
            .filter(|id| self.selected.insert(*id))
            .count()
    }

    /// Remove exactly the items beneath a category, keeping every other
    /// selection. Returns how many were removed.
    pub fn deselect_category(&mut self, tree: &InventoryTree, category_id: i64) -> usize {
        tree.descendant_items(category_id)
            .into_iter()
            .filter(|id| self.selected.remove(id))
            .count()
    }

    /// Deselect the category's items when all are selected, select them
    /// otherwise. Returns the resulting state.
    pub fn toggle_category(&mut self, tree: &InventoryTree, category_id: i64) -> SelectionState {
        if self.category_state(tree, category_id) == SelectionState::Checked {
            self.deselect_category(tree, category_id);
        } else {
            self.select_category(tree, category_id);
        }
        self.category_state(tree, category_id)
    }

    pub fn category_state(&self, tree: &InventoryTree, category_id: i64) -> SelectionState {
        let items = tree.descendant_items(category_id);
        let chosen = items.iter().filter(|id| self.selected.contains(id)).count();
        if items.is_empty() || chosen == 0 {
            SelectionState::Unchecked
        } else if chosen == items.len() {
            SelectionState::Checked
        } else {
            SelectionState::Partial
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Drop ids that are no longer in the tree (after a re-fetch).
    pub fn retain_known(&mut self, tree: &InventoryTree) {
        self.selected.retain(|id| tree.contains(NodeKey::Item(*id)));
        self.expanded.retain(|id| tree.contains(NodeKey::Category(*id)));
    }

    /// Rows of the tree as currently expanded.
    pub fn visible_rows(&self, tree: &InventoryTree) -> Vec<TreeRow> {
        self.rows(tree, None)
    }

    /// Rows restricted to items matching `query` and their ancestors; matched
    /// categories are shown open regardless of the expanded set.
    pub fn filtered_rows(&self, tree: &InventoryTree, query: &str) -> Vec<TreeRow> {
        if query.trim().is_empty() {
            return self.visible_rows(tree);
        }
        let keep = tree.matching(query);
        self.rows(tree, Some(&keep))
    }

    fn rows(&self, tree: &InventoryTree, keep: Option<&HashSet<NodeKey>>) -> Vec<TreeRow> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, usize)> = tree.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((idx, depth)) = stack.pop() {
            let node = &tree.nodes[idx];
            if let Some(keep) = keep {
                if !keep.contains(&node.key) {
                    continue;
                }
            }
            let (expanded, state) = match node.key {
                NodeKey::Category(id) => (
                    keep.is_some() || self.is_expanded(id),
                    self.category_state(tree, id),
                ),
                NodeKey::Item(id) => (
                    false,
                    if self.is_selected(id) {
                        SelectionState::Checked
                    } else {
                        SelectionState::Unchecked
                    },
                ),
            };
            out.push(TreeRow {
                key: node.key,
                name: node.name.clone(),
                depth,
                has_children: !node.children.is_empty(),
                expanded,
                state,
            });
            if expanded {
                stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        out
    }
}
