//! # dispatch-store
//!
//! Storage for dispatch-board.
//!
//! This crate provides:
//! - In-memory repositories behind `tokio::sync::RwLock`, reset on restart
//! - Fixture seed data (embedded, or loaded from a JSON file)
//! - Canned optimize, route and metrics answers for the fixture server
//! - The planner's local state file

pub mod fixture;
pub mod inventory;
pub mod jobs;
pub mod local;
pub mod seed;
mod table;
pub mod trucks;

pub use fixture::{
    build_routes, current_group, current_group_open_ids, default_range, next_sequence, optimize,
    summarize, OptimizeOutcome,
};
pub use inventory::{MemoryCategoryRepository, MemoryItemRepository};
pub use jobs::MemoryJobRepository;
pub use local::LocalStateFile;
pub use seed::Seed;
pub use trucks::MemoryTruckRepository;

// Re-export core types
pub use dispatch_core::*;

/// Combined store with every repository.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub jobs: MemoryJobRepository,
    pub trucks: MemoryTruckRepository,
    pub items: MemoryItemRepository,
    pub categories: MemoryCategoryRepository,
}

impl Store {
    pub fn from_seed(seed: Seed) -> Self {
        Self {
            jobs: MemoryJobRepository::new(seed.jobs),
            trucks: MemoryTruckRepository::new(seed.trucks),
            items: MemoryItemRepository::new(seed.items),
            categories: MemoryCategoryRepository::new(seed.categories),
        }
    }
}
