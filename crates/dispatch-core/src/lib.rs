//! # dispatch-core
//!
//! Core types, planning logic, and traits for dispatch-board.
//!
//! This crate holds the backend record types, the pure logic behind the
//! planning and operations screens (stop grouping, the inventory tree, the
//! date cursor, saved locations, form validation) and the repository traits
//! the fixture server is written against.

pub mod date_cursor;
pub mod defaults;
pub mod error;
pub mod events;
pub mod inventory_tree;
pub mod locations;
pub mod models;
pub mod planner;
pub mod stop_groups;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use date_cursor::{parse_date, DateCursor};
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, ServerEvent};
pub use inventory_tree::{InventoryTree, NodeKey, SelectionState, TreeRow, TreeSelection};
pub use locations::{rank_locations, NewSavedLocation, SavedLocation, SavedLocations};
pub use models::*;
pub use planner::PlannerState;
pub use stop_groups::{build_ops_board, chunk_stops, group_stops, StopGroup, TruckStops};
pub use traits::*;
pub use validation::{CategoryDraft, ItemDraft, JobDraft, TruckDraft};
