//! HTTP handlers, one module per resource.

pub mod inventory;
pub mod jobs;
pub mod metrics;
pub mod ops;
pub mod system;
pub mod trucks;

use axum::Json;
use serde_json::{json, Value};

/// Body returned by every successful DELETE.
pub(crate) fn deleted() -> Json<Value> {
    Json(json!({ "success": true }))
}
