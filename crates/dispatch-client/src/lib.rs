//! # dispatch-client
//!
//! Talks to the dispatch backend.
//!
//! This crate provides:
//! - [`ApiClient`]: one typed method per endpoint
//! - [`QueryCache`]: keyed response cache with scope invalidation
//! - [`Notifier`] implementations for success and error notices
//! - [`Dispatcher`]: the dashboard's reads and mutations built from the above

pub mod api;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod notifier;

pub use api::ApiClient;
pub use cache::{Cached, QueryCache, QueryKey, QueryScope, Ticket};
pub use config::{ClientConfig, FeatureFlags};
pub use dispatcher::{Dispatcher, SEND_DISABLED_MESSAGE};
pub use notifier::{ConsoleNotifier, MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
