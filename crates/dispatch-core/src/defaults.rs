//! Centralized default constants for dispatch-board.
//!
//! **This module is the single source of truth** for shared default values.
//! The client, the fixture server and the CLI reference these constants
//! instead of defining their own magic numbers.

// =============================================================================
// OPERATIONS CADENCE
// =============================================================================

/// Number of stops in one operational check-in batch.
pub const STOP_GROUP_SIZE: usize = 3;

/// Priority assigned when a job form leaves priority empty (1 = High).
pub const JOB_PRIORITY: i32 = 1;

/// Lowest priority accepted (3 = Low).
pub const JOB_PRIORITY_LOWEST: i32 = 3;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the jobs listing.
pub const PAGE_LIMIT: usize = 100;

/// Default page number (1-based).
pub const PAGE: usize = 1;

/// Largest page size the jobs listing answers with.
pub const MAX_PAGE_LIMIT: usize = 500;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default event bus broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Default webhook HTTP request timeout in seconds.
pub const WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Maximum request body size in bytes (1 MB).
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;

/// Message returned by the send-next-3 endpoint when delivery is mocked.
pub const MOCK_WEBHOOK_MESSAGE: &str = "Webhook triggered (mocked)";

// =============================================================================
// CLIENT
// =============================================================================

/// Default backend base URL.
pub const API_BASE_URL: &str = "http://127.0.0.1:3000";

/// Default client request timeout in seconds.
pub const CLIENT_TIMEOUT_SECS: u64 = 30;

/// Default webhook for the "send next 3" action.
pub const WEBHOOK_NEXT3_URL: &str = "https://example.com/whatsapp-stub";

/// Default path of the client-local state file.
pub const STATE_PATH: &str = ".dispatch/state.json";

// =============================================================================
// METRICS
// =============================================================================

/// On-time percentage reported by the fixture metrics (no telemetry source).
pub const METRICS_ON_TIME_PERCENTAGE: f64 = 94.5;

/// Average service time reported by the fixture metrics.
pub const METRICS_AVG_SERVICE_MINUTES: f64 = 18.0;

/// Average drive time reported by the fixture metrics.
pub const METRICS_AVG_DRIVE_MINUTES: f64 = 24.0;

/// Cubic inches per cubic foot.
pub const CUBIC_INCHES_PER_FOOT: f64 = 1728.0;

/// Mean Earth radius in miles (haversine distance).
pub const EARTH_RADIUS_MILES: f64 = 3958.8;
