//! Core data models for dispatch-board.
//!
//! These types are shared by the fixture server, the client and the CLI and
//! mirror the backend's JSON records. Jobs, trucks, items and categories use
//! camelCase field names; ops and metrics payloads use snake_case.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::defaults;
use crate::error::Error;

// =============================================================================
// JOB TYPES
// =============================================================================

/// Whether a stop picks goods up or drops them off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobAction {
    Pickup,
    Dropoff,
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pickup => write!(f, "pickup"),
            Self::Dropoff => write!(f, "dropoff"),
        }
    }
}

impl FromStr for JobAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pickup" => Ok(Self::Pickup),
            "dropoff" | "delivery" => Ok(Self::Dropoff),
            _ => Err(Error::InvalidInput(format!("unknown job action: {}", s))),
        }
    }
}

/// Lifecycle status of a job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Assigned,
    InProgress,
    Completed,
    Deferred,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Deferred => "deferred",
        };
        write!(f, "{}", s)
    }
}

/// Geocoded address of a stop.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub place_id: String,
}

/// Truck fields embedded in a job that has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TruckSnapshot {
    pub id: i64,
    pub truck_name: String,
    pub truck_type: TruckType,
}

/// One pickup or dropoff task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub action_type: JobAction,
    pub location: Location,
    /// Inventory item ids carried by this stop.
    #[serde(default)]
    pub items: Vec<i64>,
    /// 1 = High, 2 = Medium, 3 = Low.
    pub priority: i32,
    pub earliest_time: Option<DateTime<Utc>>,
    pub latest_time: Option<DateTime<Utc>>,
    pub service_minutes: Option<u32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub large_truck_only: bool,
    #[serde(default)]
    pub curfew_flag: bool,
    pub assigned_truck_id: Option<i64>,
    pub assigned_driver_id: Option<i64>,
    pub assigned_truck: Option<TruckSnapshot>,
    #[serde(default)]
    pub status: JobStatus,
    /// Position within the assigned truck's route.
    pub sequence: Option<u32>,
    /// Service day.
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// A completed job stays on the truck that served it.
    pub fn ensure_assignable(&self) -> Result<(), Error> {
        if self.is_completed() {
            return Err(Error::Conflict(format!(
                "job {} is completed and cannot be reassigned",
                self.id
            )));
        }
        Ok(())
    }

    /// Sort key used by the ops view; a missing sequence sorts first.
    pub fn sequence_key(&self) -> u32 {
        self.sequence.unwrap_or(0)
    }

    pub fn priority_label(&self) -> &'static str {
        match self.priority {
            i32::MIN..=1 => "High",
            2 => "Medium",
            _ => "Low",
        }
    }
}

/// Request for creating a new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub action_type: JobAction,
    pub location: Location,
    #[serde(default)]
    pub items: Vec<i64>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub large_truck_only: bool,
    #[serde(default)]
    pub curfew_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_truck_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<i64>,
    /// Service day; the backend uses today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

fn default_priority() -> i32 {
    defaults::JOB_PRIORITY
}

/// Partial update of a job. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<JobAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_truck_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curfew_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Body of `POST /api/jobs/{id}/defer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeferJobRequest {
    pub new_priority: i32,
}

/// Body of `POST /api/jobs/{id}/assign`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignJobRequest {
    pub truck_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i64>,
}

/// Query parameters of `GET /api/jobs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Paged job listing carried inside the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobPage {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub jobs: Vec<Job>,
}

// =============================================================================
// TRUCK TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TruckType {
    Large,
    Small,
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Large => write!(f, "large"),
            Self::Small => write!(f, "small"),
        }
    }
}

/// Operating status reported by the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TruckStatus {
    #[default]
    Available,
    InTransit,
    Maintenance,
    Unavailable,
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::InTransit => "in_transit",
            Self::Maintenance => "maintenance",
            Self::Unavailable => "unavailable",
        };
        write!(f, "{}", s)
    }
}

/// Fleet vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    pub id: i64,
    pub truck_name: String,
    pub capacity_cu_ft: f64,
    pub max_weight_lbs: Option<f64>,
    #[serde(default)]
    pub length_ft: f64,
    #[serde(default)]
    pub width_ft: f64,
    #[serde(default)]
    pub height_ft: f64,
    pub truck_type: TruckType,
    #[serde(default)]
    pub current_status: TruckStatus,
    pub last_known_lat: Option<f64>,
    pub last_known_lng: Option<f64>,
    #[serde(default)]
    pub restricted_load_types: Vec<String>,
    pub driver: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Truck {
    pub fn is_large(&self) -> bool {
        self.truck_type == TruckType::Large
    }

    /// Whether the truck can take new work.
    pub fn is_dispatchable(&self) -> bool {
        self.is_active
            && matches!(
                self.current_status,
                TruckStatus::Available | TruckStatus::InTransit
            )
    }

    pub fn snapshot(&self) -> TruckSnapshot {
        TruckSnapshot {
            id: self.id,
            truck_name: self.truck_name.clone(),
            truck_type: self.truck_type,
        }
    }
}

/// Request for creating a truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTruckRequest {
    pub truck_name: String,
    pub capacity_cu_ft: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight_lbs: Option<f64>,
    #[serde(default)]
    pub length_ft: f64,
    #[serde(default)]
    pub width_ft: f64,
    #[serde(default)]
    pub height_ft: f64,
    pub truck_type: TruckType,
    #[serde(default)]
    pub current_status: TruckStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restricted_load_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

/// Partial update of a truck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTruckRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_cu_ft: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight_lbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck_type: Option<TruckType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<TruckStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =============================================================================
// INVENTORY TYPES
// =============================================================================

/// Inventory item that can be attached to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub weight_lbs: Option<f64>,
    pub length_in: Option<f64>,
    pub width_in: Option<f64>,
    pub height_in: Option<f64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub requires_large_truck: bool,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Volume in cubic inches, when all three dimensions are known.
    pub fn volume_cu_in(&self) -> Option<f64> {
        match (self.length_in, self.width_in, self.height_in) {
            (Some(l), Some(w), Some(h)) => Some(l * w * h),
            _ => None,
        }
    }
}

/// Request for creating an inventory item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub requires_large_truck: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Partial update of an inventory item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_large_truck: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Item category. Categories may nest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category together with the items filed directly under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithItems {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl CategoryWithItems {
    pub fn from_parts(category: Category, items: Vec<Item>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            parent_id: category.parent_id,
            created_at: category.created_at,
            updated_at: category.updated_at,
            items,
        }
    }

    /// Split back into the category record and its items.
    pub fn into_parts(self) -> (Category, Vec<Item>) {
        let category = Category {
            id: self.id,
            name: self.name,
            description: self.description,
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (category, self.items)
    }
}

/// Request for creating a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Partial update of a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

// =============================================================================
// OPTIMIZATION TYPES
// =============================================================================

/// One job-to-truck assignment returned by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignment {
    pub job_id: i64,
    pub job_title: String,
    pub assigned_truck: String,
    pub driver: String,
    pub score: String,
}

/// Result of `POST /api/jobs/optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobOptimize {
    pub success: bool,
    pub total_jobs: usize,
    pub assigned: usize,
    pub assignments: Vec<JobAssignment>,
}

/// Ordered stop on a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub sequence: u32,
    pub job_id: i64,
    pub title: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub action_type: JobAction,
}

/// Route for one truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TruckRoute {
    pub truck_id: i64,
    pub truck_name: String,
    pub distance_miles: f64,
    pub stops: Vec<RouteStop>,
    /// External map link showing the route.
    pub maps_url: String,
}

/// Result of `POST /api/jobs/routes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoutePlan {
    pub success: bool,
    pub routes: Vec<TruckRoute>,
}

// =============================================================================
// OPS TYPES
// =============================================================================

/// Body of `POST /ops/mark-3-complete`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarkCompleteRequest {
    pub truck_id: i64,
    /// Service day of the ops board; the server picks the earliest open day
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarkCompleteResponse {
    pub completed: usize,
}

/// Body of `POST /ops/send-next-3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SendNextRequest {
    pub truck_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SendNextResponse {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// METRICS TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TruckUtilization {
    pub truck_name: String,
    /// Percentage, 0–100.
    pub utilization: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
}

/// Summary returned by `GET /metrics/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Metrics {
    pub date_range: DateRange,
    pub utilization_by_truck: Vec<TruckUtilization>,
    pub jobs_completed: usize,
    pub jobs_deferred: usize,
    pub on_time_percentage: f64,
    pub avg_service_time_minutes: f64,
    pub avg_drive_time_minutes: f64,
    #[serde(default)]
    pub heatmap_data: Vec<HeatPoint>,
}

/// Query parameters of `GET /metrics/summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// `{success, data}` wrapper used by the backend's resource endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{error}` body returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
