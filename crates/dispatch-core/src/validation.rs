//! Form drafts and the presence checks run before any mutation is issued.
//!
//! Drafts hold raw text as typed. `validate` either produces the request
//! body for the backend or an [`Error::Validation`] carrying the notice text;
//! a failed check never yields a partial request.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::defaults::{JOB_PRIORITY, JOB_PRIORITY_LOWEST};
use crate::error::{Error, Result};
use crate::models::{
    CreateCategoryRequest, CreateItemRequest, CreateJobRequest, CreateTruckRequest, JobAction,
    Location, TruckStatus, TruckType,
};

pub const JOB_REQUIRED_MESSAGE: &str =
    "Please fill in location, address, and select at least one item";
pub const ITEM_REQUIRED_MESSAGE: &str = "Please enter an item name";
pub const TRUCK_REQUIRED_MESSAGE: &str = "Please enter truck name and capacity";
pub const CATEGORY_REQUIRED_MESSAGE: &str = "Please enter a name";

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts an RFC 3339 timestamp or `HH:MM` on the service day (UTC).
fn parse_time(value: &str, date: NaiveDate) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveTime::parse_from_str(&value, "%H:%M")
        .map(|t| Some(date.and_time(t).and_utc()))
        .map_err(|_| Error::Validation(format!("Invalid time: {}", value)))
}

// =============================================================================
// JOB
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub location_name: String,
    pub address: String,
    pub action: JobAction,
    pub items: Vec<i64>,
    pub priority: String,
    pub earliest: String,
    pub latest: String,
    pub service_minutes: String,
    pub notes: String,
    pub large_truck_only: bool,
    pub curfew_flag: bool,
    /// Extra address detail when the location came from the saved list.
    pub location: Option<Location>,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            location_name: String::new(),
            address: String::new(),
            action: JobAction::Pickup,
            items: Vec::new(),
            priority: JOB_PRIORITY.to_string(),
            earliest: String::new(),
            latest: String::new(),
            service_minutes: String::new(),
            notes: String::new(),
            large_truck_only: false,
            curfew_flag: false,
            location: None,
        }
    }
}

impl JobDraft {
    /// Build the create-job body for `date`.
    ///
    /// Priority falls back to High when blank or out of range.
    pub fn validate(&self, date: NaiveDate) -> Result<CreateJobRequest> {
        let (Some(name), Some(address)) = (
            non_blank(&self.location_name),
            non_blank(&self.address),
        ) else {
            return Err(Error::Validation(JOB_REQUIRED_MESSAGE.to_string()));
        };
        if self.items.is_empty() {
            return Err(Error::Validation(JOB_REQUIRED_MESSAGE.to_string()));
        }

        let priority = self
            .priority
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|p| (JOB_PRIORITY..=JOB_PRIORITY_LOWEST).contains(p))
            .unwrap_or(JOB_PRIORITY);

        let mut location = self.location.clone().unwrap_or_default();
        location.name = name.clone();
        location.address = address;

        Ok(CreateJobRequest {
            title: name,
            action_type: self.action,
            location,
            items: self.items.clone(),
            priority,
            earliest_time: parse_time(&self.earliest, date)?,
            latest_time: parse_time(&self.latest, date)?,
            service_minutes: self.service_minutes.trim().parse::<u32>().ok(),
            notes: non_blank(&self.notes),
            large_truck_only: self.large_truck_only,
            curfew_flag: self.curfew_flag,
            assigned_truck_id: None,
            assigned_driver_id: None,
            date: Some(date),
        })
    }
}

// =============================================================================
// ITEM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub sku: String,
    pub weight: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub notes: String,
    pub requires_large_truck: bool,
    pub category_id: Option<i64>,
}

impl ItemDraft {
    /// Dimensions are sent only when all three parse.
    pub fn validate(&self) -> Result<CreateItemRequest> {
        let name =
            non_blank(&self.name).ok_or_else(|| Error::Validation(ITEM_REQUIRED_MESSAGE.into()))?;

        let dims = match (
            parse_number(&self.length),
            parse_number(&self.width),
            parse_number(&self.height),
        ) {
            (Some(l), Some(w), Some(h)) => (Some(l), Some(w), Some(h)),
            _ => (None, None, None),
        };

        Ok(CreateItemRequest {
            name,
            sku: non_blank(&self.sku),
            weight_lbs: parse_number(&self.weight),
            length_in: dims.0,
            width_in: dims.1,
            height_in: dims.2,
            notes: non_blank(&self.notes),
            requires_large_truck: self.requires_large_truck,
            category_id: self.category_id,
        })
    }
}

// =============================================================================
// TRUCK
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruckDraft {
    pub name: String,
    pub capacity: String,
    pub max_weight: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub is_large: bool,
    pub driver: String,
}

impl TruckDraft {
    /// Missing dimensions become 0; new trucks start available.
    pub fn validate(&self) -> Result<CreateTruckRequest> {
        let required = || Error::Validation(TRUCK_REQUIRED_MESSAGE.to_string());
        let name = non_blank(&self.name).ok_or_else(required)?;
        let capacity = parse_number(&self.capacity).ok_or_else(required)?;

        Ok(CreateTruckRequest {
            truck_name: name,
            capacity_cu_ft: capacity,
            max_weight_lbs: parse_number(&self.max_weight),
            length_ft: parse_number(&self.length).unwrap_or(0.0),
            width_ft: parse_number(&self.width).unwrap_or(0.0),
            height_ft: parse_number(&self.height).unwrap_or(0.0),
            truck_type: if self.is_large {
                TruckType::Large
            } else {
                TruckType::Small
            },
            current_status: TruckStatus::Available,
            restricted_load_types: Vec::new(),
            driver: non_blank(&self.driver),
        })
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub parent_id: Option<i64>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<CreateCategoryRequest> {
        let name = non_blank(&self.name)
            .ok_or_else(|| Error::Validation(CATEGORY_REQUIRED_MESSAGE.to_string()))?;
        Ok(CreateCategoryRequest {
            name,
            description: self.description.trim().to_string(),
            parent_id: self.parent_id,
        })
    }
}
