//! Planner state: everything the planning screens remember between runs.
//!
//! The caller owns a [`PlannerState`] and passes it to whatever needs it.
//! It serializes to JSON so a persistence layer can store it as one file.

use serde::{Deserialize, Serialize};

use crate::date_cursor::DateCursor;
use crate::error::Result;
use crate::inventory_tree::TreeSelection;
use crate::locations::{NewSavedLocation, SavedLocations};
use crate::models::{CreateJobRequest, JobOptimize, Location};
use crate::validation::JobDraft;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    #[serde(default)]
    pub date: DateCursor,
    #[serde(default)]
    pub locations: SavedLocations,
    #[serde(default)]
    pub selection: TreeSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_optimize: Option<JobOptimize>,
}

impl PlannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a job draft for the selected day and remember its location.
    ///
    /// The location is saved (or its last-used time refreshed) only when the
    /// draft passes validation.
    pub fn prepare_job(&mut self, draft: &JobDraft) -> Result<CreateJobRequest> {
        let request = draft.validate(self.date.date())?;
        self.remember_location(&request.location);
        Ok(request)
    }

    /// Save a location, or refresh it when the name is already known.
    pub fn remember_location(&mut self, location: &Location) {
        if let Some(existing) = self.locations.find_by_name(&location.name) {
            let id = existing.id.clone();
            self.locations.touch(&id);
        } else {
            self.locations.add(NewSavedLocation::from(location));
        }
    }

    /// Pick a saved location for a new job, marking it used.
    pub fn use_location(&mut self, id: &str) -> Option<Location> {
        if !self.locations.touch(id) {
            return None;
        }
        self.locations.get(id).map(|l| l.to_location())
    }

    /// Item ids currently picked in the inventory tree.
    pub fn selected_items(&self) -> Vec<i64> {
        self.selection.selected_ids()
    }

    pub fn record_optimize(&mut self, result: JobOptimize) {
        tracing::debug!(
            total_jobs = result.total_jobs,
            assigned = result.assigned,
            "Recorded optimize result"
        );
        self.last_optimize = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;

    fn draft(name: &str) -> JobDraft {
        JobDraft {
            location_name: name.to_string(),
            address: "1 Main St".to_string(),
            items: vec![1],
            ..Default::default()
        }
    }

    #[test]
    fn test_prepare_job_uses_selected_date_and_saves_location() {
        let mut state = PlannerState::new();
        let day = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        state.date.reset_to(day);

        let req = state.prepare_job(&draft("Depot")).unwrap();
        assert_eq!(req.date, Some(day));
        assert_eq!(state.locations.len(), 1);

        state.prepare_job(&draft("depot")).unwrap();
        assert_eq!(state.locations.len(), 1);
    }

    #[test]
    fn test_invalid_draft_saves_nothing() {
        let mut state = PlannerState::new();
        let err = state
            .prepare_job(&JobDraft {
                items: vec![],
                ..draft("Depot")
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(state.locations.is_empty());
    }

    #[test]
    fn test_use_location_returns_address() {
        let mut state = PlannerState::new();
        state.prepare_job(&draft("Depot")).unwrap();
        let id = state.locations.sorted()[0].id.clone();
        let loc = state.use_location(&id).unwrap();
        assert_eq!(loc.address, "1 Main St");
        assert!(state.use_location("missing").is_none());
    }

    #[test]
    fn test_state_json_round_trip() {
        let mut state = PlannerState::new();
        state.prepare_job(&draft("Depot")).unwrap();
        state.record_optimize(JobOptimize {
            success: true,
            total_jobs: 2,
            assigned: 1,
            assignments: vec![],
        });
        let json = serde_json::to_string(&state).unwrap();
        let back: PlannerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let back: PlannerState = serde_json::from_str(r#"{"date":"2026-01-02"}"#).unwrap();
        assert_eq!(back.date.as_string(), "2026-01-02");
        assert!(back.locations.is_empty());
        assert!(back.last_optimize.is_none());
    }
}
