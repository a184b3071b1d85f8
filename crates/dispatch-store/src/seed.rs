//! Fixture data loaded into the in-memory store at startup.

use std::path::Path;

use chrono::{Days, NaiveDate};
use dispatch_core::{Category, Error, Item, Job, Result, Truck};
use serde::{Deserialize, Serialize};
use tracing::info;

const EMBEDDED_SEED: &str = include_str!("seed.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub trucks: Vec<Truck>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Seed {
    /// The fixture data compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Ok(serde_json::from_str(EMBEDDED_SEED)?)
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let seed: Seed = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            jobs = seed.jobs.len(),
            trucks = seed.trucks.len(),
            "Loaded seed file"
        );
        Ok(seed)
    }

    /// Seed file at `path` when given, embedded data otherwise.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p).await,
            None => Self::embedded(),
        }
    }

    /// Shift every job forward so the earliest service day lands on `today`.
    /// Time windows move by the same number of days.
    pub fn rebase_dates(&mut self, today: NaiveDate) {
        let Some(first) = self.jobs.iter().map(|j| j.date).min() else {
            return;
        };
        let offset = today.signed_duration_since(first).num_days();
        if offset <= 0 {
            return;
        }
        let days = Days::new(offset as u64);
        for job in &mut self.jobs {
            if let Some(d) = job.date.checked_add_days(days) {
                job.date = d;
            }
            job.earliest_time = job.earliest_time.and_then(|t| t.checked_add_days(days));
            job.latest_time = job.latest_time.and_then(|t| t.checked_add_days(days));
        }
    }
}
