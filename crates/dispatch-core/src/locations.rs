//! Saved pickup/dropoff locations kept on the planner's machine.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Location;

/// A location the planner has used before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    /// UUIDv7 assigned on insert.
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub is_starred: bool,
    pub last_used: DateTime<Utc>,
}

impl SavedLocation {
    /// Job location built from this entry.
    pub fn to_location(&self) -> Location {
        Location {
            name: self.name.clone(),
            address: self.address.clone(),
            latitude: self.lat.unwrap_or_default(),
            longitude: self.lng.unwrap_or_default(),
            city: self.city.clone().unwrap_or_default(),
            state: self.state.clone().unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
            postal_code: self.zip_code.clone().unwrap_or_default(),
            place_id: String::new(),
        }
    }
}

/// Fields supplied when saving a location; id and last-used are assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSavedLocation {
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_starred: bool,
}

impl From<&Location> for NewSavedLocation {
    fn from(loc: &Location) -> Self {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        let coord = |v: f64| (v != 0.0).then_some(v);
        Self {
            name: loc.name.clone(),
            address: loc.address.clone(),
            city: non_empty(&loc.city),
            state: non_empty(&loc.state),
            zip_code: non_empty(&loc.postal_code),
            country: non_empty(&loc.country),
            lat: coord(loc.latitude),
            lng: coord(loc.longitude),
            is_starred: false,
        }
    }
}

fn by_name(a: &SavedLocation, b: &SavedLocation) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Starred entries first, then the rest, each group by lowercase name.
///
/// The sort is stable, so applying it twice gives the same order.
pub fn rank_locations(locations: &[SavedLocation]) -> Vec<SavedLocation> {
    let (mut starred, mut rest): (Vec<_>, Vec<_>) =
        locations.iter().cloned().partition(|l| l.is_starred);
    starred.sort_by(by_name);
    rest.sort_by(by_name);
    starred.extend(rest);
    starred
}

/// The planner's saved locations, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedLocations {
    entries: Vec<SavedLocation>,
}

impl SavedLocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedLocation> {
        self.entries.iter().find(|l| l.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SavedLocation> {
        let needle = name.to_lowercase();
        self.entries.iter().find(|l| l.name.to_lowercase() == needle)
    }

    /// Save a location. Returns the new id, or `None` when an entry with the
    /// same name (case-insensitive) already exists.
    pub fn add(&mut self, new: NewSavedLocation) -> Option<String> {
        if self.find_by_name(&new.name).is_some() {
            tracing::debug!(name = %new.name, "Saved location already exists");
            return None;
        }
        let id = Uuid::now_v7().to_string();
        self.entries.push(SavedLocation {
            id: id.clone(),
            name: new.name,
            address: new.address,
            city: new.city,
            state: new.state,
            zip_code: new.zip_code,
            country: new.country,
            lat: new.lat,
            lng: new.lng,
            is_starred: new.is_starred,
            last_used: Utc::now(),
        });
        Some(id)
    }

    /// Flip the star flag. Returns the new value, or `None` for unknown ids.
    pub fn toggle_star(&mut self, id: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|l| l.id == id)?;
        entry.is_starred = !entry.is_starred;
        Some(entry.is_starred)
    }

    /// Record that a location was just used.
    pub fn touch(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|l| l.id == id) {
            Some(entry) => {
                entry.last_used = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<SavedLocation> {
        let pos = self.entries.iter().position(|l| l.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn sorted(&self) -> Vec<SavedLocation> {
        rank_locations(&self.entries)
    }

    /// Ranked entries whose name or address contains `query`
    /// (case-insensitive). An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<SavedLocation> {
        let needle = query.trim().to_lowercase();
        self.sorted()
            .into_iter()
            .filter(|l| {
                needle.is_empty()
                    || l.name.to_lowercase().contains(&needle)
                    || l.address.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedLocation> {
        self.entries.iter()
    }
}
