//! Planner state persisted as a JSON file on the planner's machine.

use std::path::{Path, PathBuf};

use dispatch_core::{PlannerState, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// JSON file holding a [`PlannerState`].
#[derive(Debug, Clone)]
pub struct LocalStateFile {
    path: PathBuf,
}

impl LocalStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state. A missing file yields the default state.
    pub async fn load(&self) -> Result<PlannerState> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let state: PlannerState = serde_json::from_str(&raw)?;
                debug!(path = %self.path.display(), "Loaded planner state");
                Ok(state)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No planner state yet, using defaults");
                Ok(PlannerState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the state as pretty JSON. Atomic write: temp file + rename.
    pub async fn save(&self, state: &PlannerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_vec_pretty(state)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "local_state: File::create failed");
            e
        })?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %self.path.display(), error = %e, "local_state: rename failed");
            e
        })?;
        debug!(path = %self.path.display(), bytes = data.len(), "Saved planner state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::{Error, NewSavedLocation};

    #[tokio::test]
    async fn test_missing_file_gives_default_state() {
        let dir = tempfile::tempdir().unwrap();
        let file = LocalStateFile::new(dir.path().join("state.json"));
        let state = file.load().await.unwrap();
        assert_eq!(state, PlannerState::default());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = LocalStateFile::new(dir.path().join("nested").join("state.json"));

        let mut state = PlannerState::default();
        state.date.set_str("2026-05-04").unwrap();
        state.locations.add(NewSavedLocation {
            name: "Depot".to_string(),
            address: "1 Main St".to_string(),
            is_starred: true,
            ..Default::default()
        });
        file.save(&state).await.unwrap();

        let back = file.load().await.unwrap();
        assert_eq!(back, state);
        assert!(!dir.path().join("nested").join("state.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let err = LocalStateFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
