//! JSON file snapshot store
//!
//! Persists state as two pretty-printed JSON files inside a data directory:
//! `monitors.json` (the monitor list with statistics) and `history.json`
//! (identity → outcome array). The directory is created on first save.
//!
//! Writes go to a temporary file which is then renamed over the target, so a
//! crash mid-save leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, trace};

use super::backend::SnapshotStore;
use super::error::StorageResult;
use super::schema::PersistedState;

const MONITORS_FILE: &str = "monitors.json";
const HISTORY_FILE: &str = "history.json";

/// Snapshot store backed by JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_json<T: serde::de::DeserializeOwned + Default>(
        &self,
        file: &str,
    ) -> StorageResult<T> {
        match fs::read(self.dir.join(file)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("{file} not found, using empty state");
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: serde::Serialize>(&self, file: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;

        let target = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));

        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &target).await?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonStore {
    async fn load(&self) -> StorageResult<PersistedState> {
        let monitors = self.read_json(MONITORS_FILE).await?;
        let history = self.read_json(HISTORY_FILE).await?;

        let state = PersistedState { monitors, history };
        debug!(
            "loaded {} monitors and history for {} endpoints from {}",
            state.monitors.len(),
            state.history.len(),
            self.dir.display()
        );

        Ok(state)
    }

    async fn save(&self, state: &PersistedState) -> StorageResult<()> {
        fs::create_dir_all(&self.dir).await?;

        self.write_json(MONITORS_FILE, &state.monitors).await?;
        self.write_json(HISTORY_FILE, &state.history).await?;

        trace!(
            "saved {} monitors to {}",
            state.monitors.len(),
            self.dir.display()
        );

        Ok(())
    }
}
