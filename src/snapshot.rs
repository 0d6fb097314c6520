//! Periodic JSON telemetry. Files are write-only; nothing reads them back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::world::{World, WorldSnapshot};

#[derive(Serialize)]
struct SnapshotFile<'a> {
    written_at: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: &'a WorldSnapshot,
}

pub struct SnapshotWriter {
    dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    /// Writes `<dir>/<scenario>/tick_NNNNNN.json` when the world's tick is a
    /// multiple of the interval. An interval of zero disables writing.
    pub fn maybe_write(&self, world: &World, scenario: &str) -> Result<Option<PathBuf>> {
        let tick = world.tick();
        if self.interval_ticks == 0 || tick % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;

        let path = dir.join(format!("tick_{tick:06}.json"));
        let snapshot = world.snapshot(scenario);
        let file = SnapshotFile {
            written_at: Utc::now(),
            snapshot: &snapshot,
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize snapshot")?;
        fs::write(&path, json).with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
