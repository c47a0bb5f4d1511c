//! Result snapshots
//!
//! Append-only history of calculated results. Every save adds a new
//! snapshot; earlier snapshots are never rewritten.

use crate::{
    types::{SettlementId, SettlementResult},
    Error, Result,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Storage for settlement result snapshots
pub trait SnapshotStore: Send + Sync {
    /// Append a snapshot
    fn save(&self, result: &SettlementResult) -> Result<()>;

    /// All snapshots for a settlement, oldest first
    fn history(&self, settlement_id: SettlementId) -> Result<Vec<SettlementResult>>;

    /// Drop every snapshot of a settlement; returns how many were removed
    fn delete_settlement(&self, settlement_id: SettlementId) -> Result<usize>;

    /// Most recently calculated snapshot
    fn latest(&self, settlement_id: SettlementId) -> Result<SettlementResult> {
        self.history(settlement_id)?
            .into_iter()
            .reduce(|best, next| {
                if next.calculated_at >= best.calculated_at {
                    next
                } else {
                    best
                }
            })
            .ok_or(Error::SnapshotNotFound(settlement_id))
    }
}

/// In-memory snapshot store
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<SettlementId, Vec<SettlementResult>>>,
}

impl MemorySnapshotStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, result: &SettlementResult) -> Result<()> {
        self.snapshots
            .write()
            .entry(result.settlement_id)
            .or_default()
            .push(result.clone());
        tracing::debug!(settlement_id = %result.settlement_id, "Snapshot stored in memory");
        Ok(())
    }

    fn history(&self, settlement_id: SettlementId) -> Result<Vec<SettlementResult>> {
        Ok(self
            .snapshots
            .read()
            .get(&settlement_id)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_settlement(&self, settlement_id: SettlementId) -> Result<usize> {
        Ok(self
            .snapshots
            .write()
            .remove(&settlement_id)
            .map(|v| v.len())
            .unwrap_or(0))
    }
}

/// File-backed snapshot store: one JSON-lines file per settlement
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    data_dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open store rooted at `data_dir`, creating it if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Directory holding the snapshot files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, settlement_id: SettlementId) -> PathBuf {
        self.data_dir.join(format!("{}.jsonl", settlement_id))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, result: &SettlementResult) -> Result<()> {
        let path = self.path_for(result.settlement_id);
        let mut line = serde_json::to_string(result)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        tracing::info!(
            settlement_id = %result.settlement_id,
            path = %path.display(),
            "Snapshot saved"
        );
        Ok(())
    }

    fn history(&self, settlement_id: SettlementId) -> Result<Vec<SettlementResult>> {
        let path = self.path_for(settlement_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        fs::read_to_string(&path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }

    fn delete_settlement(&self, settlement_id: SettlementId) -> Result<usize> {
        let path = self.path_for(settlement_id);
        if !path.exists() {
            return Ok(0);
        }

        // Lines are counted, not parsed, so a corrupt file can still be removed
        let count = fs::read_to_string(&path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count();
        fs::remove_file(&path)?;

        tracing::info!(%settlement_id, removed = count, "Snapshots deleted");
        Ok(count)
    }
}
