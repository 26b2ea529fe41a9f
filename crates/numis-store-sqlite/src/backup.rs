//! Pre-write snapshots — a byte-for-byte copy of the whole store taken
//! before any migration batch writes.
//!
//! Snapshots are never cleaned up: the timestamped files double as audit
//! artifacts, and restoring one (by file copy) is the recovery path for a
//! failed batch.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use chrono::Utc;
use rusqlite::{Connection, backup::Backup};

use crate::{Error, Result, store::SqliteStore};

/// Pages copied per backup step. The whole store is at most tens of
/// thousands of rows, so a handful of steps completes the copy.
const PAGES_PER_STEP: std::os::raw::c_int = 256;

impl SqliteStore {
  /// Snapshot the entire store into `dir`, returning the snapshot path.
  ///
  /// Uses SQLite's online backup API rather than a filesystem copy so the
  /// snapshot is consistent even with WAL pages not yet checkpointed, and
  /// so in-memory stores can be snapshotted in tests. Any failure is
  /// fatal to the caller's batch: no write may proceed without a backup.
  pub fn snapshot_to(&self, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
      .map_err(|e| Error::Backup(format!("creating {}: {e}", dir.display())))?;

    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let mut path = dir.join(format!("catalog-{stamp}.db"));
    let mut n = 1;
    while path.exists() {
      n += 1;
      path = dir.join(format!("catalog-{stamp}-{n}.db"));
    }

    let mut dst = Connection::open(&path)
      .map_err(|e| Error::Backup(format!("opening {}: {e}", path.display())))?;

    {
      let backup = Backup::new(&self.conn, &mut dst)
        .map_err(|e| Error::Backup(e.to_string()))?;
      backup
        .run_to_completion(PAGES_PER_STEP, Duration::ZERO, None)
        .map_err(|e| Error::Backup(e.to_string()))?;
    }

    Ok(path)
  }
}
