//! Error type for `numis-store-sqlite`.

use numis_core::validate::Rejection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] numis_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A well-formed record collided with an existing identifier on a
  /// strict insert. Distinct from validation failure by design.
  #[error("identifier conflict: {0} already exists")]
  Conflict(String),

  /// The pre-write snapshot could not be taken. Fatal: no write is
  /// attempted without a successful backup.
  #[error("backup failed: {0}")]
  Backup(String),

  /// One or more records in a migration failed validation. The whole
  /// batch is refused before any write.
  #[error("{} record(s) failed validation", .0.len())]
  Rejected(Vec<Rejection>),

  #[error("split of {parent}: replacement {id} does not extend the parent identifier")]
  SplitIdMismatch { parent: String, id: String },

  #[error(
    "split of {parent}: replacement business strikes sum to {actual}, declared combined total is {declared}"
  )]
  SplitSumMismatch {
    parent:   String,
    declared: u64,
    actual:   u64,
  },

  #[error("series {series_id}: series_code {series_code:?} does not match the TYPE segment of {id}")]
  SeriesCodeMismatch {
    series_id:   String,
    series_code: String,
    id:          String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
