//! The `CatalogStore` trait.
//!
//! Implemented by storage backends (e.g. `numis-store-sqlite`). Higher
//! layers (the export transformer, the CLI) depend on this abstraction,
//! not on any concrete backend.
//!
//! All operations are synchronous: the catalog is a batch system with one
//! writer process at a time and no concurrent access (readers run only
//! after writers have committed).

use crate::{
  id::IssueId,
  record::{IssueRecord, Series},
};

/// Abstraction over a catalog storage backend.
///
/// Writes are keyed by the issue identifier. `upsert` fully replaces an
/// existing record (insert-or-replace, never insert-or-patch), so applying
/// the same record twice yields the same final state as applying it once.
pub trait CatalogStore {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Issues ────────────────────────────────────────────────────────────

  /// Insert or fully replace the record with the same identifier.
  fn upsert(&self, record: &IssueRecord) -> Result<(), Self::Error>;

  /// Insert only when the identifier is absent. Returns `true` if the
  /// record was written, `false` if an existing record was left intact.
  fn insert_if_absent(&self, record: &IssueRecord) -> Result<bool, Self::Error>;

  /// Strict insert: fails with a constraint error when the identifier is
  /// already present. A well-formed record can still collide; that is a
  /// store-level conflict, not a validation failure.
  fn insert_new(&self, record: &IssueRecord) -> Result<(), Self::Error>;

  /// Hard-remove a record. Returns `true` if a row was deleted. Used only
  /// as the first half of a split operation.
  fn delete(&self, id: &IssueId) -> Result<bool, Self::Error>;

  /// Retrieve a record by identifier. Returns `None` if not found.
  fn get(&self, id: &IssueId) -> Result<Option<IssueRecord>, Self::Error>;

  /// List records, optionally restricted to one denomination, in a stable
  /// (identifier) order.
  fn list_issues(&self, denomination: Option<&str>) -> Result<Vec<IssueRecord>, Self::Error>;

  fn count_issues(&self) -> Result<u64, Self::Error>;

  // ── Series registry ───────────────────────────────────────────────────

  fn upsert_series(&self, series: &Series) -> Result<(), Self::Error>;

  fn get_series(&self, series_id: &str) -> Result<Option<Series>, Self::Error>;

  fn list_series(&self) -> Result<Vec<Series>, Self::Error>;
}
