//! Migration batches — the declarative "apply records" engine.
//!
//! A migration file names a batch of upserts, deletes, splits, and series
//! writes. Every draft is validated up front (all violations reported, no
//! short-circuit), a snapshot of the whole store is taken, and then every
//! write runs inside one transaction: either the whole batch lands or none
//! of it does. Re-running the same migration never duplicates data.

use std::{
  collections::{HashMap, HashSet},
  path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, info};

use numis_core::{
  id::{IdError, IssueId},
  record::{IssueRecord, Series},
  store::CatalogStore,
  validate::{self, RecordDraft, Rejection, Violation},
};

use crate::{Error, Result, store::SqliteStore};

// ─── Migration description ───────────────────────────────────────────────────

/// What a re-run of the migration should do to records that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteIntent {
  /// Always overwrite: the migration's data is authoritative.
  #[default]
  Overwrite,
  /// Add only what is missing: existing records are left untouched.
  AddIfMissing,
}

/// One operation within a migration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MigrationOp {
  /// Insert or replace one issue record.
  Upsert { record: RecordDraft },

  /// Hard-remove one issue record.
  Delete { id: String },

  /// Replace a combined record with two or more replacements whose
  /// identifiers extend the parent's (by differing suffixes) and whose
  /// business strikes partition the declared combined total.
  Split {
    parent: String,
    combined_business_strikes: u64,
    replacements: Vec<RecordDraft>,
  },

  /// Insert or replace one series registry entry.
  Series { series: Series },
}

/// A declarative migration: the redesign's single data-description format,
/// replacing per-script copy-pasted literal tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Migration {
  pub name: String,
  #[serde(default)]
  pub intent: WriteIntent,
  pub ops: Vec<MigrationOp>,
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Outcome of an apply or dry run. Counts reflect writes actually
/// performed (or, for a dry run, writes that would be attempted).
#[derive(Debug, Default)]
pub struct ApplyReport {
  pub migration:      String,
  pub dry_run:        bool,
  pub snapshot:       Option<PathBuf>,
  pub inserted:       usize,
  pub replaced:       usize,
  pub skipped:        usize,
  pub deleted:        usize,
  pub series_written: usize,
  /// Per-record validation failures (complete, never truncated).
  pub rejections: Vec<Rejection>,
  /// Write-time invariant failures (split sums, series-code mismatches).
  pub invariant_errors: Vec<String>,
}

impl ApplyReport {
  pub fn is_clean(&self) -> bool {
    self.rejections.is_empty() && self.invariant_errors.is_empty()
  }
}

// ─── Planning ────────────────────────────────────────────────────────────────

enum PlannedOp {
  Upsert(IssueRecord),
  Delete(IssueId),
  Split {
    parent:       IssueId,
    replacements: Vec<IssueRecord>,
  },
  Series(Series),
}

struct Plan {
  ops:        Vec<PlannedOp>,
  rejections: Vec<Rejection>,
  violations: Vec<Error>,
}

impl Plan {
  fn records(&self) -> impl Iterator<Item = &IssueRecord> {
    self.ops.iter().flat_map(|op| match op {
      PlannedOp::Upsert(r) => std::slice::from_ref(r),
      PlannedOp::Split { replacements, .. } => replacements.as_slice(),
      PlannedOp::Delete(_) | PlannedOp::Series(_) => &[],
    })
  }
}

fn reject_id(raw: &str, err: IdError) -> Rejection {
  Rejection { id: raw.to_owned(), violations: vec![Violation::Id(err)] }
}

/// Validate every draft and invariant in the migration, producing the
/// concrete write plan. Collects everything; never stops at the first
/// problem.
fn plan_migration(migration: &Migration) -> Plan {
  let mut plan = Plan { ops: Vec::new(), rejections: Vec::new(), violations: Vec::new() };

  // series_code declared by this migration, keyed by series_id.
  let mut declared_codes: HashMap<&str, &str> = HashMap::new();
  for op in &migration.ops {
    if let MigrationOp::Series { series } = op {
      if let Some(code) = &series.series_code {
        declared_codes.insert(series.series_id.as_str(), code.as_str());
      }
    }
  }

  for op in &migration.ops {
    match op {
      MigrationOp::Upsert { record } => match validate::check(record) {
        Ok(record) => plan.ops.push(PlannedOp::Upsert(record)),
        Err(rejection) => plan.rejections.push(rejection),
      },

      MigrationOp::Delete { id } => match IssueId::parse(id) {
        Ok(id) => plan.ops.push(PlannedOp::Delete(id)),
        Err(e) => plan.rejections.push(reject_id(id, e)),
      },

      MigrationOp::Split { parent, combined_business_strikes, replacements } => {
        let parent_id = match IssueId::parse(parent) {
          Ok(id) => id,
          Err(e) => {
            plan.rejections.push(reject_id(parent, e));
            continue;
          }
        };

        let report = validate::check_batch(replacements);
        plan.rejections.extend(report.invalid);
        if report.valid.len() != replacements.len() {
          continue;
        }

        for record in &report.valid {
          if !record.id.extends(&parent_id) {
            plan.violations.push(Error::SplitIdMismatch {
              parent: parent_id.to_string(),
              id:     record.id.to_string(),
            });
          }
        }

        let actual: u64 = report
          .valid
          .iter()
          .filter_map(|r| r.business_strikes)
          .sum();
        if actual != *combined_business_strikes {
          plan.violations.push(Error::SplitSumMismatch {
            parent:   parent_id.to_string(),
            declared: *combined_business_strikes,
            actual,
          });
        }

        plan.ops.push(PlannedOp::Split { parent: parent_id, replacements: report.valid });
      }

      MigrationOp::Series { series } => {
        plan.ops.push(PlannedOp::Series(series.clone()));
      }
    }
  }

  // series_code must equal the TYPE segment of every member id written in
  // this migration.
  let mut code_violations = Vec::new();
  for record in plan.records() {
    if let Some(code) = declared_codes.get(record.series_id.as_str()) {
      if record.id.type_code() != *code {
        code_violations.push(Error::SeriesCodeMismatch {
          series_id:   record.series_id.clone(),
          series_code: (*code).to_owned(),
          id:          record.id.to_string(),
        });
      }
    }
  }
  plan.violations.extend(code_violations);

  plan
}

// ─── Dry run ─────────────────────────────────────────────────────────────────

/// Validate a migration and report what it would do, without a store and
/// without writing anything. Every violation is reported.
pub fn dry_run(migration: &Migration) -> ApplyReport {
  let plan = plan_migration(migration);

  let mut report = ApplyReport {
    migration: migration.name.clone(),
    dry_run: true,
    rejections: plan.rejections,
    invariant_errors: plan.violations.iter().map(Error::to_string).collect(),
    ..ApplyReport::default()
  };

  for op in &plan.ops {
    match op {
      PlannedOp::Upsert(_) => report.inserted += 1,
      PlannedOp::Delete(_) => report.deleted += 1,
      PlannedOp::Split { replacements, .. } => {
        report.deleted += 1;
        report.inserted += replacements.len();
      }
      PlannedOp::Series(_) => report.series_written += 1,
    }
  }

  report
}

// ─── Apply ───────────────────────────────────────────────────────────────────

impl SqliteStore {
  /// Apply a migration: validate everything, snapshot the store, then run
  /// every write inside one transaction. Any failure unwinds the whole
  /// batch; the snapshot is the recovery path.
  pub fn apply(&self, migration: &Migration, snapshot_dir: &Path) -> Result<ApplyReport> {
    let mut plan = plan_migration(migration);
    if !plan.rejections.is_empty() {
      return Err(Error::Rejected(plan.rejections));
    }
    if !plan.violations.is_empty() {
      return Err(plan.violations.remove(0));
    }

    // Records must also agree with series_code values already registered
    // in the store. Series rewritten by this migration were already
    // checked against their declared code during planning; the stale
    // store row must not override them.
    let redeclared: HashSet<&str> = plan
      .ops
      .iter()
      .filter_map(|op| match op {
        PlannedOp::Series(series) => Some(series.series_id.as_str()),
        _ => None,
      })
      .collect();
    for record in plan.records() {
      if redeclared.contains(record.series_id.as_str()) {
        continue;
      }
      if let Some(series) = self.get_series(&record.series_id)? {
        if let Some(code) = &series.series_code {
          if record.id.type_code() != code {
            return Err(Error::SeriesCodeMismatch {
              series_id:   record.series_id.clone(),
              series_code: code.clone(),
              id:          record.id.to_string(),
            });
          }
        }
      }
    }

    let snapshot = self.snapshot_to(snapshot_dir)?;
    info!(migration = %migration.name, snapshot = %snapshot.display(), "store snapshot taken");

    let mut report = ApplyReport {
      migration: migration.name.clone(),
      snapshot:  Some(snapshot),
      ..ApplyReport::default()
    };

    let txn = self.conn.unchecked_transaction()?;
    for op in &plan.ops {
      match op {
        PlannedOp::Upsert(record) => match migration.intent {
          WriteIntent::Overwrite => {
            if self.exists(&record.id)? {
              report.replaced += 1;
            } else {
              report.inserted += 1;
            }
            self.upsert(record)?;
          }
          WriteIntent::AddIfMissing => {
            if self.insert_if_absent(record)? {
              report.inserted += 1;
            } else {
              debug!(id = %record.id, "already present, skipped");
              report.skipped += 1;
            }
          }
        },

        PlannedOp::Delete(id) => {
          if self.delete(id)? {
            report.deleted += 1;
          }
        }

        // Splits are corrective and always overwrite, regardless of the
        // migration's intent; the delete is a no-op on re-runs.
        PlannedOp::Split { parent, replacements } => {
          // Existence must be captured before the parent delete: on a
          // re-run the unsuffixed replacement shares the parent's id.
          let mut present = Vec::with_capacity(replacements.len());
          for record in replacements {
            present.push(self.exists(&record.id)?);
          }
          if self.delete(parent)? {
            report.deleted += 1;
          }
          for (record, was_present) in replacements.iter().zip(present) {
            if was_present {
              report.replaced += 1;
            } else {
              report.inserted += 1;
            }
            self.upsert(record)?;
          }
        }

        PlannedOp::Series(series) => {
          self.upsert_series(series)?;
          report.series_written += 1;
        }
      }
    }
    txn.commit()?;

    info!(
      migration = %migration.name,
      inserted = report.inserted,
      replaced = report.replaced,
      skipped = report.skipped,
      deleted = report.deleted,
      "migration applied"
    );
    Ok(report)
  }
}
