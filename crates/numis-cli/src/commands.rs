//! Subcommand implementations. Libraries return reports; printing and
//! exit codes live here.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};

use numis_core::store::CatalogStore as _;
use numis_export::ExportOptions;
use numis_store_sqlite::{ApplyReport, Migration, SqliteStore, dry_run};

use crate::seed;

/// Where snapshots land when `--backup-dir` is not given: a `backups`
/// directory next to the catalog file.
fn default_backup_dir(db: &Path) -> PathBuf {
  db.parent().unwrap_or_else(|| Path::new(".")).join("backups")
}

fn load_migration(path: &Path) -> anyhow::Result<Migration> {
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read migration file {}", path.display()))?;
  serde_json::from_str(&text)
    .with_context(|| format!("failed to parse migration file {}", path.display()))
}

/// Print every problem a report carries, then the write summary.
fn print_report(report: &ApplyReport) {
  for rejection in &report.rejections {
    eprintln!("rejected {rejection}");
  }
  for problem in &report.invariant_errors {
    eprintln!("invariant: {problem}");
  }

  let verb = if report.dry_run { "would write" } else { "wrote" };
  println!(
    "{}: {verb} {} inserted, {} replaced, {} skipped, {} deleted, {} series",
    report.migration,
    report.inserted,
    report.replaced,
    report.skipped,
    report.deleted,
    report.series_written,
  );
  if let Some(snapshot) = &report.snapshot {
    println!("snapshot: {}", snapshot.display());
  }
}

pub fn init(db: &Path) -> anyhow::Result<()> {
  let store = SqliteStore::open(db)
    .with_context(|| format!("failed to open catalog at {}", db.display()))?;
  let (mints, types) = seed::seed_lookup_tables(&store)?;
  println!("initialised {} ({mints} mints, {types} type codes)", db.display());
  Ok(())
}

pub fn validate(migration: &Path) -> anyhow::Result<()> {
  let migration = load_migration(migration)?;
  let report = dry_run(&migration);
  print_report(&report);
  if !report.is_clean() {
    bail!(
      "{} record(s) rejected, {} invariant violation(s)",
      report.rejections.len(),
      report.invariant_errors.len()
    );
  }
  Ok(())
}

pub fn apply(
  migration: &Path,
  db: &Path,
  backup_dir: Option<&Path>,
  dry: bool,
) -> anyhow::Result<()> {
  let migration = load_migration(migration)?;

  if dry {
    let report = dry_run(&migration);
    print_report(&report);
    if !report.is_clean() {
      bail!("migration would fail; nothing was written");
    }
    return Ok(());
  }

  let store = SqliteStore::open(db)
    .with_context(|| format!("failed to open catalog at {}", db.display()))?;
  let backup_dir = backup_dir
    .map(Path::to_path_buf)
    .unwrap_or_else(|| default_backup_dir(db));

  let report = match store.apply(&migration, &backup_dir) {
    Ok(report) => report,
    // Surface every rejected record, not just the count.
    Err(numis_store_sqlite::Error::Rejected(rejections)) => {
      for rejection in &rejections {
        eprintln!("rejected {rejection}");
      }
      bail!(
        "{} record(s) failed validation in {}; nothing was written",
        rejections.len(),
        migration.name
      );
    }
    Err(e) => {
      return Err(e)
        .with_context(|| format!("failed to apply migration {}", migration.name));
    }
  };
  print_report(&report);
  Ok(())
}

pub fn export(
  db: &Path,
  denomination: &str,
  country: Option<String>,
  face_value: Option<f64>,
  out: Option<&Path>,
) -> anyhow::Result<()> {
  let store = SqliteStore::open(db)
    .with_context(|| format!("failed to open catalog at {}", db.display()))?;

  let records = store.list_issues(Some(denomination))?;
  if records.is_empty() {
    bail!("no records found for denomination {denomination:?}");
  }
  let registry = store.list_series()?;

  let country = country.unwrap_or_else(|| records[0].country.clone());
  // The type-code table carries face values; the first record's TYPE
  // segment is representative for a single denomination.
  let face_value = match face_value {
    Some(v) => Some(v),
    None => store
      .get_type_code(records[0].id.type_code())?
      .map(|tc| tc.face_value),
  };

  let options = ExportOptions { country, denomination: denomination.to_owned(), face_value };
  let document = numis_export::export_denomination(records, &registry, &options);
  let json = numis_export::to_json_string(&document)?;

  match out {
    Some(path) => {
      std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
      println!("exported {} series to {}", document.series.len(), path.display());
    }
    None => println!("{json}"),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backup_dir_defaults_to_a_sibling_of_the_catalog() {
    assert_eq!(
      default_backup_dir(Path::new("/data/catalog.db")),
      PathBuf::from("/data/backups")
    );
    assert_eq!(default_backup_dir(Path::new("catalog.db")), PathBuf::from("backups"));
  }

  #[test]
  fn apply_round_trips_through_a_file_backed_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.db");
    init(&db).unwrap();

    let migration = dir.path().join("m.json");
    std::fs::write(
      &migration,
      r#"{
        "name": "smoke",
        "ops": [
          { "op": "upsert", "record": {
              "id": "US-TEST-2024-P",
              "series_id": "test-series",
              "series_name": "Test Series",
              "country": "US",
              "denomination": "Test",
              "year": "2024",
              "mint": "P",
              "business_strikes": 1000000,
              "obverse_description": "Liberty head facing left, date below",
              "reverse_description": "Denomination within a wreath of oak leaves",
              "distinguishing_features": ["plain edge"],
              "identification_keywords": ["test"],
              "common_names": ["Test Coin"]
          }}
        ]
      }"#,
    )
    .unwrap();

    validate(&migration).unwrap();
    apply(&migration, &db, None, true).unwrap();
    apply(&migration, &db, None, false).unwrap();

    let out = dir.path().join("test.json");
    export(&db, "Test", None, None, Some(&out)).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("US-TEST-2024-P"));

    // The default backup directory was created next to the catalog.
    assert!(dir.path().join("backups").read_dir().unwrap().next().is_some());
  }

  #[test]
  fn apply_rejects_invalid_records_with_a_specific_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.db");
    init(&db).unwrap();

    let migration = dir.path().join("bad.json");
    std::fs::write(
      &migration,
      r#"{
        "name": "bad-batch",
        "ops": [ { "op": "upsert", "record": { "id": "us-test-2024-p" } } ]
      }"#,
    )
    .unwrap();

    let err = apply(&migration, &db, None, false).unwrap_err();
    assert!(err.to_string().contains("failed validation"), "got: {err}");
    assert!(err.to_string().contains("bad-batch"), "got: {err}");

    // Nothing landed.
    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.count_issues().unwrap(), 0);
  }

  #[test]
  fn validate_fails_on_a_bad_migration() {
    let dir = tempfile::tempdir().unwrap();
    let migration = dir.path().join("bad.json");
    std::fs::write(
      &migration,
      r#"{
        "name": "bad",
        "ops": [ { "op": "delete", "id": "us-cent-1999-p" } ]
      }"#,
    )
    .unwrap();
    assert!(validate(&migration).is_err());
  }
}
