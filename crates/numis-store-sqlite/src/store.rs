//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, Row};

use numis_core::{
  id::IssueId,
  record::{IssueRecord, MintFacility, Series, TypeCode},
  store::CatalogStore,
};

use crate::{
  Error, Result,
  encode::{
    RawIssue, RawSeries, encode_composition, encode_string_list, encode_varieties,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog store backed by a single SQLite file.
///
/// One connection, one writer process at a time — the catalog's
/// concurrency model is "batch scripts run sequentially", so no pooling or
/// locking beyond SQLite's own is needed.
pub struct SqliteStore {
  pub(crate) conn: Connection,
}

const ISSUE_COLUMNS: &str = "id, series_id, series_name, country, denomination, year, mint,
     business_strikes, proof_strikes, rarity, composition, weight_grams, diameter_mm,
     varieties, obverse_description, reverse_description,
     distinguishing_features, identification_keywords, common_names,
     source_citation, notes";

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  pub(crate) fn exists(&self, id: &IssueId) -> Result<bool> {
    let found: Option<bool> = self
      .conn
      .query_row(
        "SELECT 1 FROM issues WHERE id = ?1",
        rusqlite::params![id.to_string()],
        |_| Ok(true),
      )
      .optional()?;
    Ok(found.unwrap_or(false))
  }

  /// Write one issue row with the given conflict clause
  /// (`"OR REPLACE"`, `"OR IGNORE"`, or `""` for a strict insert).
  /// Returns the number of rows written.
  fn write_issue(&self, conflict_clause: &str, record: &IssueRecord) -> Result<usize> {
    let sql = format!(
      "INSERT {conflict_clause} INTO issues ({ISSUE_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
               ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
    );

    let composition_str = record
      .composition
      .as_ref()
      .map(encode_composition)
      .transpose()?;

    let written = self.conn.execute(
      &sql,
      rusqlite::params![
        record.id.to_string(),
        record.series_id,
        record.series_name,
        record.country,
        record.denomination,
        record.year.to_string(),
        record.mint,
        record.business_strikes.map(|v| v as i64),
        record.proof_strikes.map(|v| v as i64),
        record.rarity.map(|r| r.as_str()),
        composition_str,
        record.weight_grams,
        record.diameter_mm,
        encode_varieties(&record.varieties)?,
        record.obverse_description,
        record.reverse_description,
        encode_string_list(&record.distinguishing_features)?,
        encode_string_list(&record.identification_keywords)?,
        encode_string_list(&record.common_names)?,
        record.source_citation,
        record.notes,
      ],
    )?;
    Ok(written)
  }

  // ── Lookup metadata ─────────────────────────────────────────────────────

  pub fn upsert_mint_facility(&self, facility: &MintFacility) -> Result<()> {
    self.conn.execute(
      "INSERT OR REPLACE INTO mint_facilities (code, name, active_from, active_until)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![
        facility.code,
        facility.name,
        facility.active_from as i64,
        facility.active_until.map(|y| y as i64),
      ],
    )?;
    Ok(())
  }

  pub fn get_mint_facility(&self, code: &str) -> Result<Option<MintFacility>> {
    let row = self
      .conn
      .query_row(
        "SELECT code, name, active_from, active_until FROM mint_facilities WHERE code = ?1",
        rusqlite::params![code],
        |row| {
          Ok(MintFacility {
            code:         row.get(0)?,
            name:         row.get(1)?,
            active_from:  row.get::<_, i64>(2)? as u16,
            active_until: row.get::<_, Option<i64>>(3)?.map(|y| y as u16),
          })
        },
      )
      .optional()?;
    Ok(row)
  }

  pub fn upsert_type_code(&self, tc: &TypeCode) -> Result<()> {
    self.conn.execute(
      "INSERT OR REPLACE INTO type_codes (code, category, face_value) VALUES (?1, ?2, ?3)",
      rusqlite::params![tc.code, tc.category, tc.face_value],
    )?;
    Ok(())
  }

  pub fn get_type_code(&self, code: &str) -> Result<Option<TypeCode>> {
    let row = self
      .conn
      .query_row(
        "SELECT code, category, face_value FROM type_codes WHERE code = ?1",
        rusqlite::params![code],
        |row| {
          Ok(TypeCode {
            code:       row.get(0)?,
            category:   row.get(1)?,
            face_value: row.get(2)?,
          })
        },
      )
      .optional()?;
    Ok(row)
  }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

fn raw_issue_from_row(row: &Row<'_>) -> rusqlite::Result<RawIssue> {
  Ok(RawIssue {
    id:                      row.get(0)?,
    series_id:               row.get(1)?,
    series_name:             row.get(2)?,
    country:                 row.get(3)?,
    denomination:            row.get(4)?,
    // column 5 is the denormalised year; the id is authoritative
    mint:                    row.get(6)?,
    business_strikes:        row.get(7)?,
    proof_strikes:           row.get(8)?,
    rarity:                  row.get(9)?,
    composition:             row.get(10)?,
    weight_grams:            row.get(11)?,
    diameter_mm:             row.get(12)?,
    varieties:               row.get(13)?,
    obverse_description:     row.get(14)?,
    reverse_description:     row.get(15)?,
    distinguishing_features: row.get(16)?,
    identification_keywords: row.get(17)?,
    common_names:            row.get(18)?,
    source_citation:         row.get(19)?,
    notes:                   row.get(20)?,
  })
}

fn raw_series_from_row(row: &Row<'_>) -> rusqlite::Result<RawSeries> {
  Ok(RawSeries {
    series_id:    row.get(0)?,
    series_name:  row.get(1)?,
    country:      row.get(2)?,
    denomination: row.get(3)?,
    start_year:   row.get(4)?,
    end_year:     row.get(5)?,
    aliases:      row.get(6)?,
    series_code:  row.get(7)?,
  })
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  fn upsert(&self, record: &IssueRecord) -> Result<()> {
    self.write_issue("OR REPLACE", record)?;
    Ok(())
  }

  fn insert_if_absent(&self, record: &IssueRecord) -> Result<bool> {
    let written = self.write_issue("OR IGNORE", record)?;
    Ok(written > 0)
  }

  fn insert_new(&self, record: &IssueRecord) -> Result<()> {
    match self.write_issue("", record) {
      Ok(_) => Ok(()),
      Err(Error::Database(rusqlite::Error::SqliteFailure(err, _)))
        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Err(Error::Conflict(record.id.to_string()))
      }
      Err(e) => Err(e),
    }
  }

  fn delete(&self, id: &IssueId) -> Result<bool> {
    let removed = self.conn.execute(
      "DELETE FROM issues WHERE id = ?1",
      rusqlite::params![id.to_string()],
    )?;
    Ok(removed > 0)
  }

  fn get(&self, id: &IssueId) -> Result<Option<IssueRecord>> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
    let raw = self
      .conn
      .query_row(&sql, rusqlite::params![id.to_string()], raw_issue_from_row)
      .optional()?;
    raw.map(RawIssue::into_record).transpose()
  }

  fn list_issues(&self, denomination: Option<&str>) -> Result<Vec<IssueRecord>> {
    let raws: Vec<RawIssue> = if let Some(denom) = denomination {
      let sql = format!(
        "SELECT {ISSUE_COLUMNS} FROM issues WHERE denomination = ?1 ORDER BY id"
      );
      let mut stmt = self.conn.prepare(&sql)?;
      let rows = stmt
        .query_map(rusqlite::params![denom], raw_issue_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      rows
    } else {
      let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues ORDER BY id");
      let mut stmt = self.conn.prepare(&sql)?;
      let rows = stmt
        .query_map([], raw_issue_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      rows
    };

    raws.into_iter().map(RawIssue::into_record).collect()
  }

  fn count_issues(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
    Ok(count as u64)
  }

  // ── Series registry ───────────────────────────────────────────────────

  fn upsert_series(&self, series: &Series) -> Result<()> {
    self.conn.execute(
      "INSERT OR REPLACE INTO series
         (series_id, series_name, country, denomination, start_year, end_year, aliases, series_code)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      rusqlite::params![
        series.series_id,
        series.series_name,
        series.country,
        series.denomination,
        series.start_year as i64,
        series.end_year.map(|y| y as i64),
        encode_string_list(&series.aliases)?,
        series.series_code,
      ],
    )?;
    Ok(())
  }

  fn get_series(&self, series_id: &str) -> Result<Option<Series>> {
    let raw = self
      .conn
      .query_row(
        "SELECT series_id, series_name, country, denomination, start_year, end_year,
                aliases, series_code
         FROM series WHERE series_id = ?1",
        rusqlite::params![series_id],
        raw_series_from_row,
      )
      .optional()?;
    raw.map(RawSeries::into_series).transpose()
  }

  fn list_series(&self) -> Result<Vec<Series>> {
    let mut stmt = self.conn.prepare(
      "SELECT series_id, series_name, country, denomination, start_year, end_year,
              aliases, series_code
       FROM series ORDER BY series_id",
    )?;
    let raws = stmt
      .query_map([], raw_series_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raws.into_iter().map(RawSeries::into_series).collect()
  }
}
