//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Structured fields (composition, varieties, the visual-id lists, series
//! aliases) are stored as compact JSON. Years are stored as their canonical
//! segment text (`1909`, `XXXX`) so they survive round trips byte-for-byte.

use numis_core::{
  record::{Composition, IssueRecord, Rarity, Series, Variety},
};

use crate::{Error, Result};

// ─── Field codecs ─────────────────────────────────────────────────────────────

pub fn encode_string_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_string_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_varieties(items: &[Variety]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_varieties(s: &str) -> Result<Vec<Variety>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_composition(c: &Composition) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn decode_composition(s: &str) -> Result<Composition> {
  Ok(serde_json::from_str(s)?)
}

pub fn decode_rarity(s: &str) -> Result<Rarity> {
  Rarity::parse(s).ok_or_else(|| Error::Core(numis_core::Error::UnknownRarity(s.to_owned())))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read directly from an `issues` row.
pub struct RawIssue {
  pub id:                      String,
  pub series_id:               String,
  pub series_name:             String,
  pub country:                 String,
  pub denomination:            String,
  pub mint:                    String,
  pub business_strikes:        Option<i64>,
  pub proof_strikes:           Option<i64>,
  pub rarity:                  Option<String>,
  pub composition:             Option<String>,
  pub weight_grams:            Option<f64>,
  pub diameter_mm:             Option<f64>,
  pub varieties:               String,
  pub obverse_description:     String,
  pub reverse_description:     String,
  pub distinguishing_features: String,
  pub identification_keywords: String,
  pub common_names:            String,
  pub source_citation:         Option<String>,
  pub notes:                   Option<String>,
}

impl RawIssue {
  pub fn into_record(self) -> Result<IssueRecord> {
    // The id column is authoritative for year/mint; the denormalised year
    // column exists only for SQL filtering.
    let id = numis_core::id::IssueId::parse(&self.id)
      .map_err(numis_core::Error::Id)
      .map_err(Error::Core)?;
    let year = id.year();

    let rarity = self.rarity.as_deref().map(decode_rarity).transpose()?;
    let composition = self.composition.as_deref().map(decode_composition).transpose()?;

    Ok(IssueRecord {
      id,
      year,
      series_id: self.series_id,
      series_name: self.series_name,
      country: self.country,
      denomination: self.denomination,
      mint: self.mint,
      business_strikes: self.business_strikes.map(|v| v as u64),
      proof_strikes: self.proof_strikes.map(|v| v as u64),
      rarity,
      composition,
      weight_grams: self.weight_grams,
      diameter_mm: self.diameter_mm,
      varieties: decode_varieties(&self.varieties)?,
      obverse_description: self.obverse_description,
      reverse_description: self.reverse_description,
      distinguishing_features: decode_string_list(&self.distinguishing_features)?,
      identification_keywords: decode_string_list(&self.identification_keywords)?,
      common_names: decode_string_list(&self.common_names)?,
      source_citation: self.source_citation,
      notes: self.notes,
    })
  }
}

/// Raw column values read directly from a `series` row.
pub struct RawSeries {
  pub series_id:    String,
  pub series_name:  String,
  pub country:      String,
  pub denomination: String,
  pub start_year:   i64,
  pub end_year:     Option<i64>,
  pub aliases:      String,
  pub series_code:  Option<String>,
}

impl RawSeries {
  pub fn into_series(self) -> Result<Series> {
    Ok(Series {
      series_id: self.series_id,
      series_name: self.series_name,
      country: self.country,
      denomination: self.denomination,
      start_year: self.start_year as u16,
      end_year: self.end_year.map(|y| y as u16),
      aliases: decode_string_list(&self.aliases)?,
      series_code: self.series_code,
    })
  }
}
