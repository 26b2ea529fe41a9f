//! Output document types for the export format.
//!
//! Optional attributes are omitted rather than emitted as `null` — a
//! deliberate size/clarity choice for the consumer format.

use chrono::{DateTime, Utc};
use numis_core::record::{Composition, Rarity, Variety};
use serde::Serialize;

/// Root of an exported denomination document.
#[derive(Debug, Serialize)]
pub struct CatalogDocument {
  pub country:      String,
  pub denomination: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub face_value: Option<f64>,
  /// Stamped at generation time; excluded from golden-file comparisons.
  pub generated_at: DateTime<Utc>,
  pub series:       Vec<SeriesEntry>,
}

/// [start, end] over a series' members with concrete years.
/// Both bounds absent when every member carries the any-year sentinel.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct YearSpan {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start: Option<u16>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end: Option<u16>,
}

/// Representative physical measurements for a series.
#[derive(Debug, Serialize)]
pub struct Specifications {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weight_grams: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diameter_mm: Option<f64>,
}

/// One contiguous run of years sharing an identical composition.
/// Every series has at least one period: series with no composition data
/// get a single unspecified period spanning the whole series.
#[derive(Debug, Serialize)]
pub struct CompositionPeriod {
  pub years: YearSpan,
  pub alloy: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub composition: Option<Composition>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weight_grams: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SeriesEntry {
  pub series_id:           String,
  pub series_name:         String,
  pub years:               YearSpan,
  pub specifications:      Specifications,
  pub composition_periods: Vec<CompositionPeriod>,
  pub coins:               Vec<CoinEntry>,
}

/// One issue, with absent optional attributes omitted entirely.
#[derive(Debug, Serialize)]
pub struct CoinEntry {
  pub id:   String,
  pub year: String,
  pub mint: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub business_strikes: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub proof_strikes: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rarity: Option<Rarity>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weight_grams: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diameter_mm: Option<f64>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub varieties: Vec<Variety>,
  pub obverse_description:     String,
  pub reverse_description:     String,
  pub distinguishing_features: Vec<String>,
  pub identification_keywords: Vec<String>,
  pub common_names:            Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source_citation: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}
