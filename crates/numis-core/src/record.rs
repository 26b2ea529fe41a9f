//! Issue records and the series registry — the central entities of the
//! catalog.
//!
//! An issue is one struck/printed monetary object for one year/mint; a
//! series groups many issues under a single design run (e.g. "Morgan
//! Dollar"). Records here are canonical: they exist only after passing
//! validation (see [`crate::validate`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::{IssueId, IssueYear};

/// Material name → fraction of the alloy. Fractions need not sum to
/// exactly 1 (trace elements); no sum invariant is enforced.
pub type Composition = BTreeMap<String, f64>;

// ─── Rarity ──────────────────────────────────────────────────────────────────

/// Collector rarity class; a fixed closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
  Key,
  #[serde(rename = "semi-key")]
  SemiKey,
  Scarce,
  Common,
}

impl Rarity {
  /// The string stored in the `rarity` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Key => "key",
      Self::SemiKey => "semi-key",
      Self::Scarce => "scarce",
      Self::Common => "common",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "key" => Some(Self::Key),
      "semi-key" => Some(Self::SemiKey),
      "scarce" => Some(Self::Scarce),
      "common" => Some(Self::Common),
      _ => None,
    }
  }
}

// ─── Varieties ───────────────────────────────────────────────────────────────

/// A known die/design variation under the same issue (e.g. a doubled die).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variety {
  pub id:          String,
  pub name:        String,
  pub description: String,
}

// ─── IssueRecord ─────────────────────────────────────────────────────────────

/// A canonical issue record, keyed by its immutable identifier.
///
/// The five visual-identification fields are mandatory for every record
/// written through the validation boundary; rows predating that rule may
/// still be read back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
  pub id:           IssueId,
  pub series_id:    String,
  pub series_name:  String,
  pub country:      String,
  pub denomination: String,
  pub year:         IssueYear,
  pub mint:         String,

  /// Mintage counts; either may be unknown.
  pub business_strikes: Option<u64>,
  pub proof_strikes:    Option<u64>,

  pub rarity:       Option<Rarity>,
  pub composition:  Option<Composition>,
  pub weight_grams: Option<f64>,
  pub diameter_mm:  Option<f64>,

  /// Ordered sub-variant descriptors; may be empty.
  pub varieties: Vec<Variety>,

  // Visual identification (mandatory for new records).
  pub obverse_description:     String,
  pub reverse_description:     String,
  pub distinguishing_features: Vec<String>,
  pub identification_keywords: Vec<String>,
  pub common_names:            Vec<String>,

  pub source_citation: Option<String>,
  pub notes:           Option<String>,
}

// ─── Series registry ─────────────────────────────────────────────────────────

/// A series registry entry — one design/run grouping many issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
  pub series_id:    String,
  pub series_name:  String,
  pub country:      String,
  pub denomination: String,
  pub start_year:   u16,
  /// `None` = ongoing.
  pub end_year: Option<u16>,
  /// Alternate names ("Mercury Dime" for the Winged Liberty Head dime).
  #[serde(default)]
  pub aliases: Vec<String>,
  /// Short abbreviation; when present it must equal the TYPE segment of
  /// every member issue id (enforced at write time by the apply engine).
  pub series_code: Option<String>,
}

// ─── Lookup metadata ─────────────────────────────────────────────────────────

/// Mint facility metadata (code → name and active year range).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintFacility {
  pub code:        String,
  pub name:        String,
  pub active_from: u16,
  /// `None` = still striking.
  pub active_until: Option<u16>,
}

/// Type-code metadata (code → category and face value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCode {
  pub code:       String,
  pub category:   String,
  pub face_value: f64,
}
