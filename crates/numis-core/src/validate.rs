//! Record validation — the gate every candidate record passes before it
//! may be written to the store.
//!
//! Validation never short-circuits: all violations for a record are
//! collected and returned together, so a whole migration file can be
//! checked (and fully reported) before the store is touched.

use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
  id::{IdError, IssueId},
  record::{Composition, IssueRecord, Rarity, Variety},
};

// ─── RawList ─────────────────────────────────────────────────────────────────

/// A list field at the ingestion boundary.
///
/// Migration data supplies list fields either as native lists or as
/// JSON-encoded strings (a legacy of how older rows were stored). Both
/// forms funnel through one [`RawList::normalize`] step; validator code
/// never re-implements the fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawList<T> {
  Native(Vec<T>),
  Encoded(String),
}

impl<T> Default for RawList<T> {
  fn default() -> Self { Self::Native(Vec::new()) }
}

impl<T: DeserializeOwned> RawList<T> {
  /// Produce the canonical in-memory list, parsing the encoded form.
  pub fn normalize(&self) -> Result<Vec<T>, serde_json::Error>
  where
    T: Clone,
  {
    match self {
      Self::Native(items) => Ok(items.clone()),
      Self::Encoded(raw) => serde_json::from_str(raw),
    }
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// A candidate record as it arrives from a migration file: identifiers are
/// raw strings, list fields are [`RawList`], counts are signed so that
/// negative input is reported as a violation rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
  pub id:           String,
  pub series_id:    String,
  pub series_name:  String,
  pub country:      String,
  pub denomination: String,
  pub year:         String,
  pub mint:         String,

  pub business_strikes: Option<i64>,
  pub proof_strikes:    Option<i64>,

  pub rarity:       Option<String>,
  pub composition:  Option<Composition>,
  pub weight_grams: Option<f64>,
  pub diameter_mm:  Option<f64>,

  pub varieties: RawList<Variety>,

  pub obverse_description:     String,
  pub reverse_description:     String,
  pub distinguishing_features: RawList<String>,
  pub identification_keywords: RawList<String>,
  pub common_names:            RawList<String>,

  pub source_citation: Option<String>,
  pub notes:           Option<String>,
}

// ─── Violations ──────────────────────────────────────────────────────────────

/// One validated rule broken by a candidate record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
  #[error("identifier: {0}")]
  Id(#[from] IdError),

  #[error("{0} is required and must be non-empty")]
  MissingField(&'static str),

  #[error("{field} must be at least 10 characters after trimming (got {len})")]
  ShortDescription { field: &'static str, len: usize },

  #[error("{0} must be a non-empty list")]
  EmptyList(&'static str),

  #[error("{field} is not a list or JSON-encoded list: {detail}")]
  MalformedList { field: &'static str, detail: String },

  #[error("rarity {0:?} is not one of key, semi-key, scarce, common")]
  UnknownRarity(String),

  #[error("{field} must be a non-negative count (got {value})")]
  NegativeCount { field: &'static str, value: i64 },

  #[error("{field} must be a positive measurement (got {value})")]
  NonPositiveMeasure { field: &'static str, value: f64 },

  #[error("{field} {found:?} does not match the identifier's {field} segment {expected:?}")]
  SegmentMismatch {
    field:    &'static str,
    expected: String,
    found:    String,
  },
}

/// A record that failed validation, with every violation found.
#[derive(Debug, Clone)]
pub struct Rejection {
  /// The draft's raw identifier text (possibly itself malformed).
  pub id:         String,
  pub violations: Vec<Violation>,
}

impl Rejection {
  /// Human-readable messages, one per violation, in field order.
  pub fn messages(&self) -> Vec<String> {
    self.violations.iter().map(Violation::to_string).collect()
  }
}

impl fmt::Display for Rejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: ", if self.id.is_empty() { "<no id>" } else { &self.id })?;
    let msgs = self.messages();
    f.write_str(&msgs.join("; "))
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn require(field: &'static str, value: &str, out: &mut Vec<Violation>) -> bool {
  if value.trim().is_empty() {
    out.push(Violation::MissingField(field));
    false
  } else {
    true
  }
}

fn check_description(field: &'static str, value: &str, out: &mut Vec<Violation>) {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    out.push(Violation::MissingField(field));
  } else if trimmed.chars().count() < 10 {
    out.push(Violation::ShortDescription { field, len: trimmed.chars().count() });
  }
}

fn normalize_list<T: DeserializeOwned + Clone>(
  field: &'static str,
  raw: &RawList<T>,
  required: bool,
  out: &mut Vec<Violation>,
) -> Vec<T> {
  match raw.normalize() {
    Ok(items) => {
      if required && items.is_empty() {
        out.push(Violation::EmptyList(field));
      }
      items
    }
    Err(e) => {
      out.push(Violation::MalformedList { field, detail: e.to_string() });
      Vec::new()
    }
  }
}

fn check_count(field: &'static str, value: Option<i64>, out: &mut Vec<Violation>) -> Option<u64> {
  match value {
    Some(v) if v < 0 => {
      out.push(Violation::NegativeCount { field, value: v });
      None
    }
    Some(v) => Some(v as u64),
    None => None,
  }
}

fn check_measure(field: &'static str, value: Option<f64>, out: &mut Vec<Violation>) {
  if let Some(v) = value {
    if !(v > 0.0) {
      out.push(Violation::NonPositiveMeasure { field, value: v });
    }
  }
}

/// Validate a candidate record against the full rule set, collecting every
/// violation. On success the draft is converted into a canonical
/// [`IssueRecord`].
pub fn check(draft: &RecordDraft) -> Result<IssueRecord, Rejection> {
  let mut violations = Vec::new();

  let id = match IssueId::parse(&draft.id) {
    Ok(id) => Some(id),
    Err(e) => {
      violations.push(Violation::Id(e));
      None
    }
  };

  require("series_id", &draft.series_id, &mut violations);
  require("series_name", &draft.series_name, &mut violations);
  let has_country = require("country", &draft.country, &mut violations);
  require("denomination", &draft.denomination, &mut violations);
  let has_year = require("year", &draft.year, &mut violations);
  let has_mint = require("mint", &draft.mint, &mut violations);

  // The identifier must be re-derivable from the descriptive fields.
  if let Some(id) = &id {
    if has_country && draft.country != id.country() {
      violations.push(Violation::SegmentMismatch {
        field:    "country",
        expected: id.country().to_owned(),
        found:    draft.country.clone(),
      });
    }
    if has_year && draft.year != id.year().to_string() {
      violations.push(Violation::SegmentMismatch {
        field:    "year",
        expected: id.year().to_string(),
        found:    draft.year.clone(),
      });
    }
    if has_mint && draft.mint != id.mint() {
      violations.push(Violation::SegmentMismatch {
        field:    "mint",
        expected: id.mint().to_owned(),
        found:    draft.mint.clone(),
      });
    }
  }

  check_description("obverse_description", &draft.obverse_description, &mut violations);
  check_description("reverse_description", &draft.reverse_description, &mut violations);

  let distinguishing_features =
    normalize_list("distinguishing_features", &draft.distinguishing_features, true, &mut violations);
  let identification_keywords =
    normalize_list("identification_keywords", &draft.identification_keywords, true, &mut violations);
  let common_names = normalize_list("common_names", &draft.common_names, true, &mut violations);
  let varieties = normalize_list("varieties", &draft.varieties, false, &mut violations);

  let rarity = match &draft.rarity {
    Some(raw) => match Rarity::parse(raw) {
      Some(r) => Some(r),
      None => {
        violations.push(Violation::UnknownRarity(raw.clone()));
        None
      }
    },
    None => None,
  };

  let business_strikes = check_count("business_strikes", draft.business_strikes, &mut violations);
  let proof_strikes = check_count("proof_strikes", draft.proof_strikes, &mut violations);
  check_measure("weight_grams", draft.weight_grams, &mut violations);
  check_measure("diameter_mm", draft.diameter_mm, &mut violations);

  if !violations.is_empty() {
    return Err(Rejection { id: draft.id.clone(), violations });
  }

  let id = id.expect("no violations implies a parsed id");
  let year = id.year();
  Ok(IssueRecord {
    year,
    id,
    series_id: draft.series_id.clone(),
    series_name: draft.series_name.clone(),
    country: draft.country.clone(),
    denomination: draft.denomination.clone(),
    mint: draft.mint.clone(),
    business_strikes,
    proof_strikes,
    rarity,
    composition: draft.composition.clone(),
    weight_grams: draft.weight_grams,
    diameter_mm: draft.diameter_mm,
    varieties,
    obverse_description: draft.obverse_description.clone(),
    reverse_description: draft.reverse_description.clone(),
    distinguishing_features,
    identification_keywords,
    common_names,
    source_citation: draft.source_citation.clone(),
    notes: draft.notes.clone(),
  })
}

// ─── Batch validation ────────────────────────────────────────────────────────

/// Per-record outcome for a whole migration's worth of drafts.
#[derive(Debug, Default)]
pub struct BatchReport {
  pub valid:   Vec<IssueRecord>,
  pub invalid: Vec<Rejection>,
}

impl BatchReport {
  pub fn all_valid(&self) -> bool { self.invalid.is_empty() }
}

/// Validate every draft, preserving input order within each bucket. The
/// caller decides whether to abort the whole batch or skip the invalid
/// entries.
pub fn check_batch(drafts: &[RecordDraft]) -> BatchReport {
  let mut report = BatchReport::default();
  for draft in drafts {
    match check(draft) {
      Ok(record) => report.valid.push(record),
      Err(rejection) => report.invalid.push(rejection),
    }
  }
  report
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_draft() -> RecordDraft {
    RecordDraft {
      id: "US-TEST-2024-P".into(),
      series_id: "test-series".into(),
      series_name: "Test Series".into(),
      country: "US".into(),
      denomination: "Test".into(),
      year: "2024".into(),
      mint: "P".into(),
      business_strikes: Some(1_000_000),
      obverse_description: "Liberty head facing left, date below".into(),
      reverse_description: "Denomination within a wreath of oak leaves".into(),
      distinguishing_features: RawList::Native(vec!["plain edge".into()]),
      identification_keywords: RawList::Native(vec!["test".into(), "liberty".into()]),
      common_names: RawList::Native(vec!["Test Coin".into()]),
      ..RecordDraft::default()
    }
  }

  #[test]
  fn valid_draft_becomes_canonical_record() {
    let record = check(&valid_draft()).unwrap();
    assert_eq!(record.id.to_string(), "US-TEST-2024-P");
    assert_eq!(record.business_strikes, Some(1_000_000));
    assert_eq!(record.common_names, vec!["Test Coin".to_owned()]);
  }

  #[test]
  fn missing_reverse_description_names_the_field() {
    let mut draft = valid_draft();
    draft.reverse_description = String::new();
    let rejection = check(&draft).unwrap_err();
    assert_eq!(
      rejection.violations,
      vec![Violation::MissingField("reverse_description")]
    );
  }

  #[test]
  fn short_obverse_description_gets_a_length_error() {
    let mut draft = valid_draft();
    draft.obverse_description = "short".into();
    let rejection = check(&draft).unwrap_err();
    assert_eq!(
      rejection.violations,
      vec![Violation::ShortDescription { field: "obverse_description", len: 5 }]
    );

    // Exactly 10 characters passes the length rule.
    draft.obverse_description = "ten chars!".into();
    assert!(check(&draft).is_ok());
  }

  #[test]
  fn all_violations_are_collected_not_short_circuited() {
    let mut draft = valid_draft();
    draft.id = "us-test-2024-p".into();
    draft.obverse_description = "tiny".into();
    draft.common_names = RawList::Native(vec![]);
    draft.business_strikes = Some(-5);

    let rejection = check(&draft).unwrap_err();
    assert_eq!(rejection.violations.len(), 4, "got: {:?}", rejection.violations);
    assert_eq!(rejection.messages().len(), 4);
  }

  #[test]
  fn json_encoded_lists_are_accepted() {
    let mut draft = valid_draft();
    draft.common_names = RawList::Encoded(r#"["Test Coin","Testy"]"#.into());
    let record = check(&draft).unwrap();
    assert_eq!(record.common_names, vec!["Test Coin".to_owned(), "Testy".to_owned()]);
  }

  #[test]
  fn garbage_encoded_list_is_a_violation() {
    let mut draft = valid_draft();
    draft.identification_keywords = RawList::Encoded("not json".into());
    let rejection = check(&draft).unwrap_err();
    assert!(matches!(
      rejection.violations[0],
      Violation::MalformedList { field: "identification_keywords", .. }
    ));
  }

  #[test]
  fn empty_required_list_is_a_violation_but_varieties_may_be_empty() {
    let mut draft = valid_draft();
    draft.distinguishing_features = RawList::Encoded("[]".into());
    let rejection = check(&draft).unwrap_err();
    assert_eq!(
      rejection.violations,
      vec![Violation::EmptyList("distinguishing_features")]
    );

    let mut draft = valid_draft();
    draft.varieties = RawList::Encoded("[]".into());
    assert!(check(&draft).is_ok());
  }

  #[test]
  fn rarity_outside_the_closed_set_is_rejected() {
    let mut draft = valid_draft();
    draft.rarity = Some("legendary".into());
    let rejection = check(&draft).unwrap_err();
    assert_eq!(rejection.violations, vec![Violation::UnknownRarity("legendary".into())]);

    draft.rarity = Some("semi-key".into());
    let record = check(&draft).unwrap();
    assert_eq!(record.rarity, Some(Rarity::SemiKey));
  }

  #[test]
  fn non_positive_measurements_are_rejected() {
    let mut draft = valid_draft();
    draft.weight_grams = Some(0.0);
    draft.diameter_mm = Some(-19.0);
    let rejection = check(&draft).unwrap_err();
    assert_eq!(rejection.violations.len(), 2);
  }

  #[test]
  fn descriptive_fields_must_match_the_id_segments() {
    let mut draft = valid_draft();
    draft.mint = "D".into();
    let rejection = check(&draft).unwrap_err();
    assert_eq!(
      rejection.violations,
      vec![Violation::SegmentMismatch {
        field:    "mint",
        expected: "P".into(),
        found:    "D".into(),
      }]
    );
  }

  #[test]
  fn batch_report_buckets_by_identifier() {
    let good = valid_draft();
    let mut bad = valid_draft();
    bad.id = "US-CENT-99-P".into();
    bad.year = "99".into();

    let report = check_batch(&[good, bad]);
    assert!(!report.all_valid());
    assert_eq!(report.valid.len(), 1);
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].id, "US-CENT-99-P");
  }

  #[test]
  fn draft_deserializes_with_either_list_form() {
    let json = r#"{
      "id": "US-TEST-2024-P",
      "series_id": "test-series",
      "series_name": "Test Series",
      "country": "US",
      "denomination": "Test",
      "year": "2024",
      "mint": "P",
      "obverse_description": "Liberty head facing left, date below",
      "reverse_description": "Denomination within a wreath of oak leaves",
      "distinguishing_features": ["plain edge"],
      "identification_keywords": "[\"test\"]",
      "common_names": ["Test Coin"]
    }"#;
    let draft: RecordDraft = serde_json::from_str(json).unwrap();
    let record = check(&draft).unwrap();
    assert_eq!(record.identification_keywords, vec!["test".to_owned()]);
  }
}
