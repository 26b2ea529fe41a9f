//! Issue identifiers — the `COUNTRY-TYPE-YEAR-MINT[-SUFFIX]` grammar.
//!
//! An identifier is the primary key of an issue and is immutable once
//! created. The grammar is case-sensitive and upper-case by construction:
//! lowercase input is a validation failure, never auto-corrected.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// The literal year segment meaning "any year" (generic bullion entries).
pub const ANY_YEAR: &str = "XXXX";

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A grammar violation, naming the offending segment and the rejected text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
  #[error("expected 4 or 5 dash-separated segments, found {0}")]
  SegmentCount(usize),

  #[error("country segment {0:?}: must be 2-4 uppercase ASCII letters")]
  Country(String),

  #[error("type segment {0:?}: must be 2-4 uppercase ASCII letters or digits")]
  TypeCode(String),

  #[error("year segment {0:?}: must be exactly 4 digits or the literal \"XXXX\"")]
  Year(String),

  #[error("mint segment {0:?}: must be 1-4 uppercase ASCII letters")]
  Mint(String),

  #[error("suffix segment {0:?}: must be 1-6 uppercase ASCII letters or digits")]
  Suffix(String),
}

// ─── Year ────────────────────────────────────────────────────────────────────

/// The year segment of an identifier: a concrete 4-digit year, or the
/// `XXXX` sentinel. Concrete years order before the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueYear {
  Of(u16),
  Any,
}

impl IssueYear {
  /// The concrete year, if this is not the sentinel.
  pub fn value(self) -> Option<u16> {
    match self {
      Self::Of(y) => Some(y),
      Self::Any => None,
    }
  }

  fn parse_segment(s: &str) -> Result<Self, IdError> {
    if s == ANY_YEAR {
      return Ok(Self::Any);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
      // Four ASCII digits always fit in u16.
      return Ok(Self::Of(s.parse().unwrap()));
    }
    Err(IdError::Year(s.to_owned()))
  }
}

impl fmt::Display for IssueYear {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Of(y) => write!(f, "{y:04}"),
      Self::Any => f.write_str(ANY_YEAR),
    }
  }
}

impl Serialize for IssueYear {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for IssueYear {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Self::parse_segment(&raw).map_err(de::Error::custom)
  }
}

// ─── Segment charsets ────────────────────────────────────────────────────────

fn is_upper_alpha(s: &str, min: usize, max: usize) -> bool {
  (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_upper_alnum(s: &str, min: usize, max: usize) -> bool {
  (min..=max).contains(&s.len())
    && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

// ─── IssueId ─────────────────────────────────────────────────────────────────

/// A parsed, known-valid issue identifier.
///
/// Fields are private so an `IssueId` can only be obtained through
/// [`IssueId::parse`] or [`IssueId::new`], both of which enforce the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId {
  country:   String,
  type_code: String,
  year:      IssueYear,
  mint:      String,
  suffix:    Option<String>,
}

impl IssueId {
  /// Build an identifier from pre-split segments, validating each.
  pub fn new(
    country: &str,
    type_code: &str,
    year: IssueYear,
    mint: &str,
    suffix: Option<&str>,
  ) -> Result<Self, IdError> {
    if !is_upper_alpha(country, 2, 4) {
      return Err(IdError::Country(country.to_owned()));
    }
    // Legacy records use 2-3 character type codes; the canonical width is 4,
    // but the shorter forms remain valid to keep grandfathered data readable.
    if !is_upper_alnum(type_code, 2, 4) {
      return Err(IdError::TypeCode(type_code.to_owned()));
    }
    if !is_upper_alpha(mint, 1, 4) {
      return Err(IdError::Mint(mint.to_owned()));
    }
    if let Some(sfx) = suffix {
      if !is_upper_alnum(sfx, 1, 6) {
        return Err(IdError::Suffix(sfx.to_owned()));
      }
    }

    Ok(Self {
      country:   country.to_owned(),
      type_code: type_code.to_owned(),
      year,
      mint:      mint.to_owned(),
      suffix:    suffix.map(str::to_owned),
    })
  }

  /// Parse a `COUNTRY-TYPE-YEAR-MINT[-SUFFIX]` string.
  pub fn parse(s: &str) -> Result<Self, IdError> {
    let segments: Vec<&str> = s.split('-').collect();
    if segments.len() != 4 && segments.len() != 5 {
      return Err(IdError::SegmentCount(segments.len()));
    }

    let year = IssueYear::parse_segment(segments[2])?;
    Self::new(segments[0], segments[1], year, segments[3], segments.get(4).copied())
  }

  /// Derive a variety identifier from this one by appending `suffix`.
  /// Fails if this identifier already carries a suffix.
  pub fn with_suffix(&self, suffix: &str) -> Result<Self, IdError> {
    if self.suffix.is_some() {
      return Err(IdError::Suffix(suffix.to_owned()));
    }
    Self::new(&self.country, &self.type_code, self.year, &self.mint, Some(suffix))
  }

  /// True when `other` names the same country/type/year/mint, ignoring any
  /// suffix. Split replacements must extend their parent this way.
  pub fn extends(&self, parent: &Self) -> bool {
    self.country == parent.country
      && self.type_code == parent.type_code
      && self.year == parent.year
      && self.mint == parent.mint
  }

  pub fn country(&self) -> &str { &self.country }

  pub fn type_code(&self) -> &str { &self.type_code }

  pub fn year(&self) -> IssueYear { self.year }

  pub fn mint(&self) -> &str { &self.mint }

  pub fn suffix(&self) -> Option<&str> { self.suffix.as_deref() }
}

impl fmt::Display for IssueId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}-{}-{}", self.country, self.type_code, self.year, self.mint)?;
    if let Some(sfx) = &self.suffix {
      write!(f, "-{sfx}")?;
    }
    Ok(())
  }
}

impl std::str::FromStr for IssueId {
  type Err = IdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl Serialize for IssueId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for IssueId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Self::parse(&raw).map_err(de::Error::custom)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_format_round_trips() {
    for s in [
      "US-CENT-1999-P",
      "US-CENT-1909-S-VDB",
      "US-MORG-1878-CC",
      "CA-DOLR-XXXX-W",
      "XCD-T1-2002-ECCB",
      "US-AGE1-XXXX-W-T2",
    ] {
      let id = IssueId::parse(s).unwrap();
      assert_eq!(id.to_string(), s, "round trip failed for {s}");
    }
  }

  #[test]
  fn parsed_segments_are_exposed() {
    let id = IssueId::parse("US-CENT-1909-S-VDB").unwrap();
    assert_eq!(id.country(), "US");
    assert_eq!(id.type_code(), "CENT");
    assert_eq!(id.year(), IssueYear::Of(1909));
    assert_eq!(id.mint(), "S");
    assert_eq!(id.suffix(), Some("VDB"));
  }

  #[test]
  fn lowercase_is_rejected_not_folded() {
    let err = IssueId::parse("us-cent-1999-p").unwrap_err();
    assert_eq!(err, IdError::Country("us".into()));
  }

  #[test]
  fn two_digit_year_is_rejected() {
    let err = IssueId::parse("US-CENT-99-P").unwrap_err();
    assert_eq!(err, IdError::Year("99".into()));
  }

  #[test]
  fn one_char_type_code_is_rejected() {
    let err = IssueId::parse("US-C-1999-P").unwrap_err();
    assert_eq!(err, IdError::TypeCode("C".into()));
  }

  #[test]
  fn legacy_short_type_codes_are_accepted() {
    assert!(IssueId::parse("US-SBA-1979-P").is_ok());
    assert!(IssueId::parse("US-T1-1916-D").is_ok());
  }

  #[test]
  fn seven_char_suffix_is_rejected() {
    let err = IssueId::parse("US-CENT-1999-P-TOOLONGX").unwrap_err();
    assert_eq!(err, IdError::Suffix("TOOLONGX".into()));
  }

  #[test]
  fn segment_count_is_enforced() {
    assert_eq!(
      IssueId::parse("US-CENT-1999").unwrap_err(),
      IdError::SegmentCount(3)
    );
    assert_eq!(
      IssueId::parse("US-CENT-1999-P-A-B").unwrap_err(),
      IdError::SegmentCount(6)
    );
  }

  #[test]
  fn sentinel_year_parses_and_is_excluded_from_value() {
    let id = IssueId::parse("US-AGE1-XXXX-W").unwrap();
    assert_eq!(id.year(), IssueYear::Any);
    assert_eq!(id.year().value(), None);
  }

  #[test]
  fn negative_year_is_rejected() {
    // '-100' splits into an extra empty segment; either way, not a year.
    assert!(IssueId::parse("US-CENT--100-P").is_err());
  }

  #[test]
  fn with_suffix_derives_a_variety_id() {
    let parent = IssueId::parse("US-CENT-1909-S").unwrap();
    let vdb = parent.with_suffix("VDB").unwrap();
    assert_eq!(vdb.to_string(), "US-CENT-1909-S-VDB");
    assert!(vdb.extends(&parent));

    // A suffixed id cannot be suffixed again.
    assert!(vdb.with_suffix("DDO").is_err());
  }

  #[test]
  fn concrete_years_order_before_sentinel() {
    assert!(IssueYear::Of(1999) < IssueYear::Of(2000));
    assert!(IssueYear::Of(9999) < IssueYear::Any);
  }

  #[test]
  fn serde_round_trips_as_string() {
    let id = IssueId::parse("US-MORG-1878-CC").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"US-MORG-1878-CC\"");
    let back: IssueId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
  }
}
