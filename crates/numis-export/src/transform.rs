//! The denomination grouping transformation.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use numis_core::{
  id::IssueYear,
  record::{IssueRecord, Series},
};

use crate::{
  Result,
  document::{
    CatalogDocument, CoinEntry, CompositionPeriod, SeriesEntry, Specifications, YearSpan,
  },
};

/// Document-level attributes supplied by the caller.
#[derive(Debug, Clone)]
pub struct ExportOptions {
  pub country:      String,
  pub denomination: String,
  pub face_value:   Option<f64>,
}

/// Alloy label for series whose members carry no composition data.
const UNSPECIFIED_ALLOY: &str = "unspecified (historical)";

// ─── Transformation ──────────────────────────────────────────────────────────

/// Group a flat set of issue records into the nested export document.
///
/// Series ordering, coin ordering, and composition-period clustering are
/// all deterministic; input iteration order never affects the output. A
/// record whose `series_id` is missing from `registry` falls back to its
/// own `series_name` — the export never fails for that reason.
pub fn export_denomination(
  records: Vec<IssueRecord>,
  registry: &[Series],
  options: &ExportOptions,
) -> CatalogDocument {
  let by_series_id: HashMap<&str, &Series> =
    registry.iter().map(|s| (s.series_id.as_str(), s)).collect();

  // BTreeMap so the pre-sort grouping order is already stable.
  let mut groups: BTreeMap<String, Vec<IssueRecord>> = BTreeMap::new();
  for record in records {
    groups.entry(record.series_id.clone()).or_default().push(record);
  }

  let mut series: Vec<SeriesEntry> = groups
    .into_iter()
    .map(|(series_id, members)| build_series(series_id, members, &by_series_id))
    .collect();

  // Ascending start year; sentinel-only series (no span) last; series_id
  // as the tiebreaker.
  series.sort_by(|a, b| {
    let a_key = (a.years.start.unwrap_or(u16::MAX), &a.series_id);
    let b_key = (b.years.start.unwrap_or(u16::MAX), &b.series_id);
    a_key.cmp(&b_key)
  });

  CatalogDocument {
    country:      options.country.clone(),
    denomination: options.denomination.clone(),
    face_value:   options.face_value,
    generated_at: Utc::now(),
    series,
  }
}

/// Serialize a document as pretty-printed JSON.
pub fn to_json_string(document: &CatalogDocument) -> Result<String> {
  Ok(serde_json::to_string_pretty(document)?)
}

fn build_series(
  series_id: String,
  mut members: Vec<IssueRecord>,
  registry: &HashMap<&str, &Series>,
) -> SeriesEntry {
  // (year, mint, full id) — concrete years first, sentinel last.
  members.sort_by(|a, b| {
    (a.year, &a.mint, &a.id).cmp(&(b.year, &b.mint, &b.id))
  });

  let series_name = registry
    .get(series_id.as_str())
    .map(|s| s.series_name.clone())
    .unwrap_or_else(|| {
      members
        .first()
        .map(|r| r.series_name.clone())
        .unwrap_or_default()
    });

  let years = span_of(members.iter().map(|r| r.year));

  let specifications = Specifications {
    weight_grams: members.iter().find_map(|r| r.weight_grams),
    diameter_mm:  members.iter().find_map(|r| r.diameter_mm),
  };

  let composition_periods = composition_periods(&members, years, specifications.weight_grams);

  let coins = members.into_iter().map(coin_entry).collect();

  SeriesEntry {
    series_id,
    series_name,
    years,
    specifications,
    composition_periods,
    coins,
  }
}

/// Min/max over concrete years; sentinel members are excluded from the
/// span but still listed as coins.
fn span_of(years: impl Iterator<Item = IssueYear>) -> YearSpan {
  let mut span = YearSpan::default();
  for year in years {
    if let Some(y) = year.value() {
      span.start = Some(span.start.map_or(y, |s| s.min(y)));
      span.end = Some(span.end.map_or(y, |e| e.max(y)));
    }
  }
  span
}

/// Cluster members sharing an identical composition map and report each
/// cluster's year range. A series never has zero periods: with no
/// composition data anywhere, one unspecified period spans the series.
fn composition_periods(
  members: &[IssueRecord],
  series_span: YearSpan,
  fallback_weight: Option<f64>,
) -> Vec<CompositionPeriod> {
  // Keyed by the serialized map — BTreeMap serialization is canonical.
  let mut clusters: BTreeMap<String, Vec<&IssueRecord>> = BTreeMap::new();
  for record in members {
    if let Some(composition) = &record.composition {
      let key = serde_json::to_string(composition).unwrap_or_default();
      clusters.entry(key).or_default().push(record);
    }
  }

  if clusters.is_empty() {
    return vec![CompositionPeriod {
      years:        series_span,
      alloy:        UNSPECIFIED_ALLOY.to_owned(),
      composition:  None,
      weight_grams: fallback_weight,
    }];
  }

  let mut periods: Vec<CompositionPeriod> = clusters
    .into_values()
    .map(|cluster| {
      let composition = cluster[0].composition.clone().unwrap_or_default();
      CompositionPeriod {
        years:        span_of(cluster.iter().map(|r| r.year)),
        alloy:        alloy_name(&composition),
        composition:  Some(composition),
        weight_grams: cluster.iter().find_map(|r| r.weight_grams),
      }
    })
    .collect();

  periods.sort_by(|a, b| {
    (a.years.start.unwrap_or(u16::MAX), &a.alloy)
      .cmp(&(b.years.start.unwrap_or(u16::MAX), &b.alloy))
  });
  periods
}

/// Human label for an alloy: material names joined by descending fraction
/// (ties broken alphabetically), e.g. "copper-tin-zinc".
fn alloy_name(composition: &numis_core::record::Composition) -> String {
  let mut materials: Vec<(&String, &f64)> = composition.iter().collect();
  materials.sort_by(|a, b| {
    b.1
      .partial_cmp(a.1)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| a.0.cmp(b.0))
  });
  materials
    .into_iter()
    .map(|(name, _)| name.as_str())
    .collect::<Vec<_>>()
    .join("-")
}

fn coin_entry(record: IssueRecord) -> CoinEntry {
  CoinEntry {
    id:   record.id.to_string(),
    year: record.year.to_string(),
    mint: record.mint,
    business_strikes: record.business_strikes,
    proof_strikes: record.proof_strikes,
    rarity: record.rarity,
    weight_grams: record.weight_grams,
    diameter_mm: record.diameter_mm,
    varieties: record.varieties,
    obverse_description: record.obverse_description,
    reverse_description: record.reverse_description,
    distinguishing_features: record.distinguishing_features,
    identification_keywords: record.identification_keywords,
    common_names: record.common_names,
    source_citation: record.source_citation,
    notes: record.notes,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
