//! Seed data for the lookup tables: United States mint facilities and
//! the canonical type codes. `numis init` writes these with upserts, so
//! re-running init against an existing catalog is harmless.

use numis_core::record::{MintFacility, TypeCode};
use numis_store_sqlite::SqliteStore;

fn mint_facilities() -> Vec<MintFacility> {
  let facility = |code: &str, name: &str, from: u16, until: Option<u16>| MintFacility {
    code:         code.to_owned(),
    name:         name.to_owned(),
    active_from:  from,
    active_until: until,
  };
  vec![
    facility("P", "Philadelphia", 1792, None),
    facility("D", "Denver", 1906, None),
    facility("S", "San Francisco", 1854, None),
    facility("W", "West Point", 1984, None),
    facility("CC", "Carson City", 1870, Some(1893)),
    facility("O", "New Orleans", 1838, Some(1909)),
  ]
}

fn type_codes() -> Vec<TypeCode> {
  let tc = |code: &str, category: &str, face_value: f64| TypeCode {
    code: code.to_owned(),
    category: category.to_owned(),
    face_value,
  };
  vec![
    tc("CENT", "circulating", 0.01),
    tc("NIC", "circulating", 0.05),
    tc("DIME", "circulating", 0.10),
    tc("QTR", "circulating", 0.25),
    tc("HALF", "circulating", 0.50),
    tc("DOLR", "circulating", 1.00),
    tc("MORG", "circulating", 1.00),
    tc("SBA", "circulating", 1.00),
    tc("AGE1", "bullion", 50.00),
    tc("ASE1", "bullion", 1.00),
  ]
}

/// Upsert the full lookup set, returning (mint count, type-code count).
pub fn seed_lookup_tables(store: &SqliteStore) -> anyhow::Result<(usize, usize)> {
  let mints = mint_facilities();
  for facility in &mints {
    store.upsert_mint_facility(facility)?;
  }
  let types = type_codes();
  for tc in &types {
    store.upsert_type_code(tc)?;
  }
  Ok((mints.len(), types.len()))
}
