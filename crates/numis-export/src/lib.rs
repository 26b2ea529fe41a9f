//! Export transformer for the Numis issue catalog.
//!
//! Turns a flat set of issue records for one denomination into the nested
//! `{country, denomination, series[], coins[]}` document consumed by
//! external front-ends. The transformation is pure: the same input rows
//! produce byte-for-byte identical output regardless of input order,
//! except for the stamped generation timestamp at the document root.

pub mod document;
pub mod error;
mod transform;

pub use document::{
  CatalogDocument, CoinEntry, CompositionPeriod, SeriesEntry, Specifications, YearSpan,
};
pub use error::{Error, Result};
pub use transform::{ExportOptions, export_denomination, to_json_string};
