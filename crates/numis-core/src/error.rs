//! Error types for `numis-core`.

use thiserror::Error;

use crate::id::IdError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed identifier: {0}")]
  Id(#[from] IdError),

  #[error("unknown rarity: {0:?}")]
  UnknownRarity(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
