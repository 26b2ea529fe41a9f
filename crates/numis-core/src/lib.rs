//! Core types and trait definitions for the Numis issue catalog.
//!
//! This crate is deliberately free of database and CLI dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod id;
pub mod record;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
