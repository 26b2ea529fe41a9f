//! SQLite backend for the Numis issue catalog.
//!
//! Single-connection, synchronous access: the catalog is maintained by
//! batch migration runs with one writer process at a time, so there is no
//! async runtime or connection pool here.

mod backup;
mod encode;
mod schema;
mod store;

pub mod apply;
pub mod error;

pub use apply::{ApplyReport, Migration, MigrationOp, WriteIntent, dry_run};
pub use error::{Error, Result};
pub use store::SqliteStore;
