//! `numis` — batch tooling for the numismatic reference catalog.
//!
//! # Usage
//!
//! ```
//! numis init --db catalog.db
//! numis validate migrations/2024-01-wheat.json
//! numis apply migrations/2024-01-wheat.json --db catalog.db
//! numis export --db catalog.db --denomination Cent --out cents.json
//! ```

mod commands;
mod seed;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Numismatic reference catalog tooling")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the catalog schema and seed the lookup tables.
  Init {
    /// Path to the SQLite catalog file.
    #[arg(long)]
    db: PathBuf,
  },

  /// Validate a migration file and apply it to the catalog.
  Apply {
    /// Path to the migration JSON file.
    migration: PathBuf,

    /// Path to the SQLite catalog file.
    #[arg(long)]
    db: PathBuf,

    /// Snapshot directory (default: `backups` next to the catalog file).
    #[arg(long)]
    backup_dir: Option<PathBuf>,

    /// Validate and report intended changes without writing anything.
    #[arg(long)]
    dry_run: bool,
  },

  /// Validate a migration file without touching any catalog.
  Validate {
    /// Path to the migration JSON file.
    migration: PathBuf,
  },

  /// Export one denomination as a grouped JSON document.
  Export {
    /// Path to the SQLite catalog file.
    #[arg(long)]
    db: PathBuf,

    /// Denomination to export (e.g. "Cent").
    #[arg(long)]
    denomination: String,

    /// ISO country code for the document root (default: taken from the
    /// exported records).
    #[arg(long)]
    country: Option<String>,

    /// Face value for the document root (default: looked up from the
    /// type-code table).
    #[arg(long)]
    face_value: Option<f64>,

    /// Output file (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,
  },
}

fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  match cli.command {
    Command::Init { db } => commands::init(&db),
    Command::Apply { migration, db, backup_dir, dry_run } => {
      commands::apply(&migration, &db, backup_dir.as_deref(), dry_run)
    }
    Command::Validate { migration } => commands::validate(&migration),
    Command::Export { db, denomination, country, face_value, out } => {
      commands::export(&db, &denomination, country, face_value, out.as_deref())
    }
  }
}
