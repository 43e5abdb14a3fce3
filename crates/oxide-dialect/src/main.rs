//! oxide-dialect CLI
//!
//! Command-line tool for inspecting what a dialect produces.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use oxide_dialect::prelude::*;

/// Inspect backend-specific SQL dialects.
#[derive(Parser)]
#[command(name = "oxide-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dialect to use.
    #[arg(short = 'D', long, env = "OXIDE_DIALECT", default_value = "common")]
    dialect: String,

    /// Database URL (`mysql://...` or `sqlite:...`), needed by commands that
    /// query the catalog.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered dialects.
    Dialects,

    /// Print the column type for a JSON-encoded field descriptor.
    ColumnType {
        /// Field descriptor, e.g. '{"name": "id", "kind": "int64", "primary_key": true}'.
        field: String,
    },

    /// Print the pagination fragment.
    Paginate {
        /// Row limit (any integer literal).
        #[arg(short, long)]
        limit: Option<String>,

        /// Row offset (any integer literal).
        #[arg(short, long)]
        offset: Option<String>,
    },

    /// Print a derived key name.
    KeyName {
        /// Kind tag, e.g. "idx" or "fk".
        kind: String,

        /// Table name.
        table: String,

        /// Field names.
        fields: Vec<String>,
    },

    /// Check the catalog for a table and, optionally, a column, index or foreign key.
    Probe {
        /// Table name.
        table: String,

        /// Column name.
        #[arg(short, long)]
        column: Option<String>,

        /// Index name.
        #[arg(short, long)]
        index: Option<String>,

        /// Foreign key name.
        #[arg(short, long)]
        foreign_key: Option<String>,
    },
}

/// Decodes a JSON field descriptor and infers its column type.
fn column_type(dialect: &dyn Dialect, json: &str) -> anyhow::Result<String> {
    let field: FieldDescriptor = serde_json::from_str(json).context("Invalid field descriptor")?;
    debug!(dialect = dialect.name(), field = ?field, "Inferring column type");
    Ok(dialect.column_type(&field))
}

/// Renders the pagination fragment without its leading space.
fn paginate(dialect: &dyn Dialect, limit: Option<String>, offset: Option<String>) -> String {
    dialect
        .limit_offset_sql(limit.into(), offset.into())
        .trim_start()
        .to_string()
}

fn key_name(dialect: &dyn Dialect, kind: &str, table: &str, fields: &[String]) -> KeyName {
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    dialect.build_key_name(kind, table, &fields)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = DialectRegistry::global();

    match cli.command {
        Commands::Dialects => {
            for name in registry.names() {
                println!("{}", name);
            }
        }

        Commands::ColumnType { field } => {
            let dialect = registry.lookup(&cli.dialect)?;
            println!("{}", column_type(dialect.as_ref(), &field)?);
        }

        Commands::Paginate { limit, offset } => {
            let dialect = registry.lookup(&cli.dialect)?;
            println!("{}", paginate(dialect.as_ref(), limit, offset));
        }

        Commands::KeyName {
            kind,
            table,
            fields,
        } => {
            let dialect = registry.lookup(&cli.dialect)?;
            println!("{}", key_name(dialect.as_ref(), &kind, &table, &fields));
        }

        Commands::Probe {
            table,
            column,
            index,
            foreign_key,
        } => {
            let url = cli
                .database
                .context("--database (or DATABASE_URL) is required for probe")?;
            let pool = BlockingPool::connect(&url)
                .with_context(|| format!("Failed to connect to {}", url))?;
            let dialect = registry.open(&cli.dialect, Arc::new(pool))?;
            info!(dialect = dialect.name(), "Probing catalog");

            // Probe errors are surfaced here rather than read as "missing".
            println!("table {}: {}", table, dialect.probe_table(&table)?);
            if let Some(column) = column {
                println!(
                    "column {}.{}: {}",
                    table,
                    column,
                    dialect.probe_column(&table, &column)?
                );
            }
            if let Some(index) = index {
                println!("index {}: {}", index, dialect.probe_index(&table, &index)?);
            }
            if let Some(foreign_key) = foreign_key {
                println!(
                    "foreign key {}: {}",
                    foreign_key,
                    dialect.probe_foreign_key(&table, &foreign_key)?
                );
            }
        }
    }

    Ok(())
}
