//! # Error Module
//!
//! Error type shared by every stage of the scaffolding pipeline.

use thiserror::Error;

/// Errors raised while reading the catalog or generating an entity.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, authentication or query failure reported by the driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The catalog returned no columns for the requested table.
    #[error("table '{table}' not found{}", in_schema(.schema))]
    TableNotFound { table: String, schema: Option<String> },

    /// The connection URL does not name a backend this tool can inspect.
    #[error("unsupported database url '{0}' (expected postgres://, mysql:// or sqlite:)")]
    UnsupportedDriver(String),
}

fn in_schema(schema: &Option<String>) -> String {
    match schema {
        Some(schema) => format!(" in schema '{schema}'"),
        None => String::new(),
    }
}
