//! # Catalog Module
//!
//! The read-only catalog queries the scaffolder needs, and the extraction
//! routine that runs them for one table.

use futures::future::BoxFuture;

use crate::{
    metadata::{CatalogRows, ColumnMetadata, ColumnRow, DependentTableRow, ForeignKeyRow, build_columns},
    Error,
};

// ============================================================================
// Catalog Trait
// ============================================================================

/// Read-only access to a database catalog.
///
/// Every query is parameterized by table name and an optional schema; `None`
/// matches the table in any schema. Implementations return fully materialized
/// row sets and own their connection lifecycle.
pub trait Catalog: Send + Sync {
    /// Columns with their types, ordered by ordinal position.
    fn columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<ColumnRow>, Error>>;

    /// Names of the primary-key columns.
    fn primary_key_columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<String>, Error>>;

    /// Names of identity (auto-increment) columns.
    fn identity_columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<String>, Error>>;

    /// Names of computed (generated) columns.
    fn computed_columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<String>, Error>>;

    /// Foreign keys of this table and the tables they reference.
    fn foreign_keys<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<ForeignKeyRow>, Error>>;

    /// Foreign keys of other tables that reference this table.
    fn dependent_tables<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<DependentTableRow>, Error>>;
}

// ============================================================================
// Extraction
// ============================================================================

/// Runs every catalog query for `table` and builds its column metadata.
///
/// Fails with [`Error::TableNotFound`] when the catalog has no columns for the
/// table, instead of producing an empty entity.
pub async fn extract_table<C>(catalog: &C, table: &str, schema: Option<&str>) -> Result<Vec<ColumnMetadata>, Error>
where
    C: Catalog + ?Sized,
{
    let columns = catalog.columns(table, schema).await?;
    if columns.is_empty() {
        return Err(Error::TableNotFound { table: table.to_string(), schema: schema.map(str::to_string) });
    }

    let rows = CatalogRows {
        columns,
        primary_keys: catalog.primary_key_columns(table, schema).await?,
        identities: catalog.identity_columns(table, schema).await?,
        computed: catalog.computed_columns(table, schema).await?,
        foreign_keys: catalog.foreign_keys(table, schema).await?,
        dependent_tables: catalog.dependent_tables(table, schema).await?,
    };

    log::debug!(
        "Catalog rows for '{}': {} columns, {} key, {} identity, {} computed, {} fk, {} dependent",
        table,
        rows.columns.len(),
        rows.primary_keys.len(),
        rows.identities.len(),
        rows.computed.len(),
        rows.foreign_keys.len(),
        rows.dependent_tables.len()
    );

    let metadata = build_columns(rows);
    log::info!("Extracted {} columns from '{}'", metadata.len(), table);
    Ok(metadata)
}
