//! # Metadata Module
//!
//! Column metadata for one table, and the raw catalog rows it is built from.
//!
//! Catalog backends hand over plain row sets (see [`crate::Catalog`]);
//! [`build_columns`] joins them into one [`ColumnMetadata`] per column, ordered
//! by ordinal position.

// ============================================================================
// Column Metadata
// ============================================================================

/// Declared length of a string or binary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSize {
    /// A concrete maximum length.
    Bounded(u32),
    /// No upper bound (`MAX`).
    Unbounded,
}

impl ColumnSize {
    /// Interprets a raw `CHARACTER_MAXIMUM_LENGTH` value.
    ///
    /// `-1` is the catalog sentinel for `MAX`. Lengths too large for a 32-bit
    /// signed integer (e.g. MySQL `longtext`) are unbounded as well. Any other
    /// negative value is not a length at all.
    pub fn from_catalog(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(ColumnSize::Unbounded),
            n if n < 0 => None,
            n => match i32::try_from(n) {
                Ok(n) => Some(ColumnSize::Bounded(n as u32)),
                Err(_) => Some(ColumnSize::Unbounded),
            },
        }
    }
}

/// Everything known about one table column.
///
/// Built once per extraction and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMetadata {
    /// The column name exactly as spelled in the catalog.
    pub column_name: String,
    /// 1-based position; defines render order.
    pub ordinal_position: u32,
    /// Canonical catalog type name (e.g., "varchar").
    pub data_type: String,
    /// The backend's own type spelling when it differs from `data_type`
    /// (PostgreSQL `bytea` for `varbinary`). Used for the storage type marker.
    pub storage_type: Option<String>,
    pub is_nullable: bool,
    pub size: Option<ColumnSize>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub is_primary_key: bool,
    pub is_identity: bool,
    pub is_computed: bool,
    /// Table this column points at, when it is a foreign key.
    pub referenced_table: Option<String>,
    /// Tables whose foreign keys point back at this column. No duplicates.
    pub referencing_tables: Vec<String>,
}

impl ColumnMetadata {
    /// Creates a nullable, unconstrained column. Mostly useful in tests.
    pub fn new(column_name: impl Into<String>, ordinal_position: u32, data_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            ordinal_position,
            data_type: data_type.into(),
            is_nullable: true,
            ..Default::default()
        }
    }
}

// ============================================================================
// Raw Catalog Rows
// ============================================================================

/// One row of the columns query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub column_name: String,
    pub ordinal_position: i64,
    pub is_nullable: bool,
    pub data_type: String,
    pub storage_type: Option<String>,
    /// Raw length; `-1` means `MAX`.
    pub size: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
}

/// Outgoing foreign key: `column` of this table references `table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub column: String,
    pub table: String,
}

/// Incoming foreign key: `dependent_table` references `column` of this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentTableRow {
    pub dependent_table: String,
    pub column: String,
}

/// All row sets the catalog returns for one table.
#[derive(Debug, Clone, Default)]
pub struct CatalogRows {
    pub columns: Vec<ColumnRow>,
    pub primary_keys: Vec<String>,
    pub identities: Vec<String>,
    pub computed: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyRow>,
    pub dependent_tables: Vec<DependentTableRow>,
}

/// Joins the catalog row sets into per-column metadata, in ordinal order.
///
/// Rows whose ordinal position is not a positive 32-bit value are dropped;
/// numeric attributes that do not fit are treated as absent.
pub fn build_columns(rows: CatalogRows) -> Vec<ColumnMetadata> {
    let mut columns: Vec<ColumnMetadata> = rows
        .columns
        .into_iter()
        .filter_map(|row| {
            let Some(ordinal_position) = to_u32(Some(row.ordinal_position)).filter(|p| *p > 0) else {
                log::warn!("Skipping column '{}' with ordinal position {}", row.column_name, row.ordinal_position);
                return None;
            };

            let name = row.column_name;
            let referenced_table = rows.foreign_keys.iter().find(|fk| fk.column == name).map(|fk| fk.table.clone());

            let mut referencing_tables: Vec<String> = Vec::new();
            for dependent in rows.dependent_tables.iter().filter(|d| d.column == name) {
                if !referencing_tables.contains(&dependent.dependent_table) {
                    referencing_tables.push(dependent.dependent_table.clone());
                }
            }

            Some(ColumnMetadata {
                ordinal_position,
                data_type: row.data_type,
                storage_type: row.storage_type,
                is_nullable: row.is_nullable,
                size: row.size.and_then(ColumnSize::from_catalog),
                precision: to_u32(row.precision),
                scale: to_u32(row.scale),
                is_primary_key: rows.primary_keys.contains(&name),
                is_identity: rows.identities.contains(&name),
                is_computed: rows.computed.contains(&name),
                referenced_table,
                referencing_tables,
                column_name: name,
            })
        })
        .collect();

    columns.sort_by_key(|c| c.ordinal_position);
    columns
}

fn to_u32(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}
