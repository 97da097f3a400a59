//! # Type Mapping Module
//!
//! Maps catalog data types to the scalar types used in generated entities.
//!
//! Every catalog type lives in a single table together with the way its
//! output type deals with `NULL`, so the output type and the nullability
//! handling can never drift apart.

use std::{collections::HashMap, sync::LazyLock};

use crate::database::Drivers;

/// Placeholder written in place of an output type when the catalog type is unknown.
pub const NOT_SUPPORTED: &str = "NotSupported";

/// How an output type expresses an absent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullHandling {
    /// Value type: needs the `?` marker when the column is nullable.
    ValueLike,
    /// Reference type: nullable on its own, needs `[Required]` when the column is not.
    ReferenceLike,
    /// Neither marker applies.
    Unsupported,
}

/// Output type information for one catalog type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// The generated scalar type (e.g., "int", "string", "DateTime").
    pub output: &'static str,
    /// Null handling of `output`.
    pub nulls: NullHandling,
}

use NullHandling::{ReferenceLike, Unsupported, ValueLike};

const TYPE_TABLE: &[(&str, &str, NullHandling)] = &[
    ("bigint", "long", ValueLike),
    ("binary", "byte[]", ReferenceLike),
    ("bit", "bool", ValueLike),
    ("char", "string", ReferenceLike),
    ("date", "DateTime", ValueLike),
    ("datetime", "DateTime", ValueLike),
    ("datetime2", "DateTime", ValueLike),
    ("datetimeoffset", "DateTimeOffset", ValueLike),
    ("decimal", "decimal", ValueLike),
    ("float", "decimal", ValueLike),
    ("hierarchyid", NOT_SUPPORTED, Unsupported),
    ("image", "byte[]", ReferenceLike),
    ("int", "int", ValueLike),
    ("money", "decimal", ValueLike),
    ("nchar", "string", ReferenceLike),
    ("ntext", "string", ReferenceLike),
    ("numeric", "decimal", ValueLike),
    ("nvarchar", "string", ReferenceLike),
    ("real", "float", ValueLike),
    ("smalldatetime", "DateTime", ValueLike),
    ("smallint", "short", ValueLike),
    ("smallmoney", "decimal", ValueLike),
    ("text", "string", ReferenceLike),
    ("time", "TimeSpan", ValueLike),
    ("tinyint", "byte", ValueLike),
    ("uniqueidentifier", "Guid", ValueLike),
    ("varbinary", "byte[]", ReferenceLike),
    ("varchar", "string", ReferenceLike),
    ("xml", "string", ReferenceLike),
];

static TYPE_MAP: LazyLock<HashMap<&'static str, TypeInfo>> = LazyLock::new(|| {
    TYPE_TABLE.iter().map(|&(catalog, output, nulls)| (catalog, TypeInfo { output, nulls })).collect()
});

/// Looks up the output type for a catalog type name.
///
/// Returns `None` for types the mapping does not know about.
pub fn type_info(data_type: &str) -> Option<TypeInfo> {
    TYPE_MAP.get(data_type).copied()
}

/// Wide-character string types.
pub fn is_unicode_type(data_type: &str) -> bool {
    matches!(data_type, "nchar" | "nvarchar")
}

/// Fixed-length character types (minimum length equals maximum length).
pub fn is_fixed_length_type(data_type: &str) -> bool {
    matches!(data_type, "char" | "nchar")
}

/// Sized string and binary types whose storage type is spelled out.
pub fn is_sized_type(data_type: &str) -> bool {
    matches!(data_type, "char" | "varchar" | "nchar" | "nvarchar" | "binary" | "varbinary")
}

/// Exact numeric types carrying precision and scale.
pub fn is_exact_numeric_type(data_type: &str) -> bool {
    matches!(data_type, "decimal" | "numeric")
}

/// Converts a driver's catalog spelling into the names used by the type table.
///
/// PostgreSQL reports long SQL-standard names (`character varying`) and
/// MySQL/SQLite use a handful of aliases; everything else is lowercased as-is.
pub fn canonical_type(driver: Drivers, data_type: &str) -> String {
    let lowered = data_type.trim().to_lowercase();

    let canonical = match (driver, lowered.as_str()) {
        (Drivers::Postgres, "character varying") => "varchar",
        (Drivers::Postgres, "character") => "char",
        (Drivers::Postgres, "bytea") => "varbinary",
        (Drivers::Postgres, "uuid") => "uniqueidentifier",
        (Drivers::Postgres, "timestamp without time zone") => "datetime2",
        (Drivers::Postgres, "timestamp with time zone") => "datetimeoffset",
        (Drivers::Postgres, "time without time zone") => "time",
        (Drivers::Postgres, "double precision") => "float",
        (Drivers::MySQL, "timestamp") => "datetime",
        (Drivers::MySQL, "double") => "float",
        (Drivers::MySQL, "blob" | "longblob" | "mediumblob" | "tinyblob") => "varbinary",
        (Drivers::MySQL, "longtext" | "mediumtext" | "tinytext") => "text",
        (Drivers::SQLite, "integer") => "bigint",
        (Drivers::SQLite, "blob") => "varbinary",
        (Drivers::SQLite, "timestamp") => "datetime",
        (Drivers::SQLite, "double") => "float",
        (_, "integer") => "int",
        (_, "boolean" | "bool") => "bit",
        (_, "int2") => "smallint",
        (_, "int4") => "int",
        (_, "int8") => "bigint",
        _ => return lowered,
    };

    canonical.to_string()
}

/// The driver's spelling of a type, when [`canonical_type`] renamed it.
pub fn native_storage_type(data_type: &str, canonical: &str) -> Option<String> {
    let lowered = data_type.trim().to_lowercase();
    (lowered != canonical).then_some(lowered)
}
