//! # Entity Scaffold
//!
//! Reads one table's catalog metadata and scaffolds an entity class for it,
//! annotated with keys, generated-value behavior, lengths, storage types,
//! renames and relationships.
//!
//! The pipeline is:
//!
//! 1. [`extract_table`] runs the [`Catalog`] queries and builds [`ColumnMetadata`].
//! 2. [`synthesize`] derives the [`Annotation`]s of each column.
//! 3. [`assemble`] renders the class text.
//!
//! # Example
//!
//! ```rust,ignore
//! let db = Database::connect("postgres://localhost/shop").await?;
//! let code = entity_scaffold::scaffold_entity(&db, "order_line", Some("public")).await?;
//! println!("{code}");
//! ```

pub mod annotation;
pub mod catalog;
pub mod database;
pub mod entity;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod types;

pub use annotation::{synthesize, Annotation, AnnotationKind, AnnotationParam};
pub use catalog::{extract_table, Catalog};
pub use database::{Database, DatabaseBuilder, Drivers};
pub use entity::assemble;
pub use error::Error;
pub use metadata::{build_columns, CatalogRows, ColumnMetadata, ColumnRow, ColumnSize, DependentTableRow, ForeignKeyRow};
pub use naming::normalize_name;
pub use types::{type_info, NullHandling, TypeInfo};

/// Extracts `table` from the catalog and renders its entity class.
pub async fn scaffold_entity<C>(catalog: &C, table: &str, schema: Option<&str>) -> Result<String, Error>
where
    C: Catalog + ?Sized,
{
    let columns = extract_table(catalog, table, schema).await?;
    Ok(assemble(table, schema, &columns))
}
