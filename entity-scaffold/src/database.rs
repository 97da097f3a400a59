//! # Database Module
//!
//! Connection handling and the catalog queries for each supported backend.
//! PostgreSQL and MySQL are read through `information_schema`; SQLite through
//! its `PRAGMA` functions. Every backend goes through sqlx's `Any` driver.

// ============================================================================
// External Crate Imports
// ============================================================================

use futures::future::BoxFuture;
use sqlx::{any::AnyRow, AnyPool, Row};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    catalog::Catalog,
    metadata::{ColumnRow, DependentTableRow, ForeignKeyRow},
    types::{canonical_type, native_storage_type},
    Error,
};

// ============================================================================
// Database Driver Enum
// ============================================================================

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drivers {
    /// PostgreSQL driver
    Postgres,
    /// MySQL driver
    MySQL,
    /// SQLite driver
    SQLite,
}

impl Drivers {
    /// Detects the driver from a connection URL.
    pub fn from_url(url: &str) -> Result<Self, Error> {
        if url.starts_with("postgres") {
            Ok(Drivers::Postgres)
        } else if url.starts_with("mysql") {
            Ok(Drivers::MySQL)
        } else if url.starts_with("sqlite") {
            Ok(Drivers::SQLite)
        } else {
            Err(Error::UnsupportedDriver(url.to_string()))
        }
    }

    /// Schema used when none is given. `None` matches any schema.
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Drivers::Postgres => Some("public"),
            Drivers::MySQL | Drivers::SQLite => None,
        }
    }
}

// ============================================================================
// Catalog Queries
// ============================================================================

const PG_COLUMNS: &str = "SELECT c.column_name::TEXT, c.ordinal_position::BIGINT, c.is_nullable::TEXT, c.data_type::TEXT, \
     c.character_maximum_length::BIGINT, c.numeric_precision::BIGINT, c.numeric_scale::BIGINT \
     FROM information_schema.columns c \
     WHERE c.table_name = $1 AND ($2::TEXT IS NULL OR c.table_schema = $2) \
     ORDER BY c.ordinal_position";

const PG_PRIMARY_KEYS: &str = "SELECT ku.column_name::TEXT \
     FROM information_schema.table_constraints tc \
     INNER JOIN information_schema.key_column_usage ku \
         ON tc.constraint_type = 'PRIMARY KEY' \
         AND tc.constraint_name = ku.constraint_name \
         AND tc.constraint_schema = ku.constraint_schema \
         AND tc.table_name = ku.table_name \
     WHERE ku.table_name = $1 AND ($2::TEXT IS NULL OR ku.table_schema = $2) \
     ORDER BY ku.ordinal_position";

const PG_IDENTITIES: &str = "SELECT c.column_name::TEXT FROM information_schema.columns c \
     WHERE c.table_name = $1 AND ($2::TEXT IS NULL OR c.table_schema = $2) \
     AND (c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%')";

const PG_COMPUTED: &str = "SELECT c.column_name::TEXT FROM information_schema.columns c \
     WHERE c.table_name = $1 AND ($2::TEXT IS NULL OR c.table_schema = $2) \
     AND c.is_generated = 'ALWAYS'";

// Constraint names are only unique per table; relationships are matched by
// relation oid in pg_constraint.
const PG_FOREIGN_KEYS: &str = "SELECT a.attname::TEXT, r.relname::TEXT \
     FROM pg_constraint con \
     INNER JOIN pg_class t ON t.oid = con.conrelid \
     INNER JOIN pg_namespace n ON n.oid = t.relnamespace \
     INNER JOIN pg_class r ON r.oid = con.confrelid \
     CROSS JOIN LATERAL unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord) \
     INNER JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum \
     WHERE con.contype = 'f' AND t.relname = $1 \
     AND ($2::TEXT IS NULL OR n.nspname = $2) \
     ORDER BY con.conname, k.ord";

const PG_DEPENDENT_TABLES: &str = "SELECT d.relname::TEXT, a.attname::TEXT \
     FROM pg_constraint con \
     INNER JOIN pg_class t ON t.oid = con.confrelid \
     INNER JOIN pg_namespace n ON n.oid = t.relnamespace \
     INNER JOIN pg_class d ON d.oid = con.conrelid \
     CROSS JOIN LATERAL unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord) \
     INNER JOIN pg_attribute a ON a.attrelid = con.confrelid AND a.attnum = k.attnum \
     WHERE con.contype = 'f' AND t.relname = $1 \
     AND ($2::TEXT IS NULL OR n.nspname = $2) \
     ORDER BY d.relname, con.conname, k.ord";

const MYSQL_COLUMNS: &str = "SELECT CAST(c.COLUMN_NAME AS CHAR), CAST(c.ORDINAL_POSITION AS SIGNED), \
     CAST(c.IS_NULLABLE AS CHAR), CAST(c.DATA_TYPE AS CHAR), CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED), \
     CAST(c.NUMERIC_PRECISION AS SIGNED), CAST(c.NUMERIC_SCALE AS SIGNED) \
     FROM information_schema.COLUMNS c \
     WHERE c.TABLE_NAME = ? AND (? IS NULL OR c.TABLE_SCHEMA = ?) \
     ORDER BY c.ORDINAL_POSITION";

const MYSQL_PRIMARY_KEYS: &str = "SELECT CAST(k.COLUMN_NAME AS CHAR) FROM information_schema.KEY_COLUMN_USAGE k \
     WHERE k.CONSTRAINT_NAME = 'PRIMARY' AND k.TABLE_NAME = ? AND (? IS NULL OR k.TABLE_SCHEMA = ?) \
     ORDER BY k.ORDINAL_POSITION";

const MYSQL_IDENTITIES: &str = "SELECT CAST(c.COLUMN_NAME AS CHAR) FROM information_schema.COLUMNS c \
     WHERE c.TABLE_NAME = ? AND (? IS NULL OR c.TABLE_SCHEMA = ?) \
     AND c.EXTRA LIKE '%auto_increment%'";

const MYSQL_COMPUTED: &str = "SELECT CAST(c.COLUMN_NAME AS CHAR) FROM information_schema.COLUMNS c \
     WHERE c.TABLE_NAME = ? AND (? IS NULL OR c.TABLE_SCHEMA = ?) \
     AND c.GENERATION_EXPRESSION IS NOT NULL AND c.GENERATION_EXPRESSION <> ''";

const MYSQL_FOREIGN_KEYS: &str = "SELECT CAST(k.COLUMN_NAME AS CHAR), CAST(k.REFERENCED_TABLE_NAME AS CHAR) \
     FROM information_schema.KEY_COLUMN_USAGE k \
     WHERE k.REFERENCED_TABLE_NAME IS NOT NULL AND k.TABLE_NAME = ? AND (? IS NULL OR k.TABLE_SCHEMA = ?) \
     ORDER BY k.ORDINAL_POSITION";

const MYSQL_DEPENDENT_TABLES: &str = "SELECT CAST(k.TABLE_NAME AS CHAR), CAST(k.REFERENCED_COLUMN_NAME AS CHAR) \
     FROM information_schema.KEY_COLUMN_USAGE k \
     WHERE k.REFERENCED_TABLE_NAME = ? AND (? IS NULL OR k.REFERENCED_TABLE_SCHEMA = ?) \
     ORDER BY k.TABLE_NAME";

// ============================================================================
// Database Struct
// ============================================================================

/// A connection pool to the database whose catalog is inspected.
#[derive(Debug, Clone)]
pub struct Database {
    /// The underlying SQLx connection pool
    pub(crate) pool: AnyPool,
    /// The detected database driver
    pub(crate) driver: Drivers,
}

impl Database {
    /// Creates a new DatabaseBuilder for configuring the connection.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Connects to a database using the provided connection string.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        DatabaseBuilder::new().connect(url).await
    }

    /// Returns the detected driver.
    pub fn driver(&self) -> Drivers {
        self.driver
    }

    /// Returns the underlying pool, for running statements outside the catalog queries.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Runs a catalog query bound to `table` and `schema`.
    ///
    /// MySQL placeholders are positional, so the schema is bound twice there.
    async fn fetch_catalog(&self, sql: &str, table: &str, schema: Option<&str>) -> Result<Vec<AnyRow>, Error> {
        log::debug!("Catalog query for '{}' ({:?}): {}", table, self.driver, sql);

        let schema = schema.map(str::to_string);
        let mut query = sqlx::query(sql).bind(table.to_string()).bind(schema.clone());
        if matches!(self.driver, Drivers::MySQL) {
            query = query.bind(schema);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn fetch_names(&self, sql: &str, table: &str, schema: Option<&str>) -> Result<Vec<String>, Error> {
        let rows = self.fetch_catalog(sql, table, schema).await?;
        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push(row.try_get::<String, _>(0)?);
        }
        Ok(names)
    }

    async fn fetch_pairs(&self, sql: &str, table: &str, schema: Option<&str>) -> Result<Vec<(String, String)>, Error> {
        let rows = self.fetch_catalog(sql, table, schema).await?;
        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            pairs.push((row.try_get::<String, _>(0)?, row.try_get::<String, _>(1)?));
        }
        Ok(pairs)
    }

    async fn information_schema_columns(&self, table: &str, schema: Option<&str>) -> Result<Vec<ColumnRow>, Error> {
        let sql = match self.driver {
            Drivers::Postgres => PG_COLUMNS,
            _ => MYSQL_COLUMNS,
        };

        let rows = self.fetch_catalog(sql, table, schema).await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let is_nullable: String = row.try_get(2)?;
            let raw_type: String = row.try_get(3)?;
            let data_type = canonical_type(self.driver, &raw_type);
            columns.push(ColumnRow {
                column_name: row.try_get(0)?,
                ordinal_position: row.try_get(1)?,
                is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
                storage_type: native_storage_type(&raw_type, &data_type),
                data_type,
                size: optional_int(&row, 4),
                precision: optional_int(&row, 5),
                scale: optional_int(&row, 6),
            });
        }
        Ok(columns)
    }

    // ========================================================================
    // SQLite
    // ========================================================================

    async fn sqlite_table_info(&self, table: &str, schema: Option<&str>) -> Result<Vec<SqliteColumn>, Error> {
        let sql = format!("PRAGMA {}table_xinfo({})", schema_prefix(schema), quote_ident(table));
        log::debug!("Catalog query for '{}' (SQLite): {}", table, sql);

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push(SqliteColumn {
                name: row.try_get("name")?,
                declared_type: row.try_get::<Option<String>, _>("type")?.unwrap_or_default(),
                not_null: row.try_get::<i64, _>("notnull")? != 0,
                pk: row.try_get("pk")?,
                hidden: row.try_get("hidden")?,
            });
        }
        Ok(columns)
    }

    async fn sqlite_foreign_key_list(&self, table: &str, schema: Option<&str>) -> Result<Vec<SqliteForeignKey>, Error> {
        let sql = format!("PRAGMA {}foreign_key_list({})", schema_prefix(schema), quote_ident(table));
        log::debug!("Catalog query for '{}' (SQLite): {}", table, sql);

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            keys.push(SqliteForeignKey {
                table: row.try_get("table")?,
                from: row.try_get("from")?,
                to: row.try_get("to")?,
            });
        }
        Ok(keys)
    }

    async fn sqlite_columns(&self, table: &str, schema: Option<&str>) -> Result<Vec<ColumnRow>, Error> {
        let info = self.sqlite_table_info(table, schema).await?;

        Ok(info
            .into_iter()
            .enumerate()
            .map(|(i, column)| {
                let declared = parse_declared_type(&column.declared_type);
                if declared.name.is_empty() {
                    log::warn!("Column '{}' of '{}' has no declared type", column.name, table);
                }
                let data_type = canonical_type(Drivers::SQLite, &declared.name);
                ColumnRow {
                    // table_xinfo numbers hidden columns too; the row order is the column order.
                    ordinal_position: i as i64 + 1,
                    is_nullable: !column.not_null && column.pk == 0,
                    storage_type: native_storage_type(&declared.name, &data_type),
                    data_type,
                    size: declared.size,
                    precision: declared.precision,
                    scale: declared.scale,
                    column_name: column.name,
                }
            })
            .collect())
    }

    async fn sqlite_primary_keys(&self, table: &str, schema: Option<&str>) -> Result<Vec<String>, Error> {
        let mut keys: Vec<SqliteColumn> =
            self.sqlite_table_info(table, schema).await?.into_iter().filter(|c| c.pk > 0).collect();
        keys.sort_by_key(|c| c.pk);
        Ok(keys.into_iter().map(|c| c.name).collect())
    }

    /// A lone `INTEGER PRIMARY KEY` aliases the rowid and is generated by SQLite.
    async fn sqlite_identities(&self, table: &str, schema: Option<&str>) -> Result<Vec<String>, Error> {
        let keys: Vec<SqliteColumn> =
            self.sqlite_table_info(table, schema).await?.into_iter().filter(|c| c.pk > 0).collect();

        match keys.as_slice() {
            [key] if key.declared_type.trim().eq_ignore_ascii_case("INTEGER") => Ok(vec![key.name.clone()]),
            _ => Ok(Vec::new()),
        }
    }

    /// `hidden` is 2 for virtual and 3 for stored generated columns.
    async fn sqlite_computed(&self, table: &str, schema: Option<&str>) -> Result<Vec<String>, Error> {
        Ok(self
            .sqlite_table_info(table, schema)
            .await?
            .into_iter()
            .filter(|c| matches!(c.hidden, 2 | 3))
            .map(|c| c.name)
            .collect())
    }

    async fn sqlite_foreign_keys(&self, table: &str, schema: Option<&str>) -> Result<Vec<ForeignKeyRow>, Error> {
        Ok(self
            .sqlite_foreign_key_list(table, schema)
            .await?
            .into_iter()
            .map(|fk| ForeignKeyRow { column: fk.from, table: fk.table })
            .collect())
    }

    /// SQLite has no reverse lookup, so every table's foreign-key list is scanned.
    async fn sqlite_dependent_tables(&self, table: &str, schema: Option<&str>) -> Result<Vec<DependentTableRow>, Error> {
        let sql = format!(
            "SELECT name FROM {}sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            schema_prefix(schema)
        );
        let tables: Vec<String> = sqlx::query_scalar::<_, String>(&sql).fetch_all(&self.pool).await?;

        let mut dependents = Vec::new();
        let mut first_key: Option<Option<String>> = None;

        for dependent in tables {
            for fk in self.sqlite_foreign_key_list(&dependent, schema).await? {
                if !fk.table.eq_ignore_ascii_case(table) {
                    continue;
                }

                let column = match fk.to {
                    Some(to) => Some(to),
                    None => {
                        if first_key.is_none() {
                            first_key = Some(self.sqlite_primary_keys(table, schema).await?.into_iter().next());
                        }
                        first_key.clone().flatten()
                    }
                };

                match column {
                    Some(column) => dependents.push(DependentTableRow { dependent_table: dependent.clone(), column }),
                    None => log::warn!("Foreign key from '{}' to '{}' has no resolvable column", dependent, table),
                }
            }
        }

        Ok(dependents)
    }
}

// ============================================================================
// Catalog Implementation
// ============================================================================

impl Catalog for Database {
    fn columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<ColumnRow>, Error>> {
        Box::pin(async move {
            match self.driver {
                Drivers::SQLite => self.sqlite_columns(table, schema).await,
                _ => self.information_schema_columns(table, schema).await,
            }
        })
    }

    fn primary_key_columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<String>, Error>> {
        Box::pin(async move {
            match self.driver {
                Drivers::Postgres => self.fetch_names(PG_PRIMARY_KEYS, table, schema).await,
                Drivers::MySQL => self.fetch_names(MYSQL_PRIMARY_KEYS, table, schema).await,
                Drivers::SQLite => self.sqlite_primary_keys(table, schema).await,
            }
        })
    }

    fn identity_columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<String>, Error>> {
        Box::pin(async move {
            match self.driver {
                Drivers::Postgres => self.fetch_names(PG_IDENTITIES, table, schema).await,
                Drivers::MySQL => self.fetch_names(MYSQL_IDENTITIES, table, schema).await,
                Drivers::SQLite => self.sqlite_identities(table, schema).await,
            }
        })
    }

    fn computed_columns<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<String>, Error>> {
        Box::pin(async move {
            match self.driver {
                Drivers::Postgres => self.fetch_names(PG_COMPUTED, table, schema).await,
                Drivers::MySQL => self.fetch_names(MYSQL_COMPUTED, table, schema).await,
                Drivers::SQLite => self.sqlite_computed(table, schema).await,
            }
        })
    }

    fn foreign_keys<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<ForeignKeyRow>, Error>> {
        Box::pin(async move {
            let sql = match self.driver {
                Drivers::Postgres => PG_FOREIGN_KEYS,
                Drivers::MySQL => MYSQL_FOREIGN_KEYS,
                Drivers::SQLite => return self.sqlite_foreign_keys(table, schema).await,
            };

            let pairs = self.fetch_pairs(sql, table, schema).await?;
            Ok(pairs.into_iter().map(|(column, table)| ForeignKeyRow { column, table }).collect())
        })
    }

    fn dependent_tables<'a>(&'a self, table: &'a str, schema: Option<&'a str>) -> BoxFuture<'a, Result<Vec<DependentTableRow>, Error>> {
        Box::pin(async move {
            let sql = match self.driver {
                Drivers::Postgres => PG_DEPENDENT_TABLES,
                Drivers::MySQL => MYSQL_DEPENDENT_TABLES,
                Drivers::SQLite => return self.sqlite_dependent_tables(table, schema).await,
            };

            let pairs = self.fetch_pairs(sql, table, schema).await?;
            Ok(pairs.into_iter().map(|(dependent_table, column)| DependentTableRow { dependent_table, column }).collect())
        })
    }
}

// ============================================================================
// DatabaseBuilder Struct
// ============================================================================

/// Configures and opens a [`Database`].
pub struct DatabaseBuilder {
    max_connections: u32,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self { max_connections: 1 }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub async fn connect(self, url: &str) -> Result<Database, Error> {
        let driver = Drivers::from_url(url)?;
        sqlx::any::install_default_drivers();

        let pool = sqlx::any::AnyPoolOptions::new().max_connections(self.max_connections).connect(url).await?;
        log::debug!("Connected to {:?} catalog", driver);
        Ok(Database { pool, driver })
    }
}

// ============================================================================
// SQLite Helpers
// ============================================================================

struct SqliteColumn {
    name: String,
    declared_type: String,
    not_null: bool,
    pk: i64,
    hidden: i64,
}

struct SqliteForeignKey {
    table: String,
    from: String,
    to: Option<String>,
}

/// A declared column type split into its name and arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DeclaredType {
    pub name: String,
    pub size: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
}

/// Parses declarations like `NVARCHAR(50)`, `NVARCHAR(-1)` or `DECIMAL(10, 2)`.
///
/// SQLite only accepts signed numbers as type arguments, so an unbounded
/// length is declared with the `-1` sentinel. Other arguments are dropped.
pub(crate) fn parse_declared_type(declared: &str) -> DeclaredType {
    let declared = declared.trim();
    let Some(open) = declared.find('(') else {
        return DeclaredType { name: declared.to_string(), ..Default::default() };
    };

    let name = declared[..open].trim().to_string();
    let inner = declared[open + 1..].trim_end().trim_end_matches(')');
    let args: Vec<Option<i64>> = inner
        .split(',')
        .map(str::trim)
        .map(|arg| arg.parse().ok())
        .collect();

    let lowered = name.to_lowercase();
    if matches!(lowered.as_str(), "decimal" | "numeric") {
        DeclaredType {
            name,
            size: None,
            precision: args.first().copied().flatten(),
            scale: Some(args.get(1).copied().flatten().unwrap_or(0)),
        }
    } else {
        DeclaredType { name, size: args.first().copied().flatten(), ..Default::default() }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn schema_prefix(schema: Option<&str>) -> String {
    schema.map(|s| format!("{}.", quote_ident(s))).unwrap_or_default()
}

/// Missing and undecodable numbers both read as absent.
fn optional_int(row: &AnyRow, index: usize) -> Option<i64> {
    row.try_get::<Option<i64>, _>(index).ok().flatten()
}
