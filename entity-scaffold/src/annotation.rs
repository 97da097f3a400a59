//! # Annotation Module
//!
//! Derives the data annotations a generated member carries from its column
//! metadata.
//!
//! Each rule is a pure function that looks at one column (and, where keys are
//! concerned, at the rest of the table) and returns zero or more annotations.
//! The rules run in a fixed order and their output is folded into one list
//! keyed by annotation kind: when two rules produce the same kind, the
//! parameters are merged and the first value written for a parameter wins.

use std::fmt;

use crate::{
    metadata::{ColumnMetadata, ColumnSize},
    naming::normalize_name,
    types::{is_exact_numeric_type, is_fixed_length_type, is_sized_type, is_unicode_type, type_info, NullHandling},
};

// ============================================================================
// Annotation Types
// ============================================================================

/// The kinds of annotation the scaffolder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    IsUnicode,
    Key,
    StringLength,
    DatabaseGenerated,
    Required,
    Column,
}

impl AnnotationKind {
    /// The attribute name as written in the generated code.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::IsUnicode => "IsUnicode",
            AnnotationKind::Key => "Key",
            AnnotationKind::StringLength => "StringLength",
            AnnotationKind::DatabaseGenerated => "DatabaseGenerated",
            AnnotationKind::Required => "Required",
            AnnotationKind::Column => "Column",
        }
    }
}

/// One annotation argument. A `None` name is the positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationParam {
    pub name: Option<&'static str>,
    pub value: String,
}

/// An annotation attached to a generated member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// At most one positional parameter; named parameters are unique.
    pub params: Vec<AnnotationParam>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Self { kind, params: Vec::new() }
    }

    /// Sets the positional parameter.
    pub fn positional(self, value: impl Into<String>) -> Self {
        self.param(None, value)
    }

    /// Sets a named parameter.
    pub fn named(self, name: &'static str, value: impl Into<String>) -> Self {
        self.param(Some(name), value)
    }

    fn param(mut self, name: Option<&'static str>, value: impl Into<String>) -> Self {
        if !self.params.iter().any(|p| p.name == name) {
            self.params.push(AnnotationParam { name, value: value.into() });
        }
        self
    }

    /// Looks up a parameter value; `None` selects the positional one.
    pub fn get(&self, name: Option<&str>) -> Option<&str> {
        self.params.iter().find(|p| p.name == name).map(|p| p.value.as_str())
    }

    /// Adds the parameters of `other` that this annotation does not have yet.
    fn merge(&mut self, other: Annotation) {
        for param in other.params {
            if !self.params.iter().any(|p| p.name == param.name) {
                self.params.push(param);
            }
        }
    }
}

/// Renders as `[Name]` or `[Name(positional, Key = Value)]`.
impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .params
            .iter()
            .filter(|p| p.name.is_none())
            .map(|p| p.value.clone())
            .chain(self.params.iter().filter_map(|p| p.name.map(|name| format!("{} = {}", name, p.value))))
            .collect();

        if args.is_empty() {
            write!(f, "[{}]", self.kind.name())
        } else {
            write!(f, "[{}({})]", self.kind.name(), args.join(", "))
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

type Rule = fn(&ColumnMetadata, &[ColumnMetadata]) -> Vec<Annotation>;

/// Rules in application order. Earlier rules win parameter conflicts.
const RULES: &[Rule] = &[unicode, key, string_length, computed, identity, not_generated, required, rename, storage_type];

/// Derives the annotations for `column`. `table` holds every column of its table.
pub fn synthesize(column: &ColumnMetadata, table: &[ColumnMetadata]) -> Vec<Annotation> {
    RULES.iter().flat_map(|rule| rule(column, table)).fold(Vec::new(), |mut merged: Vec<Annotation>, annotation| {
        match merged.iter_mut().find(|existing| existing.kind == annotation.kind) {
            Some(existing) => existing.merge(annotation),
            None => merged.push(annotation),
        }
        merged
    })
}

fn key_count(table: &[ColumnMetadata]) -> usize {
    table.iter().filter(|c| c.is_primary_key).count()
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn unicode(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    if !is_unicode_type(&column.data_type) {
        return Vec::new();
    }
    vec![Annotation::new(AnnotationKind::IsUnicode)]
}

/// Composite keys also get their zero-based position among the key columns.
fn key(column: &ColumnMetadata, table: &[ColumnMetadata]) -> Vec<Annotation> {
    if !column.is_primary_key {
        return Vec::new();
    }

    let mut annotations = vec![Annotation::new(AnnotationKind::Key)];

    if key_count(table) > 1 {
        let mut keys: Vec<&ColumnMetadata> = table.iter().filter(|c| c.is_primary_key).collect();
        keys.sort_by_key(|c| c.ordinal_position);

        if let Some(order) = keys.iter().position(|c| c.column_name == column.column_name) {
            annotations.push(Annotation::new(AnnotationKind::Column).named("Order", order.to_string()));
        }
    }

    annotations
}

fn string_length(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    let Some(ColumnSize::Bounded(size)) = column.size else {
        return Vec::new();
    };

    let mut annotation = Annotation::new(AnnotationKind::StringLength).positional(size.to_string());
    if is_fixed_length_type(&column.data_type) {
        annotation = annotation.named("MinimumLength", size.to_string());
    }
    vec![annotation]
}

fn computed(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    if !column.is_computed {
        return Vec::new();
    }
    vec![Annotation::new(AnnotationKind::DatabaseGenerated).positional("DatabaseGeneratedOption.Computed")]
}

/// Identity keys are generated by convention and need no annotation.
fn identity(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    if !column.is_identity || column.is_primary_key {
        return Vec::new();
    }
    vec![Annotation::new(AnnotationKind::DatabaseGenerated).positional("DatabaseGeneratedOption.Identity")]
}

/// A single non-identity key must opt out of generation; composite keys already do.
fn not_generated(column: &ColumnMetadata, table: &[ColumnMetadata]) -> Vec<Annotation> {
    if !column.is_primary_key || column.is_identity || key_count(table) > 1 {
        return Vec::new();
    }
    vec![Annotation::new(AnnotationKind::DatabaseGenerated).positional("DatabaseGeneratedOption.None")]
}

/// Only reference-like output types can hold null without a marker.
fn required(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    let reference_like = type_info(&column.data_type).is_some_and(|info| info.nulls == NullHandling::ReferenceLike);
    if column.is_nullable || !reference_like {
        return Vec::new();
    }
    vec![Annotation::new(AnnotationKind::Required)]
}

/// A length change after normalization means the member name differs from the column.
fn rename(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    let normalized = normalize_name(&column.column_name);
    if normalized.chars().count() == column.column_name.chars().count() {
        return Vec::new();
    }
    vec![Annotation::new(AnnotationKind::Column).positional(quoted(&column.column_name))]
}

/// Spells out the storage type of sized and exact numeric columns.
///
/// An unbounded length renders as `MAX`, unless the backend has its own
/// spelling for the type, which is then written without a length.
fn storage_type(column: &ColumnMetadata, _: &[ColumnMetadata]) -> Vec<Annotation> {
    let base = column.storage_type.as_deref().unwrap_or(&column.data_type);

    let type_name = if is_sized_type(&column.data_type) {
        match (column.size, &column.storage_type) {
            (Some(ColumnSize::Bounded(size)), _) => format!("{}({})", base, size),
            (_, Some(native)) => native.clone(),
            (_, None) => format!("{}(MAX)", base),
        }
    } else if is_exact_numeric_type(&column.data_type) {
        match (column.precision, column.scale) {
            (Some(precision), Some(scale)) => format!("{}({}, {})", base, precision, scale),
            _ => return Vec::new(),
        }
    } else {
        return Vec::new();
    };

    vec![Annotation::new(AnnotationKind::Column).named("TypeName", quoted(&type_name))]
}
