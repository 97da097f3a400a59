//! # Entity Module
//!
//! Renders the entity class for a table: the table binding, one annotated
//! property per column, and commented-out navigation properties for the
//! relationships found in the catalog.

use crate::{
    annotation::synthesize,
    metadata::ColumnMetadata,
    naming::normalize_name,
    types::{type_info, NullHandling, NOT_SUPPORTED},
};

/// Renders the entity class for `table`.
///
/// `columns` may come in any order; properties are emitted by ordinal
/// position. A column whose catalog type has no mapping is written with the
/// `NotSupported` placeholder type so the problem is visible in the output.
pub fn assemble(table: &str, schema: Option<&str>, columns: &[ColumnMetadata]) -> String {
    let mut ordered: Vec<&ColumnMetadata> = columns.iter().collect();
    ordered.sort_by_key(|c| c.ordinal_position);

    let class_name = normalize_name(table);
    let mut out = match schema {
        Some(schema) => format!("\t[Table(\"{}\", Schema = \"{}\")]\n", table, schema),
        None => format!("\t[Table(\"{}\")]\n", table),
    };
    out.push_str(&format!("\tpublic class {}\n\t{{\n", class_name));

    for (i, column) in ordered.iter().enumerate() {
        write_property(&mut out, column, columns, i == 0);
    }

    write_navigation_properties(&mut out, &ordered);
    write_collection_properties(&mut out, &ordered);

    out.push_str("\t}\n");
    out
}

fn write_property(out: &mut String, column: &ColumnMetadata, table: &[ColumnMetadata], first: bool) {
    let annotations = synthesize(column, table);
    if !annotations.is_empty() && !first {
        out.push('\n');
    }

    for annotation in &annotations {
        out.push_str(&format!("\t\t{}\n", annotation));
    }

    let member = normalize_name(&column.column_name);
    match type_info(&column.data_type) {
        Some(info) => {
            let marker = if column.is_nullable && info.nulls == NullHandling::ValueLike { "?" } else { "" };
            out.push_str(&format!("\t\tpublic {}{} {} {{ get; set; }}\n", info.output, marker, member));
        }
        None => {
            log::warn!("No type mapping for '{}' (column '{}')", column.data_type, column.column_name);
            out.push_str(&format!(
                "\t\tpublic {} {} {{ get; set; }} // unmapped catalog type '{}'\n",
                NOT_SUPPORTED, member, column.data_type
            ));
        }
    }
}

/// One reference navigation per foreign-key column.
fn write_navigation_properties(out: &mut String, columns: &[&ColumnMetadata]) {
    let foreign_keys: Vec<(&ColumnMetadata, &str)> =
        columns.iter().filter_map(|c| c.referenced_table.as_deref().map(|table| (*c, table))).collect();

    if foreign_keys.is_empty() {
        return;
    }

    out.push_str("\n\t\t/* Start Nav Properties\n");
    for (column, table) in foreign_keys {
        let target = normalize_name(table);
        out.push_str(&format!("\t\t[ForeignKey(\"{}\")]\n", normalize_name(&column.column_name)));
        out.push_str(&format!("\t\tpublic virtual {} {} {{ get; set; }}\n", target, target));
    }
    out.push_str("\t\tEnd Nav Properties */\n");
}

/// One collection navigation per distinct dependent table, first appearance first.
fn write_collection_properties(out: &mut String, columns: &[&ColumnMetadata]) {
    let mut dependents: Vec<&str> = Vec::new();
    for table in columns.iter().flat_map(|c| c.referencing_tables.iter()) {
        if !dependents.contains(&table.as_str()) {
            dependents.push(table);
        }
    }

    if dependents.is_empty() {
        return;
    }

    out.push_str("\n\t\t/* Start Collection Nav Properties\n");
    for table in dependents {
        let target = normalize_name(table);
        out.push_str(&format!(
            "\t\tpublic virtual ICollection<{}> {} {{ get; set; }} = new HashSet<{}>();\n",
            target, target, target
        ));
    }
    out.push_str("\t\tEnd Collection Nav Properties */\n");
}
