use entity_scaffold::{assemble, ColumnMetadata, ColumnSize};

fn order_line_columns() -> Vec<ColumnMetadata> {
    let mut id = ColumnMetadata::new("order_line_id", 1, "int");
    id.is_nullable = false;
    id.is_primary_key = true;
    id.is_identity = true;
    id.referencing_tables = vec!["shipment_item".to_string(), "return_item".to_string()];

    let mut order_id = ColumnMetadata::new("order_id", 2, "int");
    order_id.is_nullable = false;
    order_id.referenced_table = Some("Orders".to_string());
    order_id.referencing_tables = vec!["shipment_item".to_string()];

    let mut product_code = ColumnMetadata::new("product_code", 3, "nchar");
    product_code.is_nullable = false;
    product_code.size = Some(ColumnSize::Bounded(8));

    let quantity = ColumnMetadata::new("Quantity", 4, "int");

    let mut unit_price = ColumnMetadata::new("unit_price", 5, "decimal");
    unit_price.is_nullable = false;
    unit_price.precision = Some(10);
    unit_price.scale = Some(2);

    let mut notes = ColumnMetadata::new("Notes", 6, "nvarchar");
    notes.size = Some(ColumnSize::Unbounded);

    let location = ColumnMetadata::new("Location", 7, "geography");

    vec![id, order_id, product_code, quantity, unit_price, notes, location]
}

#[test]
fn test_assemble_full_entity() {
    let expected = concat!(
        "\t[Table(\"order_line\", Schema = \"dbo\")]\n",
        "\tpublic class OrderLine\n",
        "\t{\n",
        "\t\t[Key]\n",
        "\t\t[Column(\"order_line_id\")]\n",
        "\t\tpublic int OrderLineId { get; set; }\n",
        "\n",
        "\t\t[Column(\"order_id\")]\n",
        "\t\tpublic int OrderId { get; set; }\n",
        "\n",
        "\t\t[IsUnicode]\n",
        "\t\t[StringLength(8, MinimumLength = 8)]\n",
        "\t\t[Required]\n",
        "\t\t[Column(\"product_code\", TypeName = \"nchar(8)\")]\n",
        "\t\tpublic string ProductCode { get; set; }\n",
        "\t\tpublic int? Quantity { get; set; }\n",
        "\n",
        "\t\t[Column(\"unit_price\", TypeName = \"decimal(10, 2)\")]\n",
        "\t\tpublic decimal UnitPrice { get; set; }\n",
        "\n",
        "\t\t[IsUnicode]\n",
        "\t\t[Column(TypeName = \"nvarchar(MAX)\")]\n",
        "\t\tpublic string Notes { get; set; }\n",
        "\t\tpublic NotSupported Location { get; set; } // unmapped catalog type 'geography'\n",
        "\n",
        "\t\t/* Start Nav Properties\n",
        "\t\t[ForeignKey(\"OrderId\")]\n",
        "\t\tpublic virtual Orders Orders { get; set; }\n",
        "\t\tEnd Nav Properties */\n",
        "\n",
        "\t\t/* Start Collection Nav Properties\n",
        "\t\tpublic virtual ICollection<ShipmentItem> ShipmentItem { get; set; } = new HashSet<ShipmentItem>();\n",
        "\t\tpublic virtual ICollection<ReturnItem> ReturnItem { get; set; } = new HashSet<ReturnItem>();\n",
        "\t\tEnd Collection Nav Properties */\n",
        "\t}\n",
    );

    assert_eq!(assemble("order_line", Some("dbo"), &order_line_columns()), expected);
}

#[test]
fn test_properties_follow_ordinal_position() {
    let mut columns = order_line_columns();
    columns.reverse();

    let text = assemble("order_line", Some("dbo"), &columns);
    let id = text.find("OrderLineId {").expect("id property");
    let location = text.find("Location {").expect("location property");
    assert!(id < location);
}

#[test]
fn test_dependent_tables_render_once() {
    let text = assemble("order_line", Some("dbo"), &order_line_columns());

    assert_eq!(text.matches("ICollection<ShipmentItem>").count(), 1);
    assert_eq!(text.matches("ICollection<ReturnItem>").count(), 1);
}

#[test]
fn test_nullable_markers_follow_value_types() {
    let mut flag = ColumnMetadata::new("IsActive", 1, "bit");
    flag.is_nullable = true;
    let guid = ColumnMetadata::new("Token", 2, "uniqueidentifier");
    let name = ColumnMetadata::new("Name", 3, "varchar");
    let tree = ColumnMetadata::new("Node", 4, "hierarchyid");

    let text = assemble("Flags", None, &[flag, guid, name, tree]);

    assert!(text.contains("public bool? IsActive { get; set; }"));
    assert!(text.contains("public Guid? Token { get; set; }"));
    assert!(text.contains("public string Name { get; set; }"));
    assert!(text.contains("public NotSupported Node { get; set; }\n"));
}

#[test]
fn test_entity_without_schema_or_relationships() {
    let mut id = ColumnMetadata::new("Id", 1, "bigint");
    id.is_nullable = false;
    id.is_primary_key = true;
    id.is_identity = true;

    let expected = concat!(
        "\t[Table(\"AUDIT_LOG\")]\n",
        "\tpublic class AuditLog\n",
        "\t{\n",
        "\t\t[Key]\n",
        "\t\tpublic long Id { get; set; }\n",
        "\t}\n",
    );

    assert_eq!(assemble("AUDIT_LOG", None, &[id]), expected);
}
