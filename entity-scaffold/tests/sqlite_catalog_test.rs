use entity_scaffold::{extract_table, scaffold_entity, ColumnSize, Database, Error};

async fn shop_database() -> Result<Database, Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;

    let statements = [
        "CREATE TABLE Customer (
            CustomerId INTEGER PRIMARY KEY,
            full_name NVARCHAR(100) NOT NULL,
            CountryCode CHAR(2),
            Notes NVARCHAR(-1),
            Balance DECIMAL(10, 2) NOT NULL
        )",
        "CREATE TABLE OrderHeader (
            OrderHeaderId INTEGER PRIMARY KEY,
            CustomerId INTEGER NOT NULL REFERENCES Customer(CustomerId),
            Total DECIMAL(12, 2),
            TotalWithTax DECIMAL(12, 2) AS (Total * 1.2)
        )",
        "CREATE TABLE Invoice (
            InvoiceId INTEGER PRIMARY KEY,
            CustomerId INTEGER REFERENCES Customer,
            Scan BLOB
        )",
        "CREATE TABLE OrderLine (
            OrderHeaderId INT NOT NULL,
            LineNo INT NOT NULL,
            Quantity INT,
            PRIMARY KEY (OrderHeaderId, LineNo)
        )",
    ];

    for sql in statements {
        sqlx::query(sql).execute(db.pool()).await?;
    }

    Ok(db)
}

#[tokio::test]
async fn test_sqlite_customer_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = shop_database().await?;

    let columns = extract_table(&db, "Customer", None).await?;
    let names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
    assert_eq!(names, vec!["CustomerId", "full_name", "CountryCode", "Notes", "Balance"]);

    let id = &columns[0];
    assert!(id.is_primary_key && id.is_identity && !id.is_nullable);
    assert_eq!(id.data_type, "bigint");
    assert_eq!(id.referencing_tables, vec!["Invoice".to_string(), "OrderHeader".to_string()]);

    assert_eq!(columns[1].data_type, "nvarchar");
    assert_eq!(columns[1].size, Some(ColumnSize::Bounded(100)));
    assert!(!columns[1].is_nullable);
    assert_eq!(columns[2].size, Some(ColumnSize::Bounded(2)));
    assert!(columns[2].is_nullable);
    assert_eq!(columns[3].size, Some(ColumnSize::Unbounded));
    assert_eq!((columns[4].precision, columns[4].scale), (Some(10), Some(2)));

    println!("SQLite customer metadata test passed!");
    Ok(())
}

#[tokio::test]
async fn test_sqlite_computed_and_foreign_keys() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = shop_database().await?;

    let columns = extract_table(&db, "OrderHeader", None).await?;
    let customer = columns.iter().find(|c| c.column_name == "CustomerId").expect("CustomerId column");
    assert_eq!(customer.referenced_table.as_deref(), Some("Customer"));

    let with_tax = columns.iter().find(|c| c.column_name == "TotalWithTax").expect("TotalWithTax column");
    assert!(with_tax.is_computed);

    let text = scaffold_entity(&db, "OrderHeader", None).await?;
    assert!(text.contains("[DatabaseGenerated(DatabaseGeneratedOption.Computed)]"));
    assert!(text.contains("public long CustomerId { get; set; }"));
    assert!(text.contains("public virtual Customer Customer { get; set; }"));

    println!("SQLite computed and foreign key test passed!");
    Ok(())
}

#[tokio::test]
async fn test_sqlite_composite_key() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = shop_database().await?;

    let text = scaffold_entity(&db, "OrderLine", None).await?;
    assert!(text.contains("[Column(Order = 0)]\n\t\tpublic int OrderHeaderId { get; set; }"));
    assert!(text.contains("[Column(Order = 1)]\n\t\tpublic int LineNo { get; set; }"));
    assert!(text.contains("public int? Quantity { get; set; }"));
    assert!(!text.contains("DatabaseGeneratedOption.None"));
    assert!(!text.contains("DatabaseGeneratedOption.Identity"));

    println!("SQLite composite key test passed!");
    Ok(())
}

#[tokio::test]
async fn test_sqlite_entity_header_and_missing_table() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = shop_database().await?;

    let text = scaffold_entity(&db, "Customer", None).await?;
    assert!(text.starts_with("\t[Table(\"Customer\")]\n\tpublic class Customer\n\t{\n\t\t[Key]\n"));
    assert!(text.contains("[IsUnicode]\n\t\t[Column(TypeName = \"nvarchar(MAX)\")]\n\t\tpublic string Notes { get; set; }"));
    assert!(text.contains("ICollection<Invoice> Invoice"));
    assert!(text.contains("ICollection<OrderHeader> OrderHeader"));

    let invoice = scaffold_entity(&db, "Invoice", None).await?;
    assert!(invoice.contains("[Column(TypeName = \"blob\")]\n\t\tpublic byte[] Scan { get; set; }"));

    let missing = extract_table(&db, "Nope", None).await;
    assert!(matches!(missing, Err(Error::TableNotFound { .. })));

    println!("SQLite header and missing table test passed!");
    Ok(())
}
