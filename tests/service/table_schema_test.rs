#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use tablemeta::prelude::*;
    use tempfile::TempDir;

    /// A database file holding an `Orders` table.
    fn orders_db() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Orders (
                 OrderId INTEGER PRIMARY KEY,
                 CustomerName TEXT NOT NULL,
                 OrderTotal REAL DEFAULT 0
             );",
        )
        .unwrap();
        conn.close().unwrap();

        (dir, path)
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::new()
    }

    /// Column description through SQLite's `pragma_table_info`.
    fn pragma_catalog() -> CatalogQuery {
        CatalogQuery::template(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk \
             FROM pragma_table_info({table}) ORDER BY cid",
        )
        .unwrap()
    }

    #[test]
    fn test_default_catalog_mirrors_table() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut service = MetadataService::new(&registry, SqliteConnection::new(&path));

        let schema = service.table_schema("Orders").unwrap();

        assert_eq!(schema.name, "Orders");
        assert_eq!(schema.row_count(), 0);
        assert_eq!(
            schema.column_names(),
            vec!["OrderId", "CustomerName", "OrderTotal"]
        );
        let kinds: Vec<Option<ValueKind>> = schema.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Some(ValueKind::Integer),
                Some(ValueKind::Text),
                Some(ValueKind::Real)
            ]
        );
        assert_eq!(schema.columns[1].declared_type.as_deref(), Some("TEXT"));
    }

    #[test]
    fn test_pragma_template() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut service = MetadataService::new(&registry, SqliteConnection::new(&path))
            .with_catalog(pragma_catalog());

        let schema = service.table_schema("Orders").unwrap();

        assert_eq!(
            schema.column_names(),
            vec!["cid", "name", "type", "notnull", "dflt_value", "pk"]
        );
        assert_eq!(schema.row_count(), 3);

        let names: Vec<&str> = schema
            .column_values("name")
            .unwrap()
            .into_iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(names, vec!["OrderId", "CustomerName", "OrderTotal"]);

        let pk: Vec<Option<i64>> = schema
            .column_values("pk")
            .unwrap()
            .into_iter()
            .map(Value::as_i64)
            .collect();
        assert_eq!(pk, vec![Some(1), Some(0), Some(0)]);
    }

    #[test]
    fn test_closed_connection_is_opened_then_closed() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut conn = SqliteConnection::new(&path);
        {
            let mut service = MetadataService::new(&registry, &mut conn);
            service.table_schema("Orders").unwrap();
            assert_eq!(service.connection().state(), ConnectionState::Closed);
        }
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_restore_policy_leaves_open_connection_open() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut conn = SqliteConnection::new(&path);
        conn.open().unwrap();

        let mut service = MetadataService::new(&registry, &mut conn)
            .with_policy(ConnectionPolicy::Restore);
        let schema = service.table_schema("Orders").unwrap();

        assert_eq!(schema.name, "Orders");
        assert_eq!(service.connection().state(), ConnectionState::Open);
    }

    #[test]
    fn test_missing_table_propagates_driver_error() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut conn = SqliteConnection::new(&path);
        conn.open().unwrap();

        let err = {
            let mut service = MetadataService::new(&registry, &mut conn);
            service.table_schema("DoesNotExist").unwrap_err()
        };

        let driver = err.driver_error::<SqliteError>().unwrap();
        assert!(matches!(driver, SqliteError::Sqlite(_)));
        assert!(err.to_string().contains("no such table: DoesNotExist"));
        // closed on the failure path too
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_missing_table_with_restore_policy() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut conn = SqliteConnection::new(&path);
        conn.open().unwrap();

        {
            let mut service = MetadataService::new(&registry, &mut conn)
                .with_policy(ConnectionPolicy::Restore);
            let err = service.table_schema("DoesNotExist").unwrap_err();
            assert!(err.driver_error::<SqliteError>().is_some());
        }
        assert_eq!(conn.state(), ConnectionState::Open);
    }

    #[test]
    fn test_blank_table_name_never_opens() {
        let registry = registry();
        let mut conn = SqliteConnection::new("/nonexistent/dir/never.db");
        {
            let mut service = MetadataService::new(&registry, &mut conn);
            let err = service.table_schema("   ").unwrap_err();
            assert_eq!(err.param(), Some("table_name"));
        }
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_open_failure_propagates() {
        let registry = registry();
        let mut service = MetadataService::new(
            &registry,
            SqliteConnection::new("/nonexistent/dir/never.db"),
        );

        let err = service.table_schema("Orders").unwrap_err();
        assert!(err.driver_error::<SqliteError>().is_some());
    }

    #[test]
    fn test_schema_table_is_owned_by_caller() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let schema = {
            let mut service = MetadataService::new(&registry, SqliteConnection::new(&path));
            service.table_schema("Orders").unwrap()
        };
        assert_eq!(schema.columns.len(), 3);
    }

    #[test]
    fn test_render_schema() {
        let (_dir, path) = orders_db();
        let registry = registry();
        let mut service = MetadataService::new(&registry, SqliteConnection::new(&path))
            .with_catalog(pragma_catalog());

        let schema = service.table_schema("Orders").unwrap();
        insta::assert_snapshot!(schema.to_string(), @r"
        Orders
        cid | name         | type    | notnull | dflt_value | pk
        ----+--------------+---------+---------+------------+---
        0   | OrderId      | INTEGER | 0       | NULL       | 1
        1   | CustomerName | TEXT    | 1       | NULL       | 0
        2   | OrderTotal   | REAL    | 0       | 0          | 0
        ");
    }
}
