#[cfg(test)]
mod tests {
    use std::fs;

    use tablemeta::config::Settings;
    use tablemeta::mapping::{Conventions, EntityType, MappingError, ModelRegistry};
    use tablemeta::prelude::{MetadataService, SqliteConnection};

    const MAPPINGS: &str = r#"
[entities.Order]
table = "Orders"
keys = ["Id"]

[entities.Order.columns]
Id = "OrderId"
Total = "OrderTotal"

[entities.Customer]
keys = ["Id"]
fields = ["Id", "FullName"]
"#;

    #[test]
    fn test_registry_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.toml");
        fs::write(&path, MAPPINGS).unwrap();

        let registry = ModelRegistry::from_file(&path, Conventions::default()).unwrap();
        assert_eq!(registry.entity_names(), vec!["Customer", "Order"]);

        let service = MetadataService::new(&registry, SqliteConnection::in_memory());
        let order = EntityType::named("Order");
        assert_eq!(
            service.table_name_of(&order).unwrap().as_deref(),
            Some("Orders")
        );
        assert_eq!(service.key_names_of(&order).unwrap(), vec!["OrderId"]);

        let customer = EntityType::named("Customer");
        assert_eq!(
            service.table_name_of(&customer).unwrap().as_deref(),
            Some("Customers")
        );
        assert_eq!(service.mappings_of(&customer).unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_file_conventions_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mappings = dir.path().join("mappings.toml");
        fs::write(&mappings, MAPPINGS).unwrap();

        let config = dir.path().join("tablemeta.toml");
        fs::write(
            &config,
            format!(
                "[mappings]\nfile = {:?}\npluralize_table_names = false\nsnake_case_columns = true\n",
                mappings.display().to_string()
            ),
        )
        .unwrap();

        let settings = Settings::from_file(&config).unwrap();
        let file = settings.mappings.resolved_file().unwrap().unwrap();
        let registry = ModelRegistry::from_file(file, settings.mappings.conventions()).unwrap();

        let service = MetadataService::new(&registry, SqliteConnection::in_memory());
        let customer = EntityType::named("Customer");
        assert_eq!(
            service.table_name_of(&customer).unwrap().as_deref(),
            Some("Customer")
        );

        let map = service.mappings_of(&customer).unwrap().unwrap();
        let mut columns: Vec<&str> = map.values().map(String::as_str).collect();
        columns.sort_unstable();
        assert_eq!(columns, vec!["full_name", "id"]);
    }

    #[test]
    fn test_missing_file() {
        let err = ModelRegistry::from_file("/nonexistent/mappings.toml", Conventions::default())
            .unwrap_err();
        assert!(matches!(err, MappingError::Io(_)));
    }

    #[test]
    fn test_invalid_key_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.toml");
        fs::write(&path, "[entities.Order]\nkeys = [\"Id\"]\nfields = [\"Total\"]\n").unwrap();

        let err = ModelRegistry::from_file(&path, Conventions::default()).unwrap_err();
        assert!(matches!(err, MappingError::UnknownKeyField { .. }));
    }
}
