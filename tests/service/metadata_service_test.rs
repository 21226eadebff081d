#[cfg(test)]
mod tests {
    use tablemeta::prelude::*;

    struct Order;

    impl Entity for Order {
        fn mapping() -> EntityMapping {
            EntityMapping::new("Order")
                .table("Orders")
                .field_as("Id", "OrderId")
                .field_as("Total", "OrderTotal")
                .key(["Id"])
        }
    }

    struct Customer;

    impl Entity for Customer {
        fn mapping() -> EntityMapping {
            EntityMapping::new("Customer").field("Id").field("Name").key(["Id"])
        }
    }

    struct AuditEntry;

    impl Entity for AuditEntry {
        fn mapping() -> EntityMapping {
            EntityMapping::new("AuditEntry").field("Message")
        }
    }

    struct Invoice;

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry
            .register::<Order>()
            .and_then(|r| r.register::<Customer>())
            .and_then(|r| r.register::<AuditEntry>())
            .unwrap();
        registry
    }

    #[test]
    fn test_order_mapping() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());

        assert_eq!(
            service.table_name::<Order>().unwrap(),
            Some("Orders".to_string())
        );
        assert_eq!(service.key_names::<Order>().unwrap(), vec!["OrderId".to_string()]);

        let map = service.mappings::<Order>().unwrap().unwrap();
        let mut pairs: Vec<(&str, &str)> = map
            .iter()
            .map(|(p, c)| (p.name(), c.as_str()))
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![("Id", "OrderId"), ("Total", "OrderTotal")]);
    }

    #[test]
    fn test_conventional_table_name() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());

        assert_eq!(
            service.table_name::<Customer>().unwrap().as_deref(),
            Some("Customers")
        );
        assert_eq!(service.key_names::<Customer>().unwrap(), vec!["Id"]);
    }

    #[test]
    fn test_entity_without_key() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());

        assert!(service.key_names::<AuditEntry>().unwrap().is_empty());
        assert!(service.table_name::<AuditEntry>().unwrap().is_some());
    }

    #[test]
    fn test_unmapped_type_is_absent_not_error() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());

        assert!(service.table_name::<Invoice>().unwrap().is_none());
        assert!(service.mappings::<Invoice>().unwrap().is_none());
        assert!(service.key_names::<Invoice>().unwrap().is_empty());
    }

    #[test]
    fn test_named_and_typed_tokens_agree() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());
        let named = EntityType::named("Order");

        assert_eq!(
            service.table_name_of(&named).unwrap(),
            service.table_name::<Order>().unwrap()
        );
        assert_eq!(
            service.mappings_of(&named).unwrap(),
            service.mappings::<Order>().unwrap()
        );
    }

    #[test]
    fn test_blank_token_is_invalid_argument() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());

        let err = service.table_name_of(&EntityType::named("")).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.param(), Some("entity"));
    }

    #[test]
    fn test_repeated_calls_are_equal() {
        let registry = registry();
        let service = MetadataService::new(&registry, SqliteConnection::in_memory());

        for _ in 0..3 {
            assert_eq!(
                service.table_name::<Order>().unwrap().as_deref(),
                Some("Orders")
            );
            assert_eq!(service.mappings::<Order>().unwrap().unwrap().len(), 2);
            assert_eq!(service.key_names::<Order>().unwrap(), vec!["OrderId"]);
        }
    }

    #[test]
    fn test_lookups_leave_connection_closed() {
        let registry = registry();
        let mut conn = SqliteConnection::in_memory();
        {
            let service = MetadataService::new(&registry, &mut conn);
            service.mappings::<Order>().unwrap();
        }
        assert_eq!(conn.state(), ConnectionState::Closed);
    }
}
