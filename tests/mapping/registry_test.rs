#[cfg(test)]
mod tests {
    use tablemeta::mapping::{
        Conventions, Entity, EntityMapping, EntityType, MappingError, MappingSource,
        ModelRegistry, Property,
    };

    struct OrderLine;

    impl Entity for OrderLine {
        fn mapping() -> EntityMapping {
            EntityMapping::new("OrderLine")
                .field("OrderId")
                .field("LineNo")
                .field_as("UnitPrice", "price")
                .key(["OrderId", "LineNo"])
        }
    }

    mod billing {
        /// Same short name as a mapping registered by name only.
        pub struct Invoice;
    }

    #[test]
    fn test_snake_case_conventions() {
        let mut registry = ModelRegistry::with_conventions(Conventions {
            pluralize_table_names: true,
            snake_case_columns: true,
        });
        registry.register::<OrderLine>().unwrap();

        let line = EntityType::of::<OrderLine>();
        assert_eq!(
            registry.resolve_table_name(&line).unwrap().as_deref(),
            Some("OrderLines")
        );
        assert_eq!(
            registry.resolve_key_names(&line).unwrap(),
            vec!["order_id", "line_no"]
        );

        let map = registry.resolve_mappings(&line).unwrap().unwrap();
        assert_eq!(map[&Property::new("OrderLine", "UnitPrice")], "price");
        assert_eq!(map[&Property::new("OrderLine", "LineNo")], "line_no");
    }

    #[test]
    fn test_type_token_falls_back_to_name() {
        let mut registry = ModelRegistry::new();
        registry
            .register_mapping(
                EntityMapping::new("Invoice")
                    .table("tbl_invoice")
                    .field_as("Number", "invoice_no")
                    .key(["Number"]),
            )
            .unwrap();

        let token = EntityType::of::<billing::Invoice>();
        assert_eq!(token.name(), "Invoice");
        assert_eq!(
            registry.resolve_table_name(&token).unwrap().as_deref(),
            Some("tbl_invoice")
        );
        assert_eq!(registry.resolve_key_names(&token).unwrap(), vec!["invoice_no"]);
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let mut first = ModelRegistry::new();
        first
            .register_mapping(EntityMapping::new("A").field("Id"))
            .and_then(|r| r.register_mapping(EntityMapping::new("B").field("Id")))
            .unwrap();

        let mut second = ModelRegistry::new();
        second
            .register_mapping(EntityMapping::new("B").field("Id"))
            .and_then(|r| r.register_mapping(EntityMapping::new("A").field("Id")))
            .unwrap();

        assert_eq!(first.entity_names(), vec!["A", "B"]);
        assert_eq!(first.entity_names(), second.entity_names());
        for name in ["A", "B"] {
            let entity = EntityType::named(name);
            assert_eq!(
                first.resolve_mappings(&entity).unwrap(),
                second.resolve_mappings(&entity).unwrap()
            );
        }
    }

    #[test]
    fn test_type_registered_twice_is_rejected() {
        let mut registry = ModelRegistry::new();
        registry.register::<OrderLine>().unwrap();

        let err = registry.register::<OrderLine>().unwrap_err();
        assert!(matches!(err, MappingError::DuplicateEntity(_)));
    }

    #[test]
    fn test_blank_explicit_column_is_rejected() {
        let mut registry = ModelRegistry::new();
        let err = registry
            .register_mapping(EntityMapping::new("Order").field_as("Id", " "))
            .unwrap_err();

        assert!(matches!(err, MappingError::BlankColumn { .. }));
        assert_eq!(
            err.to_string(),
            "entity 'Order' maps field 'Id' to a blank column"
        );
    }
}
