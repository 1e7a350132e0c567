//! Loads the shipped sample configs and checks them against each other.

use std::path::PathBuf;

use stock_store_config::{load_document, load_mapping_config, load_schema_config};
use stock_store_core::{require_columns, validate_mapping, validate_schema_config};

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../store/config")
        .join(name)
}

#[test]
fn test_sample_schema_is_valid() {
    let schema = load_schema_config(sample("db_config.json")).unwrap();
    validate_schema_config(&schema).unwrap();
    require_columns(&schema, &["isin", "watchlist"]).unwrap();
    assert_eq!(schema.names().next(), Some("isin"));
}

#[test]
fn test_sample_mapping_matches_schema() {
    let schema = load_schema_config(sample("db_config.json")).unwrap();
    let mapping = load_mapping_config(sample("api_field_mapping.json")).unwrap();
    validate_mapping(&mapping, &schema).unwrap();

    let search = mapping.get("search_isin").unwrap();
    assert_eq!(search.search_param.as_deref(), Some("isin"));
    assert_eq!(search.first_entry, "0");
    assert!(search.mapping.targets("isin"));

    let profile = mapping.get("profile").unwrap();
    assert_eq!(profile.search_param, None);
}

#[test]
fn test_sample_documents_keep_key_order() {
    let doc = load_document(sample("api_field_mapping.json")).unwrap();
    let apis: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(apis, vec!["search_isin", "profile"]);
}
