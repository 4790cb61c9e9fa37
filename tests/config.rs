use std::fs;

use assert_matches::assert_matches;
use tempfile::tempdir;

use datapages::config::{
    ConfigLoader, DEFAULT_PROJECT_COLUMN, DEFAULT_RECORD_URL_TEMPLATE, SpeciesLink,
};
use datapages::error::PageError;

#[test]
fn resolves_shorthand_and_detailed_species() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("datapages.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "data_root": "site/data",
            "species": [
                "Staphylococcus aureus",
                { "text": "Human", "url": "https://example.org/data/human.json" }
            ],
            "project_column": "Project"
        }"#,
    )
    .unwrap();

    let config = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(
        config.species,
        vec![
            SpeciesLink {
                text: "Staphylococcus aureus".to_string(),
                url: "site/data/staphylococcus_aureus.json".to_string(),
            },
            SpeciesLink {
                text: "Human".to_string(),
                url: "https://example.org/data/human.json".to_string(),
            },
        ]
    );
    assert_eq!(config.project_column, "Project");
    assert_eq!(config.record_url_template, DEFAULT_RECORD_URL_TEMPLATE);
}

#[test]
fn empty_config_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("datapages.json");
    fs::write(&path, "{}").unwrap();

    let config = ConfigLoader::resolve(path.to_str()).unwrap();
    assert!(config.species.is_empty());
    assert_eq!(config.data_root, "data");
    assert_eq!(config.project_column, DEFAULT_PROJECT_COLUMN);
    assert_eq!(config.schema_version, 1);
}

#[test]
fn explicit_missing_path_is_a_read_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, PageError::ConfigRead(read) if read == path);
}

#[test]
fn malformed_config_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("datapages.json");
    fs::write(&path, r#"{ "species": [ 42 ] }"#).unwrap();

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, PageError::ConfigParse(_));
}

#[test]
fn blank_species_text_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("datapages.json");
    fs::write(&path, r#"{ "species": [ { "text": "  ", "url": "x.json" } ] }"#).unwrap();

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, PageError::ConfigParse(message) if message.contains("x.json"));
}
