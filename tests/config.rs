use std::time::Duration;

use assert_matches::assert_matches;

use chembl_explorer::config::{
    ChemblSettings, Config, ConfigLoader, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE,
};
use chembl_explorer::error::ExplorerError;

#[test]
fn resolve_explicit_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("chembl-explorer.json");
    std::fs::write(
        &path,
        r#"{
  "schema_version": 1,
  "base_url": "http://localhost:8080/chembl/api/data/",
  "timeout_secs": 5,
  "page_size": 200,
  "max_records": 5000
}"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(
        resolved.chembl,
        ChemblSettings {
            base_url: "http://localhost:8080/chembl/api/data".to_string(),
            timeout: Duration::from_secs(5),
            page_size: 200,
            max_records: Some(5000),
        }
    );
}

#[test]
fn partial_config_keeps_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("partial.json");
    std::fs::write(&path, r#"{"timeout_secs": 90}"#).unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.chembl.base_url, DEFAULT_BASE_URL);
    assert_eq!(resolved.chembl.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(resolved.chembl.timeout, Duration::from_secs(90));
    assert_eq!(resolved.chembl.max_records, None);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, ExplorerError::ConfigRead(p) if p == path);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ \"page_size\": ").unwrap();

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, ExplorerError::ConfigParse(_));
}

#[test]
fn rejects_non_http_base_url() {
    let config = Config {
        base_url: Some("ftp://ftp.ebi.ac.uk/pub/databases/chembl".to_string()),
        ..Config::default()
    };
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, ExplorerError::InvalidConfig(_));
}

#[test]
fn rejects_zero_timeout_and_zero_cap() {
    let zero_timeout = Config {
        timeout_secs: Some(0),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(zero_timeout),
        Err(ExplorerError::InvalidConfig(_))
    );

    let zero_cap = Config {
        max_records: Some(0),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(zero_cap),
        Err(ExplorerError::InvalidConfig(_))
    );
}
