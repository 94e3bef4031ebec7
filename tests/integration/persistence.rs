//! Schema persistence across reopen

use crate::common::*;
use cairn::{Cairn, CairnConfig, Context, Kind, CONFIG_FILE_NAME, DEFAULT_SCHEMA_FILE};
use tempfile::TempDir;

#[test]
fn test_open_writes_default_config() {
    let dir = TempDir::new().unwrap();
    let cairn = Cairn::open(dir.path()).unwrap();

    assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    assert_eq!(
        cairn.schema_path(),
        Some(&dir.path().join(DEFAULT_SCHEMA_FILE))
    );
    assert_eq!(cairn.config().search, CairnConfig::default().search);
}

#[test]
fn test_schema_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut config = CairnConfig::default();
    config.schema.path = Some(dir.path().join("schema.json"));

    {
        let cairn = Cairn::with_transport(config.clone(), FakeBackend::new()).unwrap();
        cairn.add_thing(&Context::background(), None, city()).unwrap();
    }

    let reopened = Cairn::with_transport(config, FakeBackend::new()).unwrap();
    let (kind, class) = reopened.schema().get_class("City").unwrap();
    assert_eq!(kind, Kind::Thing);
    assert_eq!(class.properties.len(), 2);
}

#[test]
fn test_relative_schema_path_resolves_against_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[schema]\npath = \"state/schema.json\"\n",
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join("state")).unwrap();

    let cairn = Cairn::open(dir.path()).unwrap();
    assert_eq!(
        cairn.schema_path(),
        Some(&dir.path().join("state/schema.json"))
    );
}

#[test]
fn test_invalid_config_file_fails_open() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[search]\ndefault_limit = 0\n").unwrap();

    assert!(matches!(
        Cairn::open(dir.path()),
        Err(cairn::Error::InvalidConfig { .. })
    ));
}
