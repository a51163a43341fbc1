use mirror_fs::{ConfigStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestSettings {
    state: String,
    throttle: i32,
}

#[rstest]
#[case("settings.toml", "state = \"root\"\nthrottle = 4")]
#[case("settings.json", r#"{"state": "root", "throttle": 4}"#)]
#[case("settings.yaml", "state: root\nthrottle: 4")]
#[case("settings.yml", "state: root\nthrottle: 4")]
fn test_load_by_extension(#[case] file_name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(file_name);
    fs::write(&file_path, content).unwrap();

    let loaded: TestSettings = ConfigStore::new()
        .load(&NormalizedPath::new(&file_path))
        .unwrap();

    assert_eq!(
        loaded,
        TestSettings {
            state: "root".into(),
            throttle: 4
        }
    );
}

#[test]
fn test_load_into_untyped_map() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.toml");
    fs::write(&file_path, "MIRROR_STRICT_MODE = true\nMIRROR_THROTTLE_LIMIT = 3\n").unwrap();

    let map: BTreeMap<String, serde_json::Value> = ConfigStore::new()
        .load(&NormalizedPath::new(&file_path))
        .unwrap();

    assert_eq!(map["MIRROR_STRICT_MODE"], serde_json::json!(true));
    assert_eq!(map["MIRROR_THROTTLE_LIMIT"], serde_json::json!(3));
}

#[test]
fn test_save_then_load_toml() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(".mirror").join("config.toml"));
    let settings = TestSettings {
        state: "state".into(),
        throttle: 10,
    };

    let store = ConfigStore::new();
    store.save(&path, &settings).unwrap();
    let loaded: TestSettings = store.load(&path).unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_invalid_toml_reports_path_and_format() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("broken.toml");
    fs::write(&file_path, "state = ").unwrap();

    let err = ConfigStore::new()
        .load::<TestSettings>(&NormalizedPath::new(&file_path))
        .unwrap_err();

    match err {
        Error::ConfigParse { format, path, .. } => {
            assert_eq!(format, "TOML");
            assert_eq!(path, file_path);
        }
        other => panic!("expected ConfigParse, got {other:?}"),
    }
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.ini");
    fs::write(&file_path, "x=1").unwrap();

    let err = ConfigStore::new()
        .load::<TestSettings>(&NormalizedPath::new(&file_path))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { extension } if extension == "ini"));
}
