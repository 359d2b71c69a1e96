use std::fs;

use memfo::{clamp_poll_secs, FieldConfig, MemfoError, Placement};

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memfo").join("memfo.json");

    let config = FieldConfig::load_or_create(&path);
    assert!(path.exists());
    assert!(!config.is_dirty());
    assert_eq!(config.placement("MemTotal"), Placement::Frozen);
    assert_eq!(config.placement("Active(file)"), Placement::Hidden);
    assert_eq!(config.placement("Cached"), Placement::Body);

    let reloaded = FieldConfig::load(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn invalid_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(FieldConfig::load(&path).is_err());
    let config = FieldConfig::load_or_create(&path);
    assert_eq!(config, FieldConfig::default());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn partial_file_takes_missing_sections_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(&path, r#"{ "hidden": ["Bounce"] }"#).unwrap();

    let config = FieldConfig::load(&path).unwrap();
    assert_eq!(config.placement("MemTotal"), Placement::Frozen);
    assert_eq!(config.placement("Bounce"), Placement::Hidden);
    assert_eq!(config.placement("KernelStack"), Placement::Body);
}

#[test]
fn commit_writes_only_when_dirty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let mut config = FieldConfig::empty();
    assert!(!config.commit(&path).unwrap());
    assert!(!path.exists());

    config.freeze("Cached");
    config.hide("Cached");
    assert_eq!(config.placement("Cached"), Placement::Hidden);
    config.freeze("Dirty");
    assert!(config.commit(&path).unwrap());
    assert!(!config.commit(&path).unwrap());

    let reloaded = FieldConfig::load(&path).unwrap();
    assert_eq!(reloaded.placement("Cached"), Placement::Hidden);
    assert_eq!(reloaded.placement("Dirty"), Placement::Frozen);

    config.reset_all();
    assert!(config.is_dirty());
    assert_eq!(config.placement("Dirty"), Placement::Body);
}

#[test]
fn poll_period_is_clamped() {
    assert_eq!(clamp_poll_secs(0.1), 0.5);
    assert_eq!(clamp_poll_secs(2.0), 2.0);
    assert_eq!(clamp_poll_secs(1e9), 3600.0);
    assert_eq!(clamp_poll_secs(f64::NAN), 1.0);
}

#[test]
fn load_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match FieldConfig::load(&path) {
        Err(err @ MemfoError::File { .. }) => {
            let text = err.to_string();
            assert!(text.starts_with("reading config '"));
            assert!(text.contains("absent.json"));
            assert!(err.io_source().is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
}
