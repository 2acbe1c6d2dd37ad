use randexam_core::config::loader::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn loads_defaults_and_logging() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[defaults]
tries = 250
tolerance = 0.25
bank = "/srv/exams/bank"

[logging]
level = "debug"
file = "/tmp/randexam.log"
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path)).expect("should load");
    assert_eq!(rc.source.as_deref(), Some(cfg_path.as_path()));
    assert_eq!(rc.defaults.tries, Some(250));
    assert_eq!(rc.defaults.tolerance, Some(0.25));
    assert_eq!(rc.defaults.bank, Some(PathBuf::from("/srv/exams/bank")));
    assert_eq!(rc.logging.level, "debug");
    assert_eq!(rc.logging.file, Some(PathBuf::from("/tmp/randexam.log")));
}

#[test]
fn version_only_file_uses_builtin_values() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    write_file(&cfg_path, "version = 1\n");

    let rc = ConfigLoader::load(Some(&cfg_path)).expect("should load");
    assert_eq!(rc.defaults.tries, None);
    assert_eq!(rc.defaults.bank, None);
    assert_eq!(rc.logging.level, "info");
    assert_eq!(rc.logging.file_level, None);
}
