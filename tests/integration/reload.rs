//! Integration tests for reload-on-change with files on disk.

use super::test_utils::write_file;
use appsettings::config::{Configuration, ConfigurationBuilder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Poll until `check` passes or the timeout expires.
fn wait_for(configuration: &Configuration, check: impl Fn(&Configuration) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if check(configuration) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    check(configuration)
}

fn build(dir: &TempDir, reload: bool) -> Configuration {
    let mut builder = ConfigurationBuilder::new();
    builder
        .set_base_path(dir.path())
        .add_json_file("appsettings.json", true, reload);
    builder.build().unwrap()
}

#[test]
fn test_edit_triggers_reload() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", r#"{ "mode": "initial" }"#);
    let configuration = build(&dir, true);
    assert!(configuration.is_watching());
    assert_eq!(configuration.get_string("mode").unwrap(), "initial");

    let notified = Arc::new(AtomicU64::new(0));
    let notified_in_callback = notified.clone();
    configuration.on_reload(move |_| {
        notified_in_callback.fetch_add(1, Ordering::SeqCst);
    });

    write_file(dir.path(), "appsettings.json", r#"{ "mode": "edited" }"#);
    assert!(wait_for(&configuration, |c| {
        c.get_string("mode").map(|m| m == "edited").unwrap_or(false)
    }));
    assert!(configuration.generation() >= 1);
    assert!(notified.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_file_created_after_build_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let configuration = build(&dir, true);
    assert!(configuration.try_get::<String>("mode").unwrap().is_none());

    write_file(dir.path(), "appsettings.json", r#"{ "mode": "created" }"#);
    assert!(wait_for(&configuration, |c| {
        c.try_get::<String>("mode").ok().flatten().as_deref() == Some("created")
    }));
}

#[test]
fn test_without_reload_files_load_once() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", r#"{ "mode": "initial" }"#);
    let configuration = build(&dir, false);
    assert!(!configuration.is_watching());

    write_file(dir.path(), "appsettings.json", r#"{ "mode": "edited" }"#);
    std::thread::sleep(Duration::from_millis(600));
    assert_eq!(configuration.get_string("mode").unwrap(), "initial");
    assert_eq!(configuration.generation(), 0);

    configuration.reload().unwrap();
    assert_eq!(configuration.get_string("mode").unwrap(), "edited");
}

#[test]
fn test_unrelated_file_does_not_reload() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", r#"{ "mode": "initial" }"#);
    let configuration = build(&dir, true);

    write_file(dir.path(), "notes.txt", "not configuration");
    std::thread::sleep(Duration::from_millis(800));
    assert_eq!(configuration.generation(), 0);
}
