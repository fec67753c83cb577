//! Integration tests for `ConfigurationBuilder::add_default` against the real
//! process environment.

use super::test_utils::{with_env, write_file};
use appsettings::config::{ConfigSource, ConfigurationBuilder};
use appsettings::file_provider::{FileProvider, InMemoryFileProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const NO_ARGS: &[&str] = &[];

fn kinds(builder: &ConfigurationBuilder) -> Vec<&'static str> {
    builder.sources().iter().map(ConfigSource::kind).collect()
}

fn json_paths(builder: &ConfigurationBuilder) -> Vec<PathBuf> {
    builder
        .sources()
        .iter()
        .filter_map(ConfigSource::as_json_file)
        .map(|s| s.path.clone())
        .collect()
}

#[test]
fn test_returns_same_builder_for_chaining() {
    with_env(&[], || {
        let mut builder = ConfigurationBuilder::new();
        let before: *const ConfigurationBuilder = &builder;
        let returned = builder.add_default(None, NO_ARGS, true).unwrap();
        assert!(std::ptr::eq(returned, before));

        returned.add_json_file("extra.json", true, false);
        assert_eq!(builder.sources().len(), 4);
    });
}

#[test]
fn test_without_environment() {
    with_env(&[], || {
        let mut builder = ConfigurationBuilder::new();
        builder.add_default(None, NO_ARGS, true).unwrap();
        assert_eq!(kinds(&builder), vec!["json", "environment", "command-line"]);
        assert_eq!(json_paths(&builder), vec![PathBuf::from("appsettings.json")]);
    });
}

#[test]
fn test_blank_environment_is_no_environment() {
    with_env(&[("DOTNET_ENVIRONMENT", Some("   "))], || {
        let mut builder = ConfigurationBuilder::new();
        builder.add_default(None, NO_ARGS, true).unwrap();
        assert_eq!(json_paths(&builder).len(), 1);
    });
}

#[test]
fn test_environment_priority_and_trimming() {
    with_env(
        &[
            ("DOTNET_ENVIRONMENT", Some("  Staging  ")),
            ("ASPNETCORE_ENVIRONMENT", Some("Production")),
        ],
        || {
            let mut builder = ConfigurationBuilder::new();
            builder.add_default(None, NO_ARGS, true).unwrap();
            assert_eq!(
                json_paths(&builder),
                vec![
                    PathBuf::from("appsettings.json"),
                    PathBuf::from("appsettings.Staging.json")
                ]
            );
        },
    );
}

#[test]
fn test_web_host_environment_alone() {
    with_env(&[("ASPNETCORE_ENVIRONMENT", Some("Production"))], || {
        let mut builder = ConfigurationBuilder::new();
        builder.add_default(Some("my-app"), NO_ARGS, true).unwrap();
        assert_eq!(json_paths(&builder)[1], PathBuf::from("appsettings.Production.json"));
        assert!(builder.sources().iter().all(|s| s.as_user_secrets().is_none()));
    });
}

#[test]
fn test_development_registers_user_secrets() {
    let secrets_root = TempDir::new().unwrap();
    let root = secrets_root.path().to_string_lossy().to_string();
    with_env(
        &[
            ("DOTNET_ENVIRONMENT", Some("DEVELOPMENT")),
            ("USER_SECRETS_DIR", Some(root.as_str())),
        ],
        || {
            let mut builder = ConfigurationBuilder::new();
            builder.add_default(Some("my-app"), NO_ARGS, false).unwrap();
            assert_eq!(
                kinds(&builder),
                vec!["json", "json", "user-secrets", "environment", "command-line"]
            );
            let secrets = builder.sources()[2].as_user_secrets().unwrap();
            assert_eq!(
                secrets.path,
                secrets_root.path().join("my-app").join("secrets.json")
            );
            assert!(!secrets.reload_on_change);
        },
    );
}

#[test]
fn test_development_without_secrets_id_is_skipped() {
    with_env(&[("DOTNET_ENVIRONMENT", Some("Development"))], || {
        let mut builder = ConfigurationBuilder::new();
        builder.add_default(None, NO_ARGS, true).unwrap();
        assert_eq!(
            kinds(&builder),
            vec!["json", "json", "environment", "command-line"]
        );
    });
}

#[test]
fn test_development_with_invalid_secrets_id_fails() {
    with_env(&[("DOTNET_ENVIRONMENT", Some("Development"))], || {
        let mut builder = ConfigurationBuilder::new();
        assert!(builder.add_default(Some("../escape"), NO_ARGS, true).is_err());
    });
}

#[test]
fn test_reload_flag_on_every_json_source() {
    with_env(&[("DOTNET_ENVIRONMENT", Some("Staging"))], || {
        for reload in [true, false] {
            let mut builder = ConfigurationBuilder::new();
            builder.add_default(None, NO_ARGS, reload).unwrap();
            for source in builder.sources().iter().filter_map(ConfigSource::as_json_file) {
                assert_eq!(source.reload_on_change, reload);
                assert!(source.optional);
            }
        }
    });
}

#[test]
fn test_file_provider_shared_by_json_sources() {
    with_env(&[("DOTNET_ENVIRONMENT", Some("Staging"))], || {
        let files: Arc<dyn FileProvider> = Arc::new(InMemoryFileProvider::new());
        let mut builder = ConfigurationBuilder::new();
        builder
            .add_default_with_files(None, Arc::clone(&files), NO_ARGS, true)
            .unwrap();
        let json: Vec<_> = builder
            .sources()
            .iter()
            .filter_map(ConfigSource::as_json_file)
            .collect();
        assert_eq!(json.len(), 2);
        for source in json {
            assert!(Arc::ptr_eq(source.file_provider.as_ref().unwrap(), &files));
        }
    });
}

#[test]
fn test_environment_and_command_line_sources_last_and_once() {
    with_env(&[("DOTNET_ENVIRONMENT", Some("Staging"))], || {
        let mut builder = ConfigurationBuilder::new();
        builder.add_default(None, &["--a=1"], true).unwrap();
        let kinds = kinds(&builder);
        assert_eq!(kinds.iter().filter(|k| **k == "environment").count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "command-line").count(), 1);
        assert_eq!(&kinds[kinds.len() - 2..], &["environment", "command-line"]);
    });
}

#[test]
fn test_build_reads_files_from_base_path() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", r#"{ "greeting": "hello" }"#);
    write_file(dir.path(), "appsettings.Staging.json", r#"{ "greeting": "hello staging" }"#);

    with_env(&[("DOTNET_ENVIRONMENT", Some("Staging"))], || {
        let mut builder = ConfigurationBuilder::new();
        builder
            .set_base_path(dir.path())
            .add_default(None, NO_ARGS, false)
            .unwrap();
        let configuration = builder.build().unwrap();
        assert_eq!(configuration.get_string("greeting").unwrap(), "hello staging");
        assert!(!configuration.is_watching());
    });
}

#[test]
fn test_build_with_missing_files_succeeds() {
    let dir = TempDir::new().unwrap();
    with_env(&[], || {
        let mut builder = ConfigurationBuilder::new();
        builder
            .set_base_path(dir.path())
            .add_default(None, &["--only=args"], false)
            .unwrap();
        let configuration = builder.build().unwrap();
        assert_eq!(configuration.get_string("only").unwrap(), "args");
    });
}
