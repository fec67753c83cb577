//! Integration tests for the appsettings binary.

use super::test_utils::write_file;
use std::process::Command;
use tempfile::TempDir;

fn appsettings(dir: &TempDir) -> Command {
    let bin = env!("CARGO_BIN_EXE_appsettings");
    let mut command = Command::new(bin);
    command
        .env_remove("DOTNET_ENVIRONMENT")
        .env_remove("ASPNETCORE_ENVIRONMENT")
        .env_remove("APPSETTINGS_LOG")
        .env_remove("APPSETTINGS_LOG_FORMAT")
        .env_remove("APPSETTINGS_LOG_OUTPUT")
        .arg("--dir")
        .arg(dir.path())
        .arg("--no-reload");
    command
}

#[test]
fn test_show_key_with_forwarded_override() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", r#"{ "Server": { "Port": 80 } }"#);

    let output = appsettings(&dir)
        .args(["show", "--key", "Server:Port"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Server:Port = 80");

    let output = appsettings(&dir)
        .args(["show", "--key", "server:port", "--", "--server:port=9000"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "server:port = 9000");
}

#[test]
fn test_show_dotted_key_with_forwarded_override() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "appsettings.json",
        r#"{ "Logging": { "LogLevel": { "Microsoft.AspNetCore": "Warning" } } }"#,
    );

    let output = appsettings(&dir)
        .args(["show", "--key", "Logging:LogLevel"])
        .args(["--", "--Logging:LogLevel:Microsoft.AspNetCore=Error"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Logging:LogLevel:microsoft.aspnetcore = Error"
    );
}

#[test]
fn test_verbose_logs_composition_including_skipped_secrets() {
    let dir = TempDir::new().unwrap();
    let output = appsettings(&dir)
        .env("DOTNET_ENVIRONMENT", "Development")
        .args(["--verbose", "--log-output", "stderr", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Adding default configuration sources"), "{}", stderr);
    assert!(stderr.contains("Skipping user secrets"), "{}", stderr);
}

#[test]
fn test_show_uses_environment_file() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", r#"{ "stage": "base" }"#);
    write_file(dir.path(), "appsettings.Staging.json", r#"{ "stage": "staging" }"#);

    let output = appsettings(&dir)
        .env("DOTNET_ENVIRONMENT", "Staging")
        .args(["show", "--key", "stage", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "\"staging\"");
}

#[test]
fn test_sources_json_lists_default_layers() {
    let dir = TempDir::new().unwrap();
    let output = appsettings(&dir)
        .args(["sources", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let sources: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds: Vec<&str> = sources
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["json", "environment", "command-line"]);
}

#[test]
fn test_invalid_json_fails_with_message() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "appsettings.json", "{ nope");

    let output = appsettings(&dir).args(["show"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("appsettings.json"), "{}", stderr);
}
