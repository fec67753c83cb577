//! Property-based tests for environment resolution, argument parsing and layering order

use appsettings::config::{
    CommandLineSource, ConfigSource, ConfigurationBuilder, DefaultLayers, BASE_SETTINGS_FILE,
};
use appsettings::environment::{
    resolve_environment_name, StaticEnvironment, GENERIC_HOST_ENVIRONMENT, WEB_HOST_ENVIRONMENT,
};
use appsettings::error::ConfigurationError;
use appsettings::file_provider::InMemoryFileProvider;
use appsettings::secrets::{SecretsLookup, SecretsStore};
use proptest::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Store that reports secrets as never configured.
struct NoSecrets;

impl SecretsStore for NoSecrets {
    fn locate(&self, _secrets_id: Option<&str>) -> Result<SecretsLookup, ConfigurationError> {
        Ok(SecretsLookup::NotConfigured)
    }
}

fn padding() -> impl Strategy<Value = String> {
    "[ \t]{0,3}"
}

proptest! {
    /// Surrounding whitespace never changes the resolved name
    #[test]
    fn prop_environment_name_trimmed(
        name in "[A-Za-z][A-Za-z0-9]{0,12}",
        left in padding(),
        right in padding(),
    ) {
        let env = StaticEnvironment::new()
            .with(GENERIC_HOST_ENVIRONMENT, format!("{}{}{}", left, name, right));
        let resolved = resolve_environment_name(&env).unwrap();
        prop_assert_eq!(resolved.as_str(), name.as_str());
    }

    /// The generic host variable wins whenever it is non-blank
    #[test]
    fn prop_generic_host_wins(
        generic in "[A-Za-z]{1,10}",
        web in "[A-Za-z]{1,10}",
    ) {
        let env = StaticEnvironment::new()
            .with(GENERIC_HOST_ENVIRONMENT, generic.clone())
            .with(WEB_HOST_ENVIRONMENT, web);
        let resolved = resolve_environment_name(&env).unwrap();
        prop_assert_eq!(resolved.as_str(), generic.as_str());
    }

    /// `--key=value` and `--key value` yield the same pair
    #[test]
    fn prop_inline_and_separate_forms_agree(
        key in "[a-z][a-z0-9]{0,10}",
        value in "[^\\s]{0,20}",
    ) {
        let inline = CommandLineSource::new([format!("--{}={}", key, value)]).parse().unwrap();
        let separate = CommandLineSource::new([format!("--{}", key), value.clone()]).parse().unwrap();
        prop_assert_eq!(&inline, &separate);
        prop_assert_eq!(inline, vec![(key, value)]);
    }

    /// Whatever the environment, JSON sources come first and the
    /// environment and command-line sources come last, once each
    #[test]
    fn prop_layer_order(name in proptest::option::of("[A-Za-z]{1,12}"), reload in any::<bool>()) {
        let mut env = StaticEnvironment::new();
        if let Some(name) = &name {
            env = env.with(GENERIC_HOST_ENVIRONMENT, name.clone());
        }

        let mut builder = ConfigurationBuilder::new();
        DefaultLayers::new()
            .reload_on_change(reload)
            .apply(&mut builder, &env, &NoSecrets)
            .unwrap();

        let sources = builder.sources();
        let expected_json = if name.is_some() { 2 } else { 1 };
        prop_assert_eq!(sources.len(), expected_json + 2);

        let json: Vec<_> = sources.iter().filter_map(ConfigSource::as_json_file).collect();
        prop_assert_eq!(json.len(), expected_json);
        prop_assert_eq!(&json[0].path, &PathBuf::from(BASE_SETTINGS_FILE));
        if let Some(name) = &name {
            prop_assert_eq!(&json[1].path, &PathBuf::from(format!("appsettings.{}.json", name)));
        }
        prop_assert!(json.iter().all(|s| s.reload_on_change == reload));
        prop_assert_eq!(sources[sources.len() - 2].kind(), "environment");
        prop_assert_eq!(sources[sources.len() - 1].kind(), "command-line");
    }

    /// The command line replaces a JSON value at the same key, whatever dots
    /// the section names contain
    #[test]
    fn prop_command_line_overrides_json_at_same_key(
        sections in proptest::collection::vec("[A-Za-z][A-Za-z0-9.]{0,8}", 1..4),
        from_file in "[a-z]{1,8}",
        from_args in "[A-Z]{1,8}",
    ) {
        let mut document = serde_json::Value::String(from_file.clone());
        for section in sections.iter().rev() {
            let mut object = serde_json::Map::new();
            object.insert(section.clone(), document);
            document = serde_json::Value::Object(object);
        }
        let files = Arc::new(
            InMemoryFileProvider::new().with_file("appsettings.json", document.to_string()),
        );
        let key = sections.join(":");

        let mut builder = ConfigurationBuilder::new();
        builder
            .set_file_provider(files)
            .add_json_file("appsettings.json", false, false);
        prop_assert_eq!(builder.build().unwrap().get_string(&key).unwrap(), from_file);

        builder.add_command_line([format!("--{}={}", key, from_args)]);
        prop_assert_eq!(builder.build().unwrap().get_string(&key).unwrap(), from_args);
    }
}
