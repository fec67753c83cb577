//! CLI output: text and json formatters for configuration values and sources.

use crate::config::{ConfigSource, KEY_DELIMITER};
use crate::error::ConfigurationError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::{json, Value};

/// Map errors to a string for CLI output.
pub fn map_error(e: &ConfigurationError) -> String {
    e.to_string()
}

/// Flatten a value into sorted `section:key = value` lines. A scalar without a
/// key prints bare.
pub fn format_value_text(prefix: Option<&str>, value: &Value) -> String {
    let mut lines = Vec::new();
    flatten(prefix.unwrap_or_default(), value, &mut lines);
    lines.sort();
    lines.join("\n")
}

fn flatten(prefix: &str, value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&join_key(prefix, key), child, lines);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&join_key(prefix, &index.to_string()), child, lines);
            }
        }
        scalar => {
            let rendered = match scalar {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            if prefix.is_empty() {
                lines.push(rendered);
            } else {
                lines.push(format!("{} = {}", prefix, rendered));
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_DELIMITER, key)
    }
}

pub fn format_value_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Table of sources in precedence order.
pub fn format_sources_text(sources: &[ConfigSource]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Kind", "Source", "Optional", "Reload"]);
    for (index, source) in sources.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            source.kind().to_string(),
            source.describe(),
            yes_no(source.is_optional()).to_string(),
            yes_no(source.reload_on_change()).to_string(),
        ]);
    }
    format!("{}\nLater sources override earlier ones.", table)
}

pub fn format_sources_json(sources: &[ConfigSource]) -> String {
    let entries: Vec<Value> = sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            json!({
                "position": index + 1,
                "kind": source.kind(),
                "source": source.describe(),
                "optional": source.is_optional(),
                "reload_on_change": source.reload_on_change(),
            })
        })
        .collect();
    format_value_json(&Value::Array(entries))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
