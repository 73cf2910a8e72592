use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ordertrack_core::config::{resolve_config_path, AppConfig};
use toml::Value;

use crate::commands::CommandResult;

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> CommandResult {
    CommandResult::success("config", render(config, explicit_path))
}

pub fn render(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path: Option<PathBuf> = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["ORDERTRACK_LOGGING_LEVEL", "ORDERTRACK_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["ORDERTRACK_LOGGING_FORMAT", "ORDERTRACK_LOG_FORMAT"]),
    ));
    lines.push(render_line(
        "timeline.date_format",
        &config.timeline.date_format,
        source("timeline.date_format", &["ORDERTRACK_TIMELINE_DATE_FORMAT"]),
    ));
    lines.push(render_line(
        "timeline.rejection_fallback",
        &config.timeline.rejection_fallback,
        source("timeline.rejection_fallback", &["ORDERTRACK_TIMELINE_REJECTION_FALLBACK"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
