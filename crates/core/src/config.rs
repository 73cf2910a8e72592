use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeline::steps::{TimelineOptions, DEFAULT_DATE_FORMAT, DEFAULT_REJECTION_FALLBACK};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["ordertrack.toml", "config/ordertrack.toml"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub timeline: TimelineConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineConfig {
    pub date_format: String,
    pub rejection_fallback: String,
}

impl TimelineConfig {
    pub fn options(&self) -> TimelineOptions {
        TimelineOptions {
            date_format: self.date_format.clone(),
            rejection_fallback: self.rejection_fallback.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub date_format: Option<String>,
    pub rejection_fallback: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            timeline: TimelineConfig {
                date_format: DEFAULT_DATE_FORMAT.to_string(),
                rejection_fallback: DEFAULT_REJECTION_FALLBACK.to_string(),
            },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options
                .config_path
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(timeline) = patch.timeline {
            if let Some(date_format) = timeline.date_format {
                self.timeline.date_format = date_format;
            }
            if let Some(rejection_fallback) = timeline.rejection_fallback {
                self.timeline.rejection_fallback = rejection_fallback;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let log_level =
            read_env("ORDERTRACK_LOGGING_LEVEL").or_else(|| read_env("ORDERTRACK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ORDERTRACK_LOGGING_FORMAT").or_else(|| read_env("ORDERTRACK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("ORDERTRACK_TIMELINE_DATE_FORMAT") {
            self.timeline.date_format = value;
        }
        if let Some(value) = read_env("ORDERTRACK_TIMELINE_REJECTION_FALLBACK") {
            self.timeline.rejection_fallback = value;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(date_format) = overrides.date_format {
            self.timeline.date_format = date_format;
        }
        if let Some(rejection_fallback) = overrides.rejection_fallback {
            self.timeline.rejection_fallback = rejection_fallback;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_logging(&self.logging)?;
        validate_timeline(&self.timeline)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_timeline(timeline: &TimelineConfig) -> Result<(), ConfigError> {
    if timeline.date_format.trim().is_empty() {
        return Err(ConfigError::Validation("timeline.date_format must not be empty".to_string()));
    }

    if StrftimeItems::new(&timeline.date_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Validation(format!(
            "timeline.date_format `{}` is not a valid strftime pattern",
            timeline.date_format
        )));
    }

    if timeline.rejection_fallback.trim().is_empty() {
        return Err(ConfigError::Validation(
            "timeline.rejection_fallback must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    logging: Option<LoggingPatch>,
    timeline: Option<TimelinePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct TimelinePatch {
    date_format: Option<String>,
    rejection_fallback: Option<String>,
}
