use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use ordertrack_cli::commands::{badge, config, price, resolve};
use ordertrack_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use serde_json::Value;
use tempfile::TempDir;

const PENDING_ORDER: &str = r#"{
    "id": "ORD-77",
    "status": "pending",
    "created_at": "2024-04-02T08:00:00Z",
    "approvals": [
        {"approver_role": "ceo", "approved_at": "2024-04-03T09:00:00Z"},
        {"approver_role": "finance", "approved_at": null}
    ]
}"#;

const AWAITING_PAYMENT_ORDER: &str = r#"{
    "status": "completed",
    "executionStage": "awaiting_payment",
    "createdAt": "2024-04-02T08:00:00Z",
    "executionStartDate": "2024-04-10T06:00:00Z",
    "executionEndDate": "2024-04-12T16:00:00Z"
}"#;

#[test]
fn resolve_emits_timeline_json() {
    let fixture = Fixture::new();
    let path = fixture.write("order.json", PENDING_ORDER);

    let result = resolve::run(&AppConfig::default(), &path, false);
    assert_eq!(result.exit_code, 0, "expected successful resolve: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["stage_number"], 0);
    assert_eq!(payload["steps"].as_array().map(Vec::len), Some(10));
    assert_eq!(payload["current_step"]["status_key"], "pending");
    assert_eq!(payload["current_step"]["details"], "1 of 2 approvers confirmed");
    assert_eq!(payload["badge_label"], "Pending approval");
}

#[test]
fn resolve_applies_configured_date_format() {
    let fixture = Fixture::new();
    let path = fixture.write("order.json", AWAITING_PAYMENT_ORDER);
    let config = AppConfig::load(LoadOptions {
        overrides: ConfigOverrides {
            date_format: Some("%Y-%m-%d".to_string()),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    })
    .expect("config with date override should load");

    let result = resolve::run(&config, &path, true);
    assert_eq!(result.exit_code, 0, "expected successful resolve: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["current_step"]["status_key"], "awaiting_payment");
    assert_eq!(payload["steps"][3]["details"], "2024-04-10 to 2024-04-12");
    assert_eq!(payload["badge_label"], "Awaiting payment");
}

#[test]
fn resolve_reports_missing_input_file() {
    let fixture = Fixture::new();
    let missing = fixture.path("absent.json");

    let result = resolve::run(&AppConfig::default(), &missing, false);
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "resolve");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "input_read");
}

#[test]
fn resolve_reports_malformed_snapshot() {
    let fixture = Fixture::new();
    let path = fixture.write("order.json", r#"{"status": "pending"}"#);

    let result = resolve::run(&AppConfig::default(), &path, false);
    assert_eq!(result.exit_code, 4);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "input_parse");
    assert!(payload["message"].as_str().unwrap_or_default().contains("created_at"));
}

#[test]
fn badge_prefers_execution_stage_wording() {
    let fixture = Fixture::new();
    let path = fixture.write("order.json", AWAITING_PAYMENT_ORDER);

    let result = badge::run(&path);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "badge");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["message"], "Awaiting payment");
}

#[test]
fn price_falls_back_to_double_encoded_notes() {
    let fixture = Fixture::new();
    let path = fixture.write(
        "price.json",
        r#"{"payment_amount": 0, "notes": "{\"calculated_price\": \"1840.00\", \"price\": 99}"}"#,
    );

    let result = price::run(&path);
    assert_eq!(result.exit_code, 0, "expected price resolution: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["source"], "notes_calculated_price");
    assert_eq!(payload["amount"], "1840.00");
}

#[test]
fn price_without_sources_is_not_an_error() {
    let fixture = Fixture::new();
    let path = fixture.write("price.json", r#"{"notes": {"comment": "call before delivery"}}"#);

    let result = price::run(&path);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "ok");
    assert!(payload["message"].as_str().unwrap_or_default().contains("no positive amount"));
}

#[test]
fn price_keeps_payment_amount_when_notes_fields_drift() {
    let fixture = Fixture::new();
    let path = fixture.write(
        "price.json",
        r#"{"payment_amount": 500, "notes": {"price": "", "rental_days": "21", "comment": "x"}}"#,
    );

    let result = price::run(&path);
    assert_eq!(result.exit_code, 0, "expected price resolution: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["source"], "payment_amount");
    assert_eq!(payload["amount"], "500");
}

#[test]
fn price_rejects_invalid_notes() {
    let fixture = Fixture::new();
    let path = fixture.write("price.json", r#"{"notes": [1, 2]}"#);

    let result = price::run(&path);
    assert_eq!(result.exit_code, 4);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "domain_validation");
}

#[test]
fn config_attributes_sources() {
    with_env(&[("ORDERTRACK_LOG_LEVEL", "debug")], || {
        let fixture = Fixture::new();
        let path = PathBuf::from(
            fixture.write("ordertrack.toml", "[timeline]\nrejection_fallback = \"From file\"\n"),
        );
        let config = AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        })
        .expect("config file should load");

        let result = config::run(&config, Some(path.as_path()));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("- logging.level = debug (source: env (ORDERTRACK_LOG_LEVEL))"));
        assert!(message.contains("- timeline.rejection_fallback = From file (source: file ("));
        assert!(message.contains("- timeline.date_format = %d.%m.%Y (source: default)"));
    });
}

#[test]
fn config_ignores_blank_env_overrides_in_attribution() {
    with_env(&[("ORDERTRACK_LOG_LEVEL", "   ")], || {
        let config = AppConfig::load(LoadOptions::default()).expect("defaults should load");
        assert_eq!(config.logging.level, "info");

        let result = config::run(&config, None);
        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("- logging.level = info (source: default)"), "{message}");
    });
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self { dir: TempDir::new().expect("temp dir should be created") }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("fixture should be written");
        path.display().to_string()
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "ORDERTRACK_LOGGING_LEVEL",
        "ORDERTRACK_LOGGING_FORMAT",
        "ORDERTRACK_LOG_LEVEL",
        "ORDERTRACK_LOG_FORMAT",
        "ORDERTRACK_TIMELINE_DATE_FORMAT",
        "ORDERTRACK_TIMELINE_REJECTION_FALLBACK",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
