pub mod badge;
pub mod config;
pub mod price;
pub mod resolve;

use std::fs;
use std::io::{self, Read};

use ordertrack_core::{ApplicationError, OrderSnapshot};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }
}

/// Serializes a command's own payload; failures are reported as `serialization`.
pub(crate) fn render_payload<T: Serialize>(
    command: &str,
    payload: &T,
    pretty: bool,
) -> CommandResult {
    let rendered =
        if pretty { serde_json::to_string_pretty(payload) } else { serde_json::to_string(payload) };

    match rendered {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure(
            command,
            "serialization",
            format!("{command} serialization failed: {error}"),
            4,
        ),
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Reads a file path, or stdin when `input` is `-`.
pub(crate) fn read_input(input: &str) -> Result<String, ApplicationError> {
    let read_error = |error: io::Error| ApplicationError::InputRead {
        source_name: input.to_string(),
        message: error.to_string(),
    };

    if input == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).map_err(read_error)?;
        return Ok(raw);
    }

    fs::read_to_string(input).map_err(read_error)
}

pub(crate) fn parse_json<T>(input: &str, raw: &str) -> Result<T, ApplicationError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(raw).map_err(|error| ApplicationError::InputParse {
        source_name: input.to_string(),
        message: error.to_string(),
    })
}

pub(crate) fn load_snapshot(input: &str) -> Result<OrderSnapshot, ApplicationError> {
    let raw = read_input(input)?;
    parse_json(input, &raw)
}

#[cfg(test)]
mod tests {
    use serde::ser::Error as _;
    use serde::{Serialize, Serializer};
    use serde_json::Value;

    use super::render_payload;

    struct Unrenderable;

    impl Serialize for Unrenderable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("value cannot be rendered"))
        }
    }

    #[test]
    fn render_failure_is_reported_as_serialization() {
        let result = render_payload("resolve", &Unrenderable, false);
        assert_eq!(result.exit_code, 4);

        let payload: Value = serde_json::from_str(&result.output).expect("outcome is JSON");
        assert_eq!(payload["command"], "resolve");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "serialization");
        assert!(payload["message"].as_str().unwrap_or_default().contains("value cannot be rendered"));
    }

    #[test]
    fn render_success_passes_payload_through() {
        let result = render_payload("price", &serde_json::json!({"amount": "10"}), false);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, r#"{"amount":"10"}"#);
    }
}
