use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::DomainError;

pub const NOTES_SCHEMA_VERSION: u32 = 1;

/// Typed view of the free-form `notes` blob stored on an order.
///
/// Upstream writes this field from several clients, sometimes as an object
/// and sometimes as a JSON string holding the object. Only the fields below
/// are read; anything else is ignored. A field whose value has drifted to an
/// unusable type is dropped with a warning instead of failing the blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNotes {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub calculated_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub estimated_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub scaffold_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub area_sqm: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub rental_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub comment: Option<String>,
}

fn default_schema_version() -> u32 {
    NOTES_SCHEMA_VERSION
}

impl Default for OrderNotes {
    fn default() -> Self {
        Self {
            schema_version: NOTES_SCHEMA_VERSION,
            total_price: None,
            calculated_price: None,
            estimated_price: None,
            price: None,
            address: None,
            scaffold_type: None,
            area_sqm: None,
            rental_days: None,
            comment: None,
        }
    }
}

impl OrderNotes {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(raw)
            .map_err(|error| DomainError::InvalidNotes(format!("notes are not JSON: {error}")))?;
        Self::from_value(value)
    }

    /// Accepts an object, or a string holding an encoded object (one level).
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let value = match value {
            Value::Null => return Ok(Self::default()),
            Value::String(inner) if inner.trim().is_empty() => return Ok(Self::default()),
            Value::String(inner) => serde_json::from_str(&inner).map_err(|error| {
                DomainError::InvalidNotes(format!("encoded notes are not JSON: {error}"))
            })?,
            other => other,
        };

        if !value.is_object() {
            return Err(DomainError::InvalidNotes(format!(
                "notes must be a JSON object, got {}",
                json_kind(&value)
            )));
        }

        let notes: OrderNotes = serde_json::from_value(value)
            .map_err(|error| DomainError::InvalidNotes(error.to_string()))?;

        if notes.schema_version > NOTES_SCHEMA_VERSION {
            return Err(DomainError::InvalidNotes(format!(
                "unsupported notes schema_version {} (max {NOTES_SCHEMA_VERSION})",
                notes.schema_version
            )));
        }

        Ok(notes)
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let parsed = match &value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(raw) if raw.trim().is_empty() => return Ok(None),
        Value::String(raw) => parse_decimal(raw.trim()),
        _ => None,
    };
    Ok(parsed.or_else(|| dropped_field(&value, "decimal")))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let parsed = match &value {
        Value::Number(number) => number.as_u64().and_then(|count| u32::try_from(count).ok()),
        Value::String(raw) if raw.trim().is_empty() => return Ok(None),
        Value::String(raw) => raw.trim().parse::<u32>().ok(),
        _ => None,
    };
    Ok(parsed.or_else(|| dropped_field(&value, "non-negative integer")))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    Ok(match value {
        Value::String(raw) if raw.trim().is_empty() => None,
        Value::String(raw) => Some(raw),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => dropped_field(&other, "text"),
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)).ok()
}

fn dropped_field<T>(value: &Value, expected: &str) -> Option<T> {
    warn!(
        event_name = "notes.field.dropped",
        expected,
        found = json_kind(value),
        value = %value,
        "ignoring notes field with unusable value"
    );
    None
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
