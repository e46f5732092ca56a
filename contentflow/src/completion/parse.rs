//! Decoding of JSON payloads returned as completion content.
//!
//! Model output is untrusted. Anything that does not decode into the
//! expected shape becomes a [`CompletionError`], never a panic.

use crate::errors::CompletionError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Strips a surrounding markdown code fence (```` ```json ... ``` ````), if any.
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => {
            let inline = body.trim_start();
            inline.strip_prefix("json").unwrap_or(inline).trim()
        }
    }
}

/// Parses completion content as a single JSON object.
pub fn parse_object(content: &str) -> Result<Map<String, Value>, CompletionError> {
    let body = strip_code_fence(content);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CompletionError::InvalidJson(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
        Err(e) => Err(CompletionError::InvalidJson(e.to_string())),
    }
}

/// Removes `field` from `object` and decodes it as `T`.
pub fn take_field<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    field: &str,
) -> Result<T, CompletionError> {
    let value = object
        .remove(field)
        .ok_or_else(|| CompletionError::MissingField(field.to_string()))?;

    serde_json::from_value(value).map_err(|e| CompletionError::MalformedField {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Parses `content` and decodes its `field` in one step.
pub fn extract_field<T: DeserializeOwned>(content: &str, field: &str) -> Result<T, CompletionError> {
    let mut object = parse_object(content)?;
    take_field(&mut object, field)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
