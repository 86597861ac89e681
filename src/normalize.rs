//! Translation of raw HTTP results into parsed JSON or a typed error.

use serde_json::Value;
use tracing::debug;

use crate::error::{FacadeError, Result};

const SUCCESS_STATUSES: [u16; 2] = [200, 204];

/// Turn a status code and body into parsed data.
///
/// On 200/204 the body is parsed; anything that is not a JSON object or
/// array yields `Ok(None)`. Any other status is an error whose message is
/// taken from the body's `error` field, then `critical`, then a fixed
/// fallback.
pub fn normalize(status: u16, body: &[u8]) -> Result<Option<Value>> {
    let parsed = parse_body(body);

    if SUCCESS_STATUSES.contains(&status) {
        return Ok(parsed);
    }

    debug!(status, "Server returned an error status");

    let message = parsed
        .as_ref()
        .and_then(|data| message_field(data, "error").or_else(|| message_field(data, "critical")));

    Err(match message {
        Some(message) => FacadeError::Server { message, status },
        None => FacadeError::Unclassified { status },
    })
}

fn parse_body(body: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

fn message_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
