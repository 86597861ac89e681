use chrono::DateTime;
use serde_json::{Map, Value};

use crate::error::{HydrationError, HydrationReason};
use crate::models::{Audit, Timestamp};

type Result<T> = std::result::Result<T, HydrationError>;

/// Field used in errors that concern the node as a whole.
pub(crate) const WHOLE_NODE: &str = "*";

/// Typed view over one JSON object being hydrated.
///
/// Every accessor reports failures against `entity` and the wire key.
pub(crate) struct Node<'a> {
    entity: &'static str,
    fields: &'a Map<String, Value>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(entity: &'static str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { entity, fields }),
            _ => Err(HydrationError::new(
                entity,
                WHOLE_NODE,
                HydrationReason::InvalidType { expected: "object" },
            )),
        }
    }

    pub(crate) fn error(&self, field: &'static str, reason: HydrationReason) -> HydrationError {
        HydrationError::new(self.entity, field, reason)
    }

    fn present(&self, key: &'static str) -> Option<&'a Value> {
        match self.fields.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn required(&self, key: &'static str) -> Result<&'a Value> {
        self.present(key)
            .ok_or_else(|| self.error(key, HydrationReason::Missing))
    }

    pub(crate) fn string(&self, key: &'static str) -> Result<String> {
        let value = self.required(key)?;
        self.as_string(key, value)
    }

    pub(crate) fn opt_string(&self, key: &'static str) -> Result<Option<String>> {
        self.present(key)
            .map(|value| self.as_string(key, value))
            .transpose()
    }

    fn as_string(&self, key: &'static str, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(key, HydrationReason::InvalidType { expected: "string" }))
    }

    pub(crate) fn int(&self, key: &'static str) -> Result<i64> {
        let value = self.required(key)?;
        self.as_int(key, value)
    }

    pub(crate) fn opt_int(&self, key: &'static str) -> Result<Option<i64>> {
        self.present(key).map(|value| self.as_int(key, value)).transpose()
    }

    /// Integers may arrive as numbers or numeric strings.
    fn as_int(&self, key: &'static str, value: &Value) -> Result<i64> {
        let parsed = match value {
            Value::Number(number) => number.as_i64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.error(key, HydrationReason::InvalidType { expected: "integer" }))
    }

    pub(crate) fn bool(&self, key: &'static str) -> Result<bool> {
        self.required(key)?
            .as_bool()
            .ok_or_else(|| self.error(key, HydrationReason::InvalidType { expected: "boolean" }))
    }

    pub(crate) fn timestamp(&self, key: &'static str) -> Result<Timestamp> {
        let raw = self
            .required(key)?
            .as_str()
            .ok_or_else(|| self.error(key, HydrationReason::InvalidType { expected: "timestamp" }))?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .map_err(|_| self.error(key, HydrationReason::InvalidTimestamp(raw.to_string())))
    }

    pub(crate) fn audit(&self) -> Result<Audit> {
        Ok(Audit {
            created_by: self.string("created_by")?,
            created_at: self.timestamp("created_at")?,
            edited_by: self.string("edited_by")?,
            updated_at: self.timestamp("updated_at")?,
        })
    }

    /// Elements of a collection; absent, null and `[]` are all empty.
    pub(crate) fn list(&self, key: &'static str) -> Result<&'a [Value]> {
        match self.present(key) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(self.error(key, HydrationReason::InvalidType { expected: "array" })),
        }
    }

    /// A nested object, or `None` when absent, null or empty.
    pub(crate) fn child(&self, key: &'static str) -> Result<Option<&'a Value>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(value @ Value::Object(_)) => Ok(Some(value)),
            Some(_) => Err(self.error(key, HydrationReason::InvalidType { expected: "object" })),
        }
    }
}
