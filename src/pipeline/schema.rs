//! Optional schema validation of envelope data.
//!
//! A failed validation is never an error for the caller: the original
//! envelope data is forwarded untouched with status `ERROR`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

use crate::pipeline::envelope::RawEnvelope;

/// Validation failure against a named schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{schema} validation failed: {message}")]
pub struct ValidationError {
    pub schema: &'static str,
    pub message: String,
}

/// A structural schema that turns envelope data into a typed value.
pub trait Schema: Send + Sync {
    type Output: Serialize + Send;

    /// Name used in descriptions and logs.
    fn name(&self) -> &'static str;

    fn validate(&self, data: &Value) -> Result<Self::Output, ValidationError>;
}

/// Schema backed by a serde type. Field types are checked strictly:
/// no number-to-string coercion happens.
pub struct SerdeSchema<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Schema for SerdeSchema<T>
where
    T: DeserializeOwned + Serialize + Send,
{
    type Output = T;

    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self, data: &Value) -> Result<T, ValidationError> {
        T::deserialize(data).map_err(|e| ValidationError {
            schema: self.name,
            message: e.to_string(),
        })
    }
}

/// Placeholder schema type for commands that never validate.
pub type NoSchema = SerdeSchema<Value>;

/// Validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Success,
    Error,
    Skipped,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Success => "SUCCESS",
            ValidationStatus::Error => "ERROR",
            ValidationStatus::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either the schema-typed value or the untouched envelope data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Typed(T),
    Raw(Value),
}

impl<T: Serialize> Payload<T> {
    /// JSON view of the payload.
    pub fn to_value(&self) -> Value {
        match self {
            Payload::Raw(value) => value.clone(),
            Payload::Typed(typed) => serde_json::to_value(typed)
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
        }
    }
}

/// Result of running the validator over exactly one envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedResult<T> {
    pub status: ValidationStatus,
    pub payload: Payload<T>,
    pub description: String,
}

impl<T> ValidatedResult<T> {
    /// Typed payload, present only on `SUCCESS`.
    pub fn typed(&self) -> Option<&T> {
        match &self.payload {
            Payload::Typed(typed) => Some(typed),
            Payload::Raw(_) => None,
        }
    }
}

/// Validate envelope data against an optional schema.
pub fn validate<S: Schema>(envelope: &RawEnvelope, schema: Option<&S>) -> ValidatedResult<S::Output> {
    let Some(schema) = schema else {
        return ValidatedResult {
            status: ValidationStatus::Skipped,
            payload: Payload::Raw(envelope.data.clone()),
            description: "no schema provided".to_string(),
        };
    };

    match schema.validate(&envelope.data) {
        Ok(typed) => ValidatedResult {
            status: ValidationStatus::Success,
            payload: Payload::Typed(typed),
            description: format!("validated against {}", schema.name()),
        },
        Err(err) => {
            tracing::warn!(
                schema = schema.name(),
                url = %envelope.url,
                error = %err,
                "Schema validation failed, forwarding raw data"
            );
            ValidatedResult {
                status: ValidationStatus::Error,
                payload: Payload::Raw(envelope.data.clone()),
                description: err.to_string(),
            }
        }
    }
}
