//! Demo operation catalog: tools, resources and prompts.
//!
//! Handlers never record telemetry themselves except for stream events; the
//! dispatcher records the request before calling them and the response after.

pub mod calc;
pub mod error;
pub mod prompts;
pub mod resources;
pub mod tools;

use serde_json::{Map, Value};

pub use error::OperationError;

pub type Arguments = Map<String, Value>;

pub(crate) fn opt_i64(args: &Arguments, key: &str) -> Result<Option<i64>, OperationError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| OperationError::invalid(key, "expected an integer")),
    }
}

pub(crate) fn opt_u64(args: &Arguments, key: &str) -> Result<Option<u64>, OperationError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| OperationError::invalid(key, "expected a non-negative integer")),
    }
}

pub(crate) fn opt_str<'a>(
    args: &'a Arguments,
    key: &str,
) -> Result<Option<&'a str>, OperationError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| OperationError::invalid(key, "expected a string")),
    }
}
