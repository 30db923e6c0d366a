//! Error kinds surfaced by a tool invocation.
//!
//! `ValidationError` is always raised before anything is spawned;
//! `ExecError` comes out of the process runner. Output that is not JSON is
//! never an error (see `normalize`).

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required parameter: {field}")]
    MissingField { field: &'static str },

    #[error("{field} is required for {operation} operation")]
    RequiredFor {
        field: &'static str,
        operation: &'static str,
    },

    #[error("invalid {field}: {value}. Valid {noun}: {}", .valid.join(", "))]
    InvalidEnum {
        field: &'static str,
        value: String,
        noun: &'static str,
        valid: &'static [&'static str],
    },

    /// Rendered as a machine-readable JSON payload.
    #[error("{}", duplicate_target_payload(.target))]
    DuplicateNetworkTarget { target: String },
}

impl ValidationError {
    /// Structured form of the error, for callers that want fields instead of text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ValidationError::DuplicateNetworkTarget { target } => duplicate_target_json(target),
            ValidationError::MissingField { field } | ValidationError::RequiredFor { field, .. } => {
                serde_json::json!({
                    "error": "validation_error",
                    "type": "missing_required_field",
                    "field": field,
                    "message": self.to_string(),
                })
            }
            ValidationError::InvalidEnum {
                field, value, valid, ..
            } => serde_json::json!({
                "error": "validation_error",
                "type": "invalid_value",
                "field": field,
                "value": value,
                "valid": valid,
                "message": self.to_string(),
            }),
        }
    }
}

fn duplicate_target_json(target: &str) -> serde_json::Value {
    serde_json::json!({
        "error": "validation_error",
        "type": "duplicate_network_target",
        "target": target,
        "message": format!(
            "multiple source networks are mapped to target '{target}'; only 'ignored' may be used more than once"
        ),
    })
}

fn duplicate_target_payload(target: &str) -> String {
    duplicate_target_json(target).to_string()
}

/// Failure of an external command.
///
/// The `Display` texts keep the `<binary> error: <stderr>` and
/// `<binary> command failed: <cause>` forms; the variant carries the kind.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{binary} command failed: executable not found")]
    NotFound { binary: String },

    #[error("{binary} command failed: timed out after {:?}", .timeout)]
    Timeout { binary: String, timeout: Duration },

    #[error("{binary} error: {stderr}")]
    Stderr {
        binary: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{binary} command failed: {}", exit_description(.code))]
    NonZeroExit { binary: String, code: Option<i32> },

    #[error("{binary} command failed: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// Exit code, when the process ran and exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::Stderr { code, .. } | ExecError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "terminated by signal".to_string(),
    }
}

/// Anything that ends an invocation early.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecError),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {source}")]
    Arguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Unsupported(&'static str),
}
