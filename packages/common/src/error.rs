use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error namespaces shared by every quire crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Namespace {
    Document,
    History,
    Command,
    Event,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Document => "DOCUMENT",
            Namespace::History => "HISTORY",
            Namespace::Command => "COMMAND",
            Namespace::Event => "EVENT",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable error code, rendered as `NAMESPACE:NAME`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    pub namespace: Namespace,
    pub name: &'static str,
}

impl ErrorCode {
    pub const fn new(namespace: Namespace, name: &'static str) -> Self {
        Self { namespace, name }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// An error that carries a namespaced code and structured context
///
/// Implemented by every error enum in the workspace so callers at the
/// dispatch boundary can surface failures uniformly.
pub trait CodedError: std::error::Error {
    /// Namespaced machine-readable code
    fn code(&self) -> ErrorCode;

    /// Offending IDs / indices as a JSON object
    fn context(&self) -> Value;

    /// Build a serializable report for this error
    fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code().to_string(),
            message: self.to_string(),
            context: self.context(),
        }
    }
}

/// Serializable error envelope (code, message, context)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    pub context: Value,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
