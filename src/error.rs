//! Failure taxonomy for a statusline pass and how each kind is recovered.
//!
//! Nothing here ever becomes a non-zero exit: every variant maps to a
//! [`Recovery`] that the pipeline or `main` applies locally.

use thiserror::Error;

use crate::utils::truncate_chars;

/// Longest error message shown on the status line
pub const ERROR_MESSAGE_CHARS: usize = 20;

#[derive(Debug, Error)]
pub enum StatuslineError {
    /// Nothing arrived on stdin
    #[error("no input")]
    InputAbsent,

    /// Stdin (or a log document) was not valid JSON for the expected shape
    #[error("malformed input: {0}")]
    Parse(#[from] serde_json::Error),

    /// Terminal, file-system or config-file lookups that failed
    #[error("{0}")]
    Environment(String),

    /// Anything else, including panics caught at the top level
    #[error("{0}")]
    Unexpected(String),
}

/// What the caller does with a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Print nothing
    Silent,
    /// Continue as if no usage data existed
    ZeroData,
    /// Continue with built-in defaults
    Defaults,
    /// Replace the whole output with this line
    StatusLine(String),
}

impl StatuslineError {
    pub fn environment(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Environment(format!("{context}: {err}"))
    }

    pub fn recovery(&self) -> Recovery {
        match self {
            Self::InputAbsent => Recovery::Silent,
            Self::Parse(_) => Recovery::ZeroData,
            Self::Environment(_) => Recovery::Defaults,
            Self::Unexpected(msg) => Recovery::StatusLine(error_line(msg)),
        }
    }

    /// Turn a caught panic payload into an `Unexpected` error
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic".to_string()
        };
        Self::Unexpected(msg)
    }
}

impl From<anyhow::Error> for StatuslineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(format!("{err:#}"))
    }
}

pub fn error_line(msg: &str) -> String {
    format!(
        "Claude Code (Error: {})",
        truncate_chars(msg.trim(), ERROR_MESSAGE_CHARS).trim_end()
    )
}
