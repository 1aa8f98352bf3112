//! The workspace error type.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and context carried by every [`McgtError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case code, stable across releases.
    pub code: String,
    /// What went wrong.
    pub message: String,
    /// Paths, row numbers, parameter names.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key = value`; later entries with the same key win.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Suggested fix shown after the message.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Error returned by every fallible operation in the workspace, grouped by family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum McgtError {
    /// Configuration parsing and validation errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Unphysical cosmological parameters or background evaluations.
    #[error("cosmology error: {0}")]
    Cosmology(ErrorInfo),
    /// Quadrature and ODE integration failures.
    #[error("integration error: {0}")]
    Integration(ErrorInfo),
    /// Observational dataset loading and validation errors.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Likelihood construction and evaluation errors.
    #[error("likelihood error: {0}")]
    Likelihood(ErrorInfo),
    /// Sampler configuration and execution errors.
    #[error("sampler error: {0}")]
    Sampler(ErrorInfo),
    /// Statistical estimator errors.
    #[error("stats error: {0}")]
    Stats(ErrorInfo),
    /// Randomness and seeding errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
    /// Serialization, schema and filesystem errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut pairs = self.context.iter();
        if let Some((key, value)) = pairs.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in pairs {
                write!(f, ", {key}={value}")?;
            }
            f.write_str(")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl McgtError {
    /// Payload of any family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            McgtError::Config(info)
            | McgtError::Cosmology(info)
            | McgtError::Integration(info)
            | McgtError::Data(info)
            | McgtError::Likelihood(info)
            | McgtError::Sampler(info)
            | McgtError::Stats(info)
            | McgtError::Rng(info)
            | McgtError::Serde(info) => info,
        }
    }

    /// Adds a context entry to the payload, keeping the family.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info_mut().context.insert(key.into(), value.into());
        self
    }

    fn info_mut(&mut self) -> &mut ErrorInfo {
        match self {
            McgtError::Config(info)
            | McgtError::Cosmology(info)
            | McgtError::Integration(info)
            | McgtError::Data(info)
            | McgtError::Likelihood(info)
            | McgtError::Sampler(info)
            | McgtError::Stats(info)
            | McgtError::Rng(info)
            | McgtError::Serde(info) => info,
        }
    }

    /// Wraps an I/O failure on `path` into a [`McgtError::Serde`] value.
    pub fn io(code: &str, path: &std::path::Path, err: impl ToString) -> Self {
        McgtError::Serde(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}
