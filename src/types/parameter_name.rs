// ABOUTME: Hierarchical parameter store key validation.
// ABOUTME: Ensures names look like "/api/albArn" before they reach a store.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Longest parameter name the store accepts.
pub const MAX_PARAMETER_NAME_LEN: usize = 1011;

#[derive(Debug, Error)]
pub enum ParameterNameError {
    #[error("parameter name cannot be empty")]
    Empty,

    #[error("parameter name exceeds maximum length of {MAX_PARAMETER_NAME_LEN} characters")]
    TooLong,

    #[error("parameter name must start with '/': {0}")]
    NotRooted(String),

    #[error("parameter name cannot end with '/': {0}")]
    TrailingSlash(String),

    #[error("parameter name contains an empty path segment: {0}")]
    EmptySegment(String),

    #[error("invalid character in parameter name: '{0}'")]
    InvalidChar(char),
}

/// A fully qualified parameter store key, e.g. `/api/listenerArn`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterName(String);

impl ParameterName {
    pub fn new(value: &str) -> Result<Self, ParameterNameError> {
        if value.is_empty() {
            return Err(ParameterNameError::Empty);
        }

        if value.len() > MAX_PARAMETER_NAME_LEN {
            return Err(ParameterNameError::TooLong);
        }

        if !value.starts_with('/') {
            return Err(ParameterNameError::NotRooted(value.to_string()));
        }

        if value.len() > 1 && value.ends_with('/') {
            return Err(ParameterNameError::TrailingSlash(value.to_string()));
        }

        if value == "/" || value.contains("//") {
            return Err(ParameterNameError::EmptySegment(value.to_string()));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && !matches!(c, '/' | '-' | '_' | '.') {
                return Err(ParameterNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Join a namespace such as `/api` with a key such as `albArn`.
    pub fn in_namespace(namespace: &str, key: &str) -> Result<Self, ParameterNameError> {
        let namespace = namespace.trim_end_matches('/');
        Self::new(&format!("{namespace}/{key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, e.g. `albArn` for `/api/albArn`.
    pub fn leaf(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ParameterName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(&value).map_err(serde::de::Error::custom)
    }
}
