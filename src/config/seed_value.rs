// ABOUTME: Values for externally seeded parameters.
// ABOUTME: Either a literal or a reference to an environment variable with an optional fallback.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Literal(String),
    FromEnv {
        env: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl SeedValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            SeedValue::Literal(value) => Ok(value.clone()),
            SeedValue::FromEnv { env, default } => std::env::var(env)
                .ok()
                .or_else(|| default.clone())
                .ok_or_else(|| Error::MissingEnvVar(env.clone())),
        }
    }
}
