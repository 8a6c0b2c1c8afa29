// ABOUTME: Custom serde deserializers for manifest types.
// ABOUTME: Accepts stacks either as a bare name or as a full declaration.

use nonempty::NonEmpty;
use serde::Deserialize;

use super::StackConfig;
use crate::types::StackName;

pub fn deserialize_stacks<'de, D>(deserializer: D) -> Result<NonEmpty<StackConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entries: Vec<StackEntry> = Vec::deserialize(deserializer)?;
    let stacks = entries.into_iter().map(StackEntry::into_stack_config).collect();

    NonEmpty::from_vec(stacks)
        .ok_or_else(|| serde::de::Error::custom("at least one stack is required"))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StackEntry {
    Bare(StackName),
    Detailed(StackConfig),
}

impl StackEntry {
    fn into_stack_config(self) -> StackConfig {
        match self {
            StackEntry::Bare(name) => StackConfig {
                name,
                reads: Vec::new(),
                writes: Vec::new(),
            },
            StackEntry::Detailed(config) => config,
        }
    }
}
