//! Steps handed over by the generation service, and their conversion into
//! executable actions.

use crate::action::Action;
use crate::action_parser;
use crate::error::Result;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStep {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "action", alias = "raw_instruction")]
    pub instruction: String,
    #[serde(default)]
    pub description: String,
}

impl GeneratedStep {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            description: description.into(),
        }
    }
}

/// Pulls the JSON array of steps out of raw model output. Markdown fences and
/// prose around the array are ignored.
pub fn decode_generated_steps(raw: &str) -> Result<Vec<GeneratedStep>> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let start = cleaned.find('[').unwrap_or(0);
    let end = cleaned.rfind(']').map(|i| i + 1).unwrap_or(cleaned.len());
    let sliced = if start < end { &cleaned[start..end] } else { cleaned.as_str() };
    Ok(serde_json::from_str(sliced.trim())?)
}

/// Parses every step, in order. Steps that do not parse are dropped.
pub fn build_actions(steps: &[GeneratedStep]) -> Vec<Action> {
    steps
        .iter()
        .filter_map(|step| match action_parser::parse(&step.instruction, &step.description) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!("⚠️ [Plan] Dropping step '{}' ({:?}): {}", step.name, step.instruction, e);
                None
            }
        })
        .collect()
}
