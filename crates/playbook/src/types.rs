//! Core playbook data types.
//!
//! Wire format is camelCase JSON to match the control panel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One templated prompt plus its retry budget and enabled flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptSpec {
    /// Prompt text, may reference variable pools as `{{name}}`.
    pub text: String,
    /// How many submit cycles a single pick of this prompt drives.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Pacing window between full prompt submissions, in minutes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PacingParams {
    pub wait_min: f64,
    pub wait_max: f64,
}

impl Default for PacingParams {
    fn default() -> Self {
        Self {
            wait_min: 7.0,
            wait_max: 10.0,
        }
    }
}

/// The persisted configuration unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Playbook {
    pub prompts: Vec<PromptSpec>,
    /// Variable name → ordered pool of candidate values.
    pub vars: BTreeMap<String, Vec<String>>,
    pub params: PacingParams,
}

impl Playbook {
    /// Indices and specs of the enabled prompts, in playbook order.
    pub fn enabled_prompts(&self) -> Vec<(usize, &PromptSpec)> {
        self.prompts
            .iter()
            .enumerate()
            .filter(|(_, p)| p.enabled)
            .collect()
    }
}

fn default_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_defaults() {
        let p: PromptSpec = serde_json::from_str(r#"{ "text": "draw a cat" }"#).unwrap();
        assert_eq!(p.retries, 3);
        assert!(p.enabled);
    }

    #[test]
    fn params_use_camel_case() {
        let json = serde_json::to_value(PacingParams::default()).unwrap();
        assert_eq!(json["waitMin"], 7.0);
        assert_eq!(json["waitMax"], 10.0);
    }

    #[test]
    fn playbook_roundtrip() {
        let mut playbook = Playbook::default();
        playbook.prompts.push(PromptSpec {
            text: "draw {{animal}}".into(),
            retries: 2,
            enabled: true,
        });
        playbook
            .vars
            .insert("animal".into(), vec!["cat".into(), "dog".into()]);

        let json = serde_json::to_string(&playbook).unwrap();
        let back: Playbook = serde_json::from_str(&json).unwrap();
        assert_eq!(playbook, back);
    }

    #[test]
    fn empty_document_is_default_playbook() {
        let playbook: Playbook = serde_json::from_str("{}").unwrap();
        assert_eq!(playbook, Playbook::default());
        assert!(playbook.enabled_prompts().is_empty());
    }

    #[test]
    fn enabled_prompts_keeps_original_indices() {
        let playbook: Playbook = serde_json::from_str(
            r#"{
                "prompts": [
                    { "text": "a", "enabled": false },
                    { "text": "b" },
                    { "text": "c", "enabled": true }
                ]
            }"#,
        )
        .unwrap();
        let enabled = playbook.enabled_prompts();
        assert_eq!(enabled.len(), 2);
        assert_eq!(enabled[0].0, 1);
        assert_eq!(enabled[1].0, 2);
    }
}
