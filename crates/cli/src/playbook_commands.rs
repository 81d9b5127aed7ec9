//! Offline playbook tooling: validate a document, inspect the store.

use std::path::PathBuf;

use clap::Subcommand;

use {
    promptloop_config::PromptloopConfig,
    promptloop_playbook::{CURRENT_PLAYBOOK, FileStore, PlaybookStore, validate_value},
};

#[derive(Subcommand)]
pub enum PlaybookAction {
    /// Validate a playbook JSON file and print every violation.
    Validate {
        /// Path to the playbook document.
        file: PathBuf,
    },
    /// Print a stored playbook as JSON.
    Show {
        /// Playbook name; defaults to the current playbook.
        name: Option<String>,
    },
    /// List archived playbook names.
    List,
}

pub async fn run(action: PlaybookAction, config: &PromptloopConfig) -> anyhow::Result<()> {
    let data_dir = promptloop_config::data_dir(config);
    let store = FileStore::new(data_dir.join("playbooks"));

    match action {
        PlaybookAction::Validate { file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("not valid JSON: {e}"))?;

            let result = validate_value(&value);
            if result.diagnostics.is_empty() {
                println!("{}: ok", file.display());
                return Ok(());
            }
            for d in &result.diagnostics {
                println!("{}: {d}", d.severity);
            }
            if result.has_errors() {
                anyhow::bail!("playbook is invalid");
            }
            Ok(())
        },
        PlaybookAction::Show { name } => {
            let name = name.as_deref().unwrap_or(CURRENT_PLAYBOOK);
            let playbook = store.load(name).await?;
            println!("{}", serde_json::to_string_pretty(&playbook)?);
            Ok(())
        },
        PlaybookAction::List => {
            for name in store.list().await? {
                println!("{name}");
            }
            Ok(())
        },
    }
}
