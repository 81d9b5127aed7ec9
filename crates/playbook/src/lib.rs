//! Playbook data model, validation, and persistence.
//!
//! A playbook is the persisted configuration unit: templated prompts, variable
//! pools, and pacing parameters. The default playbook lives under the reserved
//! name [`CURRENT_PLAYBOOK`]; archived playbooks sit beside it under
//! caller-chosen names.

pub mod store;
pub mod store_file;
pub mod store_memory;
pub mod types;
pub mod validate;

pub use {
    store::{CURRENT_PLAYBOOK, PlaybookStore, StoreError},
    store_file::FileStore,
    store_memory::MemoryStore,
    types::{PacingParams, Playbook, PromptSpec},
    validate::{Diagnostic, Severity, ValidationResult, parse_playbook, validate_value},
};
