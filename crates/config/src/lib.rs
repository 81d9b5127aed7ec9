//! Configuration loading and env substitution.
//!
//! Config file: `promptloop.toml`, searched in `./` then
//! `~/.config/promptloop/`. Supports `${ENV_VAR}` substitution in all
//! string values; a handful of `PROMPTLOOP_*` env vars override file values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, data_dir, discover_and_load, load_config},
    schema::{JournalConfig, PromptloopConfig, ServerConfig, StorageConfig, TargetConfig},
};
