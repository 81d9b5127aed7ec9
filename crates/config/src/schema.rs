//! Config schema types with serde defaults.

use {
    serde::{Deserialize, Serialize},
    std::path::PathBuf,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptloopConfig {
    pub server: ServerConfig,
    pub target: TargetConfig,
    pub storage: StorageConfig,
    pub journal: JournalConfig,
}

/// Control-panel HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3040,
        }
    }
}

/// The page being automated, reached over an existing Chrome remote-debugging
/// endpoint. The browser must already be running with `--remote-debugging-port`
/// and the page already open; promptloop never launches or navigates anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// HTTP root of the DevTools endpoint, e.g. "http://127.0.0.1:9222".
    pub cdp_url: String,
    /// Substring that identifies the target page among the open tabs.
    pub url_fragment: String,
    /// Element clicked to open the prompt composer.
    pub editor_selector: String,
    /// Text input the expanded prompt is typed into.
    pub input_selector: String,
    /// Submit control; its disabled state is the readiness signal.
    pub submit_selector: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            cdp_url: "http://127.0.0.1:9222".into(),
            url_fragment: "sora.chatgpt.com".into(),
            editor_selector: "textarea".into(),
            input_selector: "textarea".into(),
            submit_selector: "button[type='submit']".into(),
        }
    }
}

/// Where playbooks and the run log live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory. Defaults to the platform data dir
    /// (e.g. `~/.local/share/promptloop`).
    pub data_dir: Option<PathBuf>,
}

/// Run-journal sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// In-memory ring capacity (most recent entries kept).
    pub capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}
