mod playbook_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    promptloop_browser::CdpTarget,
    promptloop_config::PromptloopConfig,
    promptloop_engine::{Generator, Journal},
    promptloop_gateway::AppState,
    promptloop_playbook::{FileStore, PlaybookStore},
};

#[derive(Parser)]
#[command(
    name = "promptloop",
    about = "Playbook-driven prompt automation for an already-open browser page"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Chrome remote-debugging endpoint (overrides config value).
    #[arg(long, global = true, env = "PROMPTLOOP_CDP_URL")]
    cdp_url: Option<String>,

    /// Data directory for playbooks and the run log.
    #[arg(long, global = true, env = "PROMPTLOOP_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the control-panel server (default when no subcommand is given).
    Serve,
    /// Offline playbook tooling.
    Playbook {
        #[command(subcommand)]
        action: playbook_commands::PlaybookAction,
    },
}

/// Initialise tracing from `--log-level` / `RUST_LOG`.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn resolve_config(cli: &Cli) -> PromptloopConfig {
    let mut config = promptloop_config::discover_and_load();
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref url) = cli.cdp_url {
        config.target.cdp_url = url.clone();
    }
    if let Some(ref dir) = cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    config
}

async fn serve(config: PromptloopConfig) -> anyhow::Result<()> {
    let data_dir = promptloop_config::data_dir(&config);

    let journal = Arc::new(Journal::new(config.journal.capacity));
    journal.enable_persistence(data_dir.join("run.log"));

    let store: Arc<dyn PlaybookStore> = Arc::new(FileStore::new(data_dir.join("playbooks")));
    let target = Arc::new(CdpTarget::new(config.target.clone()));
    let generator = Generator::new(Arc::clone(&store), target, Arc::clone(&journal));

    info!(
        cdp_url = %config.target.cdp_url,
        target = %config.target.url_fragment,
        data_dir = %data_dir.display(),
        "promptloop starting"
    );

    let state = AppState::new(store, generator, journal);
    promptloop_gateway::start_server(&config.server.bind, config.server.port, state).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);
    let config = resolve_config(&cli);

    match cli.command {
        None | Some(Commands::Serve) => serve(config).await,
        Some(Commands::Playbook { action }) => playbook_commands::run(action, &config).await,
    }
}
