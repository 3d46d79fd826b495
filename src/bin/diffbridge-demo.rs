//! diffbridge-demo - drives one `openDiff` call against a
//! `HeadlessEditorHost` from the command line, for manual smoke-testing.
//! Not a transport server: there is no wire listener here, just a
//! single in-process call.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use diffbridge::config::Config;
use diffbridge::controller::DiffController;
use diffbridge::headless::HeadlessEditorHost;
use diffbridge::lifecycle::ShutdownGuard;
use diffbridge::registry::DiffRegistry;
use diffbridge::rpc::RpcHandler;
use diffbridge::proto::OpenDiffRequest;

/// Open one diff against an in-memory editor host and print the
/// resulting tool reply.
#[derive(Parser, Debug)]
#[command(name = "diffbridge-demo", version, about)]
struct Cli {
    /// Path to the file being diffed. Read from disk if it exists.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Path to a file holding the proposed replacement content. Defaults
    /// to reading FILE's own content unchanged (a no-op diff) if absent.
    #[arg(short = 'n', long = "new-content-file")]
    new_content_file: Option<PathBuf>,

    /// Name for the diff tab.
    #[arg(short = 't', long = "tab-name", default_value = "diffbridge-demo")]
    tab_name: String,

    /// Path to a `diffbridge.toml` config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Accept the diff immediately instead of leaving it pending
    /// (there is no real UI here to accept it interactively).
    #[arg(long)]
    auto_accept: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let old_contents = std::fs::read_to_string(&cli.file).unwrap_or_default();
    let new_contents = match &cli.new_content_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading new content from {}", path.display()))?,
        None => old_contents.clone(),
    };

    let host = Arc::new(HeadlessEditorHost::new());
    if !old_contents.is_empty() {
        host.seed_file(&cli.file, old_contents);
    }
    let registry = Arc::new(DiffRegistry::new());
    let controller = Arc::new(DiffController::new(host.clone(), registry.clone(), config.diff_opts));
    let guard = ShutdownGuard::new(controller.clone());
    let handler = RpcHandler::new(guard.controller());

    let request = OpenDiffRequest {
        old_file_path: cli.file.clone(),
        new_file_path: cli.file,
        new_file_contents: new_contents,
        tab_name: cli.tab_name.clone(),
    };

    if cli.auto_accept {
        let registry = registry.clone();
        let tab_name = cli.tab_name.clone();
        tokio::spawn(async move {
            while !registry.contains(&tab_name) {
                tokio::task::yield_now().await;
            }
            let buffer = host.buffer_for_tab_name(&tab_name).expect("buffer just registered");
            host.fire_write_intercept(buffer);
        });
    }

    match handler.open_diff(request).await {
        Ok(reply) => {
            for block in reply.content {
                println!("{}", block.text);
            }
        }
        Err(envelope) => {
            eprintln!("error {}: {}", envelope.code, envelope.message);
            std::process::exit(1);
        }
    }

    Ok(())
}
