use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use paddock_proto::api::HttpCatalog;
use paddock_proto::config::Config;
use paddock_tui::app::App;
use paddock_tui::tree::{self, BuildContext, ContentNode};

#[derive(Parser, Debug)]
#[clap(name = "paddock", version, about = "Browse and play race weekend streams")]
struct Cli {
    /// Show the resolved stream URL as an extra playback entry.
    #[clap(long, short)]
    debug: bool,

    /// Config file to use instead of the default location.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print the live session, if any, and exit.
    #[clap(long)]
    live_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    if config.logging.save_logs {
        std::fs::create_dir_all(&config.logging.log_dir)?;
        let log_path = config.logging.log_dir.join("paddock.log");
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        // Allow RUST_LOG override; keep HTTP client internals quiet by default.
        let log_filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_env_filter(log_filter.as_str())
            .with_ansi(false)
            .init();

        eprintln!("paddock log: {}", log_path.display());
    }

    tracing::info!("paddock starting…");

    let api = HttpCatalog::new(&config.network.base_url, config.network.fanout_limit)?
        .with_language(&config.network.preferred_language);
    let ctx = BuildContext::new(Arc::new(api), Arc::new(config), cli.debug);

    if cli.live_only {
        match tree::detect_live_session(&ctx).await? {
            Some(node) => print_tree(&node, 0),
            None => println!("No live session"),
        }
        return Ok(());
    }

    App::new(ctx).run().await
}

fn print_tree(node: &ContentNode, depth: usize) {
    println!("{}{}", "  ".repeat(depth), node.label);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}
