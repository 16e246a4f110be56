use std::sync::Arc;

use analysis_engine::{BotOpponent, ProcessAnalyst};
use chat_bot::{console, BotConfig, Dispatcher, SnapshotStore};
use match_core::{MoveOracle, SessionRegistry, StandardChessOracle};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the chat replies
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = BotConfig::from_env();
    tracing::info!(
        engine = %config.engine.engine_path,
        variants = ?config.allowed_variants,
        "Starting chat bot as {}",
        config.bot_name
    );

    let oracle: Arc<dyn MoveOracle> = Arc::new(StandardChessOracle);
    let registry = SessionRegistry::new();
    let store = SnapshotStore::new(&config.snapshot_path);
    match store.load() {
        Ok(entries) => {
            registry.load(entries, oracle.clone()).await;
        }
        Err(e) => tracing::warn!("Failed to load sessions from {}: {}", store.path().display(), e),
    }

    let analyst = Arc::new(ProcessAnalyst::new(config.engine.clone()));
    let bot = BotOpponent::new(analyst, config.engine.movetime_ms);
    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), oracle, bot, config));

    let (output, mut replies) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = replies.recv().await {
            println!("{line}");
        }
    });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tracing::info!("Reading `<conversation> <user> <message>` lines from stdin");
    let input = BufReader::new(tokio::io::stdin());
    console::run(dispatcher, input, shutdown, output).await;
    if let Err(e) = printer.await {
        tracing::error!("Reply printer failed: {}", e);
    }

    store.save(&registry.snapshot().await)?;
    tracing::info!("Saved sessions to {}", store.path().display());
    Ok(())
}
