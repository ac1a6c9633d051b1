// Nestbook notification client entry point

mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nestbook_core::config::ConfigLoader;
use nestbook_core::logging::init_logging;
use nestbook_domain::{IdentityResolver, NotificationPipeline, PipelinePorts};
use nestbook_system::{
    FileSessionRecordProvider, HttpNotificationSource, SessionWatermarkStore, TerminalBell, TerminalToastRenderer,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::commands::{Command, Options};

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();

    let config = match &options.config {
        Some(path) => ConfigLoader::load_from_path(path),
        None => ConfigLoader::load(),
    }
    .context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("Starting Nestbook notification client against {}", config.backend.base_url);

    let sessions = FileSessionRecordProvider::from_config(&config.session)
        .context("Failed to locate the session record directory")?;
    let store = SessionWatermarkStore::from_config(&config.session);
    info!(
        "Session records in {:?}, watermarks in {:?}",
        sessions.dir(),
        store.path()
    );

    let resolver = IdentityResolver::from_routes_config(&config.routes, Arc::new(sessions));
    let ports = PipelinePorts {
        source: Arc::new(HttpNotificationSource::from_config(&config.backend)?),
        store: Arc::new(store),
        renderer: Arc::new(TerminalToastRenderer::stdout()),
        audio: Some(Arc::new(TerminalBell)),
    };
    let pipeline = NotificationPipeline::from_core_config(&config, resolver, ports);

    if let Some(route) = &options.route {
        let actor = pipeline.navigate(route)?;
        info!("Initial route {} resolved to {}", route, actor);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Console closed.");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read console input: {}", e);
                        break;
                    }
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(&pipeline, command).await {
                            warn!("{:#}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("{}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted.");
                break;
            }
        }
    }

    pipeline.shutdown().await;
    info!("Nestbook notification client shut down.");
    Ok(())
}

async fn execute(pipeline: &NotificationPipeline, command: Command) -> Result<()> {
    match command {
        Command::Navigate(route) => {
            let actor = pipeline.navigate(&route)?;
            info!("{} -> {}", route, actor);
        }
        Command::Dismiss => pipeline.surface().close(),
        Command::MarkRead(id) => pipeline
            .poller()
            .mark_read(id)
            .await
            .with_context(|| format!("Failed to mark notification {} as read", id))?,
        Command::List => {
            let notifications = pipeline.poller().notifications();
            if notifications.is_empty() {
                println!("(no notifications)");
            }
            for record in notifications {
                let marker = if record.is_read { ' ' } else { '*' };
                let created = record
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".repeat(16));
                println!("{} #{:<6} {}  {}", marker, record.id, created, record.title);
            }
        }
        Command::Refresh => pipeline.poller().refresh()?,
        Command::Quit => {}
    }
    Ok(())
}
