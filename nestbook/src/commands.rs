//! Console commands understood by the client.

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use nestbook_domain::NotificationId;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A route the client navigated to.
    Navigate(String),
    Dismiss,
    MarkRead(NotificationId),
    List,
    Refresh,
    Quit,
}

impl Command {
    /// Parses one console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if line.starts_with('/') {
            return Ok(Some(Command::Navigate(line.to_string())));
        }

        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some(":dismiss"), None) => Command::Dismiss,
            (Some(":list"), None) => Command::List,
            (Some(":refresh"), None) => Command::Refresh,
            (Some(":quit"), None) | (Some(":q"), None) => Command::Quit,
            (Some(":read"), Some(id)) => Command::MarkRead(
                id.parse()
                    .map_err(|_| anyhow!("'{}' is not a notification id", id))?,
            ),
            _ => bail!("Unknown command '{}'. Routes start with '/'.", line),
        };
        if words.next().is_some() {
            bail!("Unexpected arguments in '{}'", line);
        }
        Ok(Some(command))
    }
}

/// Polls the Nestbook backend and shows new notifications on the terminal.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(author, version, about)]
pub struct Options {
    /// Configuration file to load instead of the default locations.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Route to navigate to on start-up.
    #[arg(short, long)]
    pub route: Option<String>,
}
