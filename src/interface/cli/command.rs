//! CLI 명령 파싱 모듈.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::hygiene::RunOptions;
use crate::interface::cli::event::pr_url_from_event_file;

#[derive(Debug, Parser)]
#[command(name = "tidypilot")]
#[command(about = "Reconcile review threads and trigger comments on a GitHub PR")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// PR URL
    url: Option<String>,

    /// Maintainer login whose trigger comments are cleaned up (repeatable)
    #[arg(long = "owner", value_name = "LOGIN")]
    owners: Vec<String>,

    /// Report planned mutations without applying them
    #[arg(long)]
    dry_run: bool,

    /// Read the PR URL from a GitHub webhook payload (e.g. $GITHUB_EVENT_PATH)
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    event: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show effective merged config and token sources
    Config,
}

#[derive(Debug)]
pub enum CliAction {
    InspectConfig,
    Reconcile(RunOptions),
}

impl Cli {
    pub fn parse_action() -> Result<CliAction, String> {
        Cli::parse().into_action()
    }

    fn into_action(self) -> Result<CliAction, String> {
        if let Some(Commands::Config) = self.command {
            return Ok(CliAction::InspectConfig);
        }

        let url = match (self.url, self.event) {
            (Some(url), _) => url,
            (None, Some(path)) => pr_url_from_event_file(&path).map_err(|e| format!("{e:#}"))?,
            (None, None) => return Err("a PR URL or --event <PATH> is required".to_string()),
        };

        Ok(CliAction::Reconcile(RunOptions {
            url,
            owner_logins: self.owners,
            dry_run: self.dry_run,
        }))
    }
}
