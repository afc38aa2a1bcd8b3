//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ct_core::ActivityKind;

/// Branch-level cost tracker for AI-assisted development.
///
/// Combines human focus time, measured from editor and terminal activity,
/// with model spend read from assistant session logs, and attributes both to
/// the git branch being worked on.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Follow session logs and record model usage until interrupted.
    Watch,

    /// Read all existing session logs once and record their usage.
    Import,

    /// Record one activity event.
    Activity {
        /// Kind of interaction.
        #[arg(value_parser = parse_kind)]
        kind: ActivityKind,

        /// Branch to attribute the event to. Resolved through git when omitted.
        #[arg(long)]
        branch: Option<String>,

        /// Event time in unix epoch milliseconds. Defaults to now.
        #[arg(long)]
        at: Option<i64>,
    },

    /// Show focus time and model spend per branch.
    Report {
        /// Only report this branch.
        #[arg(long)]
        branch: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Include background (sub-task and compaction) spend.
        #[arg(long)]
        include_background: bool,
    },
}

fn parse_kind(s: &str) -> Result<ActivityKind, String> {
    s.parse().map_err(|e: ct_core::ValidationError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_activity_command() {
        let cli = Cli::try_parse_from(["ct", "activity", "file-switch", "--branch", "main", "--at", "42"])
            .unwrap();
        match cli.command {
            Some(Commands::Activity { kind, branch, at }) => {
                assert_eq!(kind, ActivityKind::FileSwitch);
                assert_eq!(branch.as_deref(), Some("main"));
                assert_eq!(at, Some(42));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_activity_kind() {
        assert!(Cli::try_parse_from(["ct", "activity", "typing"]).is_err());
    }

    #[test]
    fn parses_report_flags() {
        let cli = Cli::try_parse_from(["ct", "-v", "report", "--json", "--include-background"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Some(Commands::Report {
                branch: None,
                json: true,
                include_background: true
            })
        ));
    }
}
