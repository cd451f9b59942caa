//! Command-line interface definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compass - conversational strategy coaching agent
#[derive(Debug, Parser)]
#[command(name = "compass", version, about)]
pub struct Cli {
    /// Path to a config file (default: .compass.yml, then user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or update an organization profile
    InitOrg {
        /// Organization id
        #[arg(long)]
        org: String,

        /// Company name
        #[arg(long)]
        name: String,

        /// Industry label
        #[arg(long)]
        industry: Option<String>,

        /// Company size band (e.g. "200-500")
        #[arg(long)]
        size: Option<String>,

        /// Strategic focus (growth, profitability, market_entry, turnaround,
        /// innovation, operational_excellence)
        #[arg(long)]
        focus: Option<String>,

        /// Free-text pain points
        #[arg(long)]
        pain_points: Option<String>,
    },

    /// Start or resume a coaching conversation
    Chat {
        /// Organization id (profile must exist)
        #[arg(long)]
        org: String,

        /// User id, used to look up the personal profile
        #[arg(long)]
        user: Option<String>,

        /// Session id to resume; omit to start fresh
        #[arg(long)]
        resume: Option<String>,

        /// Name to greet the user by
        #[arg(long)]
        name: Option<String>,
    },

    /// Show progress for a session
    Status {
        /// Session id
        #[arg(long)]
        session: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat() {
        let cli = Cli::parse_from(["compass", "chat", "--org", "org-1", "--user", "user-1"]);
        match cli.command {
            Command::Chat { org, user, resume, .. } => {
                assert_eq!(org, "org-1");
                assert_eq!(user.as_deref(), Some("user-1"));
                assert!(resume.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_init_org_with_focus() {
        let cli = Cli::parse_from([
            "compass", "init-org", "--org", "org-1", "--name", "Acme", "--focus", "growth",
        ]);
        match cli.command {
            Command::InitOrg { org, name, focus, .. } => {
                assert_eq!(org, "org-1");
                assert_eq!(name, "Acme");
                assert_eq!(focus.as_deref(), Some("growth"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["compass", "--config", "/tmp/c.yml", "status", "--session", "s-1"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yml")));
    }
}
