// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::llm::router::Tier;
use crate::prompt::Mode;

/// Nexus - conversational crypto-intelligence engine
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(version, about = "Conversational crypto-intelligence engine")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (defaults to ~/.nexus/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Ask a single question, streaming the answer to stdout
    Chat(ChatArgs),

    /// List registered tools
    Tools,
}

/// Arguments for the serve subcommand
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides settings)
    #[arg(long)]
    pub bind: Option<String>,
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug)]
pub struct ChatArgs {
    /// The question to ask
    pub message: String,

    /// Analytical mode
    #[arg(short, long, value_enum, default_value_t = Mode::Analyst)]
    pub mode: Mode,

    /// Service tier
    #[arg(short, long, value_enum, default_value_t = Tier::Free)]
    pub tier: Tier,

    /// User id for memory continuity
    #[arg(short, long, default_value = "cli")]
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chat_args() {
        let cli = Cli::parse_from(["nexus", "chat", "btc price", "--mode", "trader", "--tier", "pro"]);
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.message, "btc price");
                assert_eq!(args.mode, Mode::Trader);
                assert_eq!(args.tier, Tier::Pro);
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_serve_args_default_bind() {
        let cli = Cli::parse_from(["nexus", "serve"]);
        match cli.command {
            Commands::Serve(args) => assert!(args.bind.is_none()),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_verbose_count() {
        let cli = Cli::parse_from(["nexus", "-vv", "tools"]);
        assert_eq!(cli.verbose, 2);
    }
}
