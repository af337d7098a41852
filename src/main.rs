// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

//! Nexus - conversational crypto-intelligence engine
//!
//! Entry point for the Nexus CLI application.

use clap::Parser;
use futures::StreamExt;
use std::io::Write;

use nexus::cli::{ChatArgs, Cli, Commands, ServeArgs};
use nexus::config::Settings;
use nexus::error::Result;
use nexus::orchestrator::{validate_message, ChatEvent, ChatRequest, Orchestrator};
use nexus::server;
use nexus::NexusError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG takes precedence over -v.
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if cli.verbose > 0 {
        let level = if cli.verbose > 1 { "trace" } else { "debug" };
        if let Ok(directive) = format!("nexus={level}").parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Serve(args) => run_serve(settings, args).await,
        Commands::Chat(args) => run_chat(settings, args).await,
        Commands::Tools => run_tools(settings),
    }
}

async fn run_serve(settings: Settings, args: ServeArgs) -> Result<()> {
    let bind = args.bind.unwrap_or_else(|| settings.server.bind.clone());
    let orchestrator = Orchestrator::from_settings(&settings);
    server::serve(orchestrator, &bind).await
}

async fn run_chat(settings: Settings, args: ChatArgs) -> Result<()> {
    let message = validate_message(&args.message)
        .map_err(|reason| NexusError::InvalidInput(reason.to_string()))?;

    let orchestrator = Orchestrator::from_settings(&settings);
    let request = ChatRequest::new(message, args.user)
        .with_mode(args.mode)
        .with_tier(args.tier);

    let mut stream = Box::pin(orchestrator.run(request));
    let mut stdout = std::io::stdout();

    while let Some(event) = stream.next().await {
        match event {
            ChatEvent::ToolResult { tool, .. } => {
                eprintln!("[{tool}]");
            }
            ChatEvent::Token { content } => {
                write!(stdout, "{content}")?;
                stdout.flush()?;
            }
            ChatEvent::Error { content } => {
                writeln!(stdout)?;
                eprintln!("error: {content}");
                break;
            }
            ChatEvent::Done => {
                writeln!(stdout)?;
                break;
            }
        }
    }

    Ok(())
}

fn run_tools(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::from_settings(&settings);
    for (id, name, description) in orchestrator.registry().available_tools() {
        println!("{id:<16} {name:<24} {description}");
    }
    Ok(())
}
