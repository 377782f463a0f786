//! mcp-agent: chat with an MCP-backed agent from the terminal.
//!
//! Reads one utterance per line from stdin and streams the reply to stdout.
//! Diagnostics go to stderr.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use mcp_agent_core::agent::{AgentOptions, HistoryTurn, McpAgent, ToolConflictPolicy};
use mcp_agent_core::config::{AgentSettings, ConfigStore};
use mcp_agent_core::logging::{ConsoleLogger, Logger};
use mcp_agent_core::providers::create_provider;
use mcp_agent_core::{log_error, log_info};

use crate::render::{JsonRenderer, Render, TextRenderer};

#[derive(Parser)]
#[command(name = "mcp-agent", about = "Chat with a model that calls MCP tools")]
struct Args {
    /// Path to mcp.json (defaults to the user config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session id passed to tools (random when omitted).
    #[arg(short, long)]
    session: Option<String>,

    /// Print the discovered tools as JSON and exit.
    #[arg(long)]
    tools: bool,

    /// Emit events as JSON lines instead of text.
    #[arg(long)]
    json: bool,

    /// Use the echo mock model instead of the configured endpoint.
    #[arg(long)]
    mock: bool,

    /// Keep text streamed before a tool call instead of retracting it.
    #[arg(long)]
    prefer_text: bool,

    /// Log debug messages.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new().verbose(args.verbose));

    let store = match &args.config {
        Some(path) => ConfigStore::new(path, Arc::clone(&logger)),
        None => ConfigStore::user(Arc::clone(&logger)),
    };

    let mut settings = AgentSettings::from_env();
    if args.mock && settings.api_key.is_none() {
        settings = settings.with_api_key("mock");
    }

    let policy = if args.prefer_text {
        ToolConflictPolicy::PreferText
    } else {
        ToolConflictPolicy::ExecuteAndRetract
    };

    let mut agent = McpAgent::new(settings, store, Arc::clone(&logger))
        .with_options(AgentOptions::default().with_conflict_policy(policy));
    if args.mock {
        agent = agent.with_provider(create_provider("mock", Arc::clone(&logger)));
    }

    if !agent.initialize().await {
        eprintln!("Could not start the agent; see the log above.");
        return ExitCode::FAILURE;
    }

    if args.tools {
        let code = match serde_json::to_string_pretty(&agent.tools_info()) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Could not serialize tools: {}", e);
                ExitCode::FAILURE
            }
        };
        agent.close().await;
        return code;
    }

    let session = args
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    log_info!(logger, "Session {}", session);

    let mut renderer: Box<dyn Render> = if args.json {
        Box::new(JsonRenderer)
    } else {
        Box::new(TextRenderer::default())
    };

    let mut history: Vec<HistoryTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log_error!(logger, "Failed to read stdin: {}", e);
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "/quit" | "/exit") {
            break;
        }

        let mut reply = None;
        {
            let mut events = agent.chat_stream(input, &history, Some(&session));
            while let Some(event) = events.next().await {
                renderer.render(&event);
                if let Some(text) = render::final_text(&event) {
                    reply = Some(text.to_string());
                }
            }
        }
        history.push(HistoryTurn::new(input, reply));
    }

    agent.close().await;
    ExitCode::SUCCESS
}
