//! Concierge application binary - composition root.
//!
//! Ties together all Concierge crates into a single executable:
//! 1. Resolve configuration (CLI flags > env vars > TOML file > defaults)
//! 2. Validate it (the backend base URL is mandatory)
//! 3. Build the HTTP gateway client
//! 4. Run the interactive terminal session (chat, ticket, voice commands)

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use concierge_chat::controller::{ConversationController, SubmitOutcome};
use concierge_chat::types::{Role, Turn};
use concierge_core::config::ConciergeConfig;
use concierge_core::events::SessionEvent;
use concierge_gateway::GatewayClient;
use concierge_ticket::TicketForm;
use concierge_voice::session::{UnsupportedBridge, VoiceSession};

use cli::CliArgs;

/// Render one transcript turn to the terminal.
fn print_turn(turn: &Turn) {
    let stamp = turn
        .timestamp
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();
    let who = match turn.role {
        Role::User => "you",
        Role::Assistant => "support",
    };
    if turn.is_failure() {
        println!("[{stamp}] {who} (!) {}", turn.content);
    } else {
        println!("[{stamp}] {who}: {}", turn.content);
    }
    for (i, suggestion) in turn.suggestions().iter().enumerate() {
        println!("         ({}) {}", i + 1, suggestion);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <text>                        send a message to support");
    println!("  /use <n>                      copy suggestion n into the draft");
    println!("  /send                         send the current draft");
    println!("  /ticket <email> <issue...>    file a support ticket");
    println!("  /voice                        start a voice session");
    println!("  /voice stop                   stop the voice session");
    println!("  /help                         show this help");
    println!("  /quit                         exit");
}

/// Print the transcript turns appended since the last call.
fn render_new_turns<G>(chat: &ConversationController<G>, rendered: &mut usize)
where
    G: concierge_gateway::SupportGateway,
{
    for turn in &chat.store().turns()[*rendered..] {
        print_turn(turn);
    }
    *rendered = chat.store().len();
}

/// React to queued view side effects.
fn render_events(events: Vec<SessionEvent>) {
    for event in events {
        match event {
            SessionEvent::InputPopulated { text } => {
                println!("(draft) {text}");
            }
            SessionEvent::StatusChanged { status, .. } => {
                tracing::debug!(status = %status, "Surface status changed");
            }
            // Turn rendering already happens from the store; a terminal
            // transcript is always scrolled to the latest line.
            SessionEvent::TurnAppended { .. } | SessionEvent::ScrollToLatest => {}
            // `SessionEvent` is `#[non_exhaustive]`; all current variants are
            // handled above.
            _ => {}
        }
    }
}

/// Interactive terminal session over stdin.
async fn run_session(config: ConciergeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = Arc::new(GatewayClient::new(&config.backend)?);
    let mut chat = ConversationController::new(Arc::clone(&gateway), config.chat.clone());
    let mut ticket = TicketForm::new(Arc::clone(&gateway));
    let mut voice: Option<VoiceSession<UnsupportedBridge>> = None;
    let mut rendered = 0usize;

    println!("Concierge support client. Type a question, or /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();

        match line.as_str() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => {
                print_help();
                continue;
            }
            "/send" => {
                if chat.input().trim().is_empty() {
                    println!("Nothing drafted. Type a message or /use a suggestion first.");
                    continue;
                }
            }
            "/voice" => {
                if voice.as_ref().is_some_and(|s| s.is_started()) {
                    println!("A voice session is already running. /voice stop to end it.");
                    continue;
                }
                let mut session = VoiceSession::new(UnsupportedBridge, &config.voice);
                match session.start() {
                    Ok(()) => {
                        println!("Voice session ready.");
                        voice = Some(session);
                    }
                    Err(_) => {
                        let diagnostic = session.diagnostic().unwrap_or("unknown error");
                        println!("Voice session unavailable: {diagnostic}");
                    }
                }
                continue;
            }
            "/voice stop" => {
                match voice.take() {
                    // Dropping the session stops the provider.
                    Some(_) => println!("Voice session stopped."),
                    None => println!("No voice session is running."),
                }
                continue;
            }
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("/use ") {
            let Ok(n) = rest.trim().parse::<usize>() else {
                println!("Usage: /use <n>");
                continue;
            };
            let suggestion = chat
                .store()
                .turns()
                .iter()
                .rev()
                .find(|t| !t.suggestions().is_empty())
                .and_then(|t| t.suggestions().get(n.wrapping_sub(1)))
                .cloned();
            match suggestion {
                Some(text) => chat.select_suggestion(&text),
                None => println!("No such suggestion."),
            }
            render_events(chat.drain_events());
            continue;
        }

        if let Some(rest) = line.strip_prefix("/ticket") {
            let rest = rest.trim();
            let mut parts = rest.splitn(2, char::is_whitespace);
            let email = parts.next().unwrap_or("");
            let description = parts.next().unwrap_or("").trim();
            ticket.set_email(email);
            ticket.set_issue_description(description);
            ticket.submit().await;
            if let Some(notice) = ticket.notice() {
                println!("{notice}");
            }
            ticket.reset();
            render_events(ticket.drain_events());
            continue;
        }

        if line.starts_with('/') && line != "/send" {
            println!("Unknown command: {line}. /help for commands.");
            continue;
        }

        if line != "/send" {
            chat.set_input(line);
        }
        println!("support is typing...");
        let outcome = chat.submit().await;
        if outcome == SubmitOutcome::IgnoredTooLong {
            println!(
                "Message too long (limit {} characters).",
                config.chat.max_message_length
            );
        }
        render_new_turns(&chat, &mut rendered);
        render_events(chat.drain_events());
    }

    // A still-running voice session is stopped when dropped here.
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config: file, then env overrides, then CLI flags.
    let config_file = args.resolve_config_path();
    let mut config = ConciergeConfig::load_or_default(&config_file);
    config.apply_env_overrides();
    if let Some(ref base_url) = args.base_url {
        config.backend.base_url = base_url.clone();
    }
    if let Some(ref level) = args.log_level {
        config.general.log_level = level.clone();
    }

    // Tracing, at the resolved level unless RUST_LOG overrides it.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting Concierge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        eprintln!("Configuration error: {e}");
        eprintln!("Set the backend base URL via --base-url, CONCIERGE_BASE_URL, or the config file.");
        return Err(e.into());
    }

    run_session(config).await
}
