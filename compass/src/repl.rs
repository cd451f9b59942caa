//! Interactive coaching REPL
//!
//! Streams replies fragment-by-fragment, resolves usage after exhaustion,
//! and persists the advanced session snapshot through the store handle
//! after every turn.

use std::io::{self, Write};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::CoachingChat;
use crate::context::ClientContext;
use crate::llm::Message;
use crate::prompts::generate_opening_message;
use crate::session::{SessionState, StateUpdate, apply_update, suggest_next_focus, summarize};
use crate::store::StoreHandle;

/// Interactive coaching session
pub struct CoachRepl {
    chat: CoachingChat,
    store: StoreHandle,
    session_id: String,
    context: ClientContext,
    state: SessionState,
    history: Vec<Message>,
    user_name: Option<String>,
}

impl CoachRepl {
    pub fn new(
        chat: CoachingChat,
        store: StoreHandle,
        session_id: String,
        context: ClientContext,
        state: SessionState,
        user_name: Option<String>,
    ) -> Self {
        Self {
            chat,
            store,
            session_id,
            context,
            state,
            history: Vec::new(),
            user_name,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, is_resuming: bool) -> Result<()> {
        self.print_welcome();

        let opening = generate_opening_message(&self.context, &self.state, self.user_name.as_deref(), is_resuming);
        println!("{}", opening.bright_blue());
        println!();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await? {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_turn(input).await?;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Until next session.");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Compass Strategy Coaching".bright_cyan().bold());
        println!("Company: {}", self.context.company_name);
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<SlashResult> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                Ok(SlashResult::Continue)
            }
            "/quit" | "/q" | "/exit" => Ok(SlashResult::Quit),
            "/progress" => {
                let summary = summarize(&self.state);
                println!("{}", summary.render().bright_cyan());
                println!("Phase: {}", self.state.current_phase);
                Ok(SlashResult::Continue)
            }
            "/focus" => {
                println!("{}", suggest_next_focus(&self.state).bright_cyan());
                Ok(SlashResult::Continue)
            }
            "/bet" => {
                // /bet belief | implication | exploration | metric
                let rest = input.strip_prefix("/bet").unwrap_or("").trim();
                let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
                if fields.len() != 4 || fields.iter().any(|f| f.is_empty()) {
                    println!("Usage: /bet <belief> | <implication> | <exploration> | <success metric>");
                } else {
                    self.state = apply_update(
                        &self.state,
                        &[StateUpdate::AddStrategicBet {
                            belief: fields[0].to_string(),
                            implication: fields[1].to_string(),
                            exploration: fields[2].to_string(),
                            success_metric: fields[3].to_string(),
                            pillar_source: None,
                        }],
                    );
                    self.store
                        .update_session_state(&self.session_id, self.state.encode()?)
                        .await?;
                    println!("{}", format!("Bet #{} captured.", self.state.strategic_bets.len()).dimmed());
                }
                Ok(SlashResult::Continue)
            }
            "/phase" => {
                // Administrative mirror write; does not touch the state blob.
                match parts.get(1) {
                    Some(phase) => match self.store.set_session_phase(&self.session_id, phase).await {
                        Ok(()) => println!("{}", format!("Phase mirror set to {phase}.").dimmed()),
                        Err(e) => println!("{} {}", "Error:".red(), e),
                    },
                    None => println!("Usage: /phase <discovery|research|synthesis|planning>"),
                }
                Ok(SlashResult::Continue)
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                Ok(SlashResult::Continue)
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:12} Show this help", "/help".yellow());
        println!("  {:12} Exit the session", "/quit".yellow());
        println!("  {:12} Show progress summary", "/progress".yellow());
        println!("  {:12} Show suggested next focus", "/focus".yellow());
        println!("  {:12} Capture a strategic bet", "/bet".yellow());
        println!("  {:12} Overwrite the phase mirror (admin)", "/phase".yellow());
        println!();
    }

    /// Process one coaching turn: stream the reply, resolve usage, advance
    /// and persist the state snapshot
    async fn process_turn(&mut self, input: &str) -> Result<()> {
        let mut reply = self.chat.send_streaming(&self.context, &self.state, &self.history, input);

        let mut content = String::new();
        while let Some(fragment) = reply.next_fragment().await {
            match fragment {
                Ok(text) => {
                    print!("{}", text);
                    let _ = io::stdout().flush();
                    content.push_str(&text);
                }
                Err(e) => {
                    println!();
                    println!("{} {}", "Stream error:".red(), e);
                    return Ok(());
                }
            }
        }
        println!();

        match reply.into_usage().resolve().await {
            Ok(usage) => {
                println!(
                    "{}",
                    format!(
                        "[{} in / {} out, {}ms]",
                        usage.input_tokens, usage.output_tokens, usage.latency_ms
                    )
                    .dimmed()
                );
            }
            Err(e) => {
                println!("{} {}", "Error:".red(), e);
                return Ok(());
            }
        }
        println!();

        self.history.push(Message::user(input));
        self.history.push(Message::assistant(content));

        // One increment per message, user and assistant alike.
        self.state = apply_update(
            &self.state,
            &[StateUpdate::IncrementMessageCount, StateUpdate::IncrementMessageCount],
        );
        self.store
            .update_session_state(&self.session_id, self.state.encode()?)
            .await?;

        Ok(())
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
