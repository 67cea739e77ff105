use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use claudechat_api::{AnthropicClient, RequestConfig};
use claudechat_chat::{ChatSession, SessionCommand, TurnError};
use claudechat_store::ConversationStore;
use claudechat_types::{ConversationMeta, Message};

/// Drive one conversation to completion: banner, resume context, then the
/// input loop until the operator exits.
pub async fn run_session(
    store: ConversationStore,
    client: AnthropicClient,
    config: RequestConfig,
    meta: ConversationMeta,
    messages: Vec<Message>,
    rl: &mut DefaultEditor,
) -> Result<()> {
    let mut session = ChatSession::new(store, client, config, meta, messages);

    println!("\n{}", "=".repeat(50).bright_black());
    println!(
        "{} {}",
        "CHAT SESSION - ID:".bright_cyan().bold(),
        session.id().bright_magenta()
    );
    println!("{}", "=".repeat(50).bright_black());
    println!(
        "{}",
        "Commands: 'exit' to quit, 'clear' to reset, 'history' to view history".bright_black()
    );
    println!("{}", "=".repeat(50).bright_black());

    if session.message_count() > 0 {
        println!("\n{}", "--- Conversation Context ---".bright_black());
        for line in session.resume_context_lines() {
            println!("{}", line);
        }
        println!(
            "{}\n",
            "--- Continue conversation below ---".bright_black()
        );
    } else {
        println!("\n{}\n", "Starting new conversation...".bright_black());
    }

    loop {
        let readline = rl.readline(&format!("{} ", "You:".bright_green().bold()));

        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{} Conversation {} saved.", "💾".bright_green(), session.id());
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match SessionCommand::parse(&line) {
            SessionCommand::Exit => {
                println!("\nConversation {} saved.", session.id().bright_magenta());
                println!("{}", "You can resume this conversation anytime!".bright_black());
                break;
            }
            SessionCommand::Clear => {
                session.clear_history();
                println!(
                    "\n{}\n",
                    "--- Conversation cleared. Starting fresh! ---".yellow()
                );
            }
            SessionCommand::History => {
                println!("\n{}", "--- Full Conversation History ---".bright_black());
                if session.message_count() == 0 {
                    println!("(empty)");
                }
                for line in session.history_lines() {
                    println!("{}", line);
                }
                println!("{}\n", "--- End of History ---".bright_black());
            }
            SessionCommand::Empty => continue,
            SessionCommand::Turn(text) => {
                let _ = rl.add_history_entry(&text);
                println!();

                match session.process_turn(&text).await {
                    Ok(reply) => {
                        println!("{} {}\n", "Claude:".bright_cyan().bold(), reply);
                        println!(
                            "{}",
                            format!(
                                "[Messages in conversation: {}] [Auto-saved: {}]",
                                session.message_count(),
                                session.id()
                            )
                            .bright_black()
                        );
                        println!("{}\n", "-".repeat(50).bright_black());
                    }
                    Err(TurnError::Storage(e)) => {
                        // Persistence is broken; nothing sensible to do but
                        // surface it and stop.
                        return Err(e.into());
                    }
                    Err(e) => {
                        eprintln!("{} {}", "❌".bright_red(), e);
                        println!("{}\n", "Let's continue our conversation...".bright_black());
                    }
                }
            }
        }
    }

    Ok(())
}
