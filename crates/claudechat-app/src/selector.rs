use anyhow::Result;
use chrono::DateTime;
use colored::Colorize;
use rustyline::DefaultEditor;

use claudechat_store::{Catalog, ConversationStore, ConversationSummary, StoreError};
use claudechat_types::{ConversationMeta, Message};

/// How many conversations the menu shows before "...and N more".
const MENU_LIMIT: usize = 5;

/// The operator's choice: an existing or fresh conversation to chat in, or
/// nothing (quit).
pub enum Selection {
    Conversation {
        meta: ConversationMeta,
        messages: Vec<Message>,
    },
    Exit,
}

/// Present the catalog and resolve the operator's choice. An id that was
/// deleted between listing and selection is treated as not found and falls
/// back to a fresh conversation.
pub fn select_conversation(
    store: &mut ConversationStore,
    rl: &mut DefaultEditor,
) -> Result<Selection> {
    let (summaries, total) = Catalog::new(store).summaries(MENU_LIMIT)?;
    display_menu(&summaries, total);

    loop {
        let line = match rl.readline("\nSelect an option (number): ") {
            Ok(line) => line,
            Err(_) => return Ok(Selection::Exit),
        };

        let Ok(choice) = line.trim().parse::<usize>() else {
            println!("{}", "Please enter a valid number.".yellow());
            continue;
        };

        if choice == 0 {
            return Ok(Selection::Exit);
        }

        if choice == summaries.len() + 1 || (summaries.is_empty() && choice == 1) {
            return Ok(new_conversation(store));
        }

        if (1..=summaries.len()).contains(&choice) {
            let id = &summaries[choice - 1].id;
            match store.load(id) {
                Ok((messages, meta)) => {
                    println!(
                        "\n{} Resuming conversation: {}",
                        "📂".bright_cyan(),
                        meta.id.bright_magenta()
                    );
                    println!(
                        "   Loaded {} messages from history",
                        messages.len().to_string().cyan()
                    );
                    return Ok(Selection::Conversation { meta, messages });
                }
                Err(StoreError::NotFound(id)) => {
                    println!(
                        "{} Conversation '{}' is gone; starting a new one instead.",
                        "⚠️".yellow(),
                        id
                    );
                    return Ok(new_conversation(store));
                }
                Err(StoreError::CorruptRecord { id, reason }) => {
                    eprintln!(
                        "{} Conversation '{}' could not be read: {}",
                        "❌".bright_red(),
                        id,
                        reason
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        println!("{}", "Invalid choice. Please try again.".yellow());
    }
}

fn new_conversation(store: &mut ConversationStore) -> Selection {
    let id = store.generate_id();
    println!(
        "\n{} Starting new conversation with ID: {}",
        "🆕".bright_green(),
        id.bright_magenta()
    );
    Selection::Conversation {
        meta: ConversationMeta::new(id),
        messages: Vec::new(),
    }
}

fn display_menu(summaries: &[ConversationSummary], total: usize) {
    println!("\n{}", "=".repeat(50).bright_black());
    println!("{}", "CONVERSATION MENU".bright_cyan().bold());
    println!("{}", "=".repeat(50).bright_black());

    if summaries.is_empty() {
        println!("\nNo saved conversations found.");
        println!("1. Start a NEW conversation");
    } else {
        println!("\nRecent Conversations:");
        println!("{}", "-".repeat(50).bright_black());
        for (i, conv) in summaries.iter().enumerate() {
            println!("{}. ID: {}", i + 1, conv.id.bright_magenta());
            println!(
                "   Created: {} | Updated: {}",
                format_timestamp(&conv.created_at),
                format_timestamp(&conv.last_updated)
            );
            println!("   Messages: {}", conv.message_count);
        }

        if total > summaries.len() {
            println!(
                "   {}",
                format!("...and {} more conversations", total - summaries.len()).bright_black()
            );
        }

        println!("{}", "-".repeat(50).bright_black());
        println!("{}. Start a NEW conversation", summaries.len() + 1);
    }

    println!("0. Exit");
    println!("{}", "=".repeat(50).bright_black());
}

/// Render a stored ISO-8601 timestamp as a short human-readable date,
/// falling back to the raw string if it fails to parse.
fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
