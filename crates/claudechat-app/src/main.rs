use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::DefaultEditor;
use std::env;

use claudechat::repl::run_session;
use claudechat::selector::{select_conversation, Selection};
use claudechat::Cli;
use claudechat_api::AnthropicClient;
use claudechat_store::{ConversationStore, StoreError};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let api_key = env::var("ANTHROPIC_API_KEY")
        .context("ANTHROPIC_API_KEY is not set (put it in the environment or a .env file)")?;

    println!("\n{}", "=".repeat(60).bright_black());
    println!("{}", "CLAUDE CHAT - Persistent Conversations".bright_cyan().bold());
    println!("{}", "=".repeat(60).bright_black());
    println!(
        "{}",
        format!(
            "Model: {} | Conversations: {}",
            cli.model,
            cli.conversations_dir.display()
        )
        .bright_black()
    );

    let mut rl = DefaultEditor::new()?;
    let mut resume_id = cli.resume.clone();

    loop {
        let mut store = ConversationStore::new(&cli.conversations_dir)?;

        // A --resume id on the command line skips the menu once; a stale id
        // drops through to the menu like any other not-found selection.
        let selection = match resume_id.take() {
            Some(id) => match store.load(&id) {
                Ok((messages, meta)) => Selection::Conversation { meta, messages },
                Err(StoreError::NotFound(id)) => {
                    println!(
                        "{} No conversation with id '{}'; showing the menu instead.",
                        "⚠️".yellow(),
                        id
                    );
                    select_conversation(&mut store, &mut rl)?
                }
                Err(e) => return Err(e.into()),
            },
            None => select_conversation(&mut store, &mut rl)?,
        };

        let Selection::Conversation { meta, messages } = selection else {
            println!("\n{}", "Thank you for using Claude Chat!".bright_cyan());
            break;
        };

        let client = AnthropicClient::new(api_key.clone(), cli.api_url.clone());
        run_session(store, client, cli.request_config(), meta, messages, &mut rl).await?;

        println!("\n{}", "-".repeat(50).bright_black());
        let again = rl
            .readline("Open another conversation? (yes/no): ")
            .unwrap_or_else(|_| "no".to_string());
        if !matches!(again.trim().to_lowercase().as_str(), "yes" | "y") {
            println!("\n{}", "Goodbye! All conversations have been saved.".bright_cyan());
            break;
        }
    }

    Ok(())
}
