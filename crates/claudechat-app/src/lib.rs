//! Application glue for claudechat: CLI parsing, the conversation selector
//! menu, and the interactive REPL around a chat session.

pub mod cli;
pub mod repl;
pub mod selector;

pub use cli::Cli;
