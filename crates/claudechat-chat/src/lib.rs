//! Conversation session for claudechat
//!
//! Owns one conversation's live message log, drives the exchange loop, and
//! guarantees that a failed exchange never corrupts stored history.

mod session;

pub use session::{ChatSession, SessionCommand, TurnError};
