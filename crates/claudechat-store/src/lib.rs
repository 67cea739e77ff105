//! Durable conversation storage for claudechat
//!
//! One JSON snapshot file per conversation, rewritten in full after every
//! successful exchange, plus a catalog view that orders conversations by
//! recency for the resume menu.

mod catalog;
mod store;

pub use catalog::Catalog;
pub use store::{
    ConversationRecord, ConversationStore, ConversationSummary, IdSource, RandomIds, StoreError,
};
