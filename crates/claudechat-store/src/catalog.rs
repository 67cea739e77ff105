use crate::store::{ConversationStore, ConversationSummary, StoreError};

/// Recency-sorted view over everything in the store, for the resume menu.
pub struct Catalog<'a> {
    store: &'a ConversationStore,
}

impl<'a> Catalog<'a> {
    pub fn new(store: &'a ConversationStore) -> Self {
        Self { store }
    }

    /// Return at most `limit` summaries ordered by `last_updated`, most
    /// recent first, plus the true total count so callers can report
    /// "...and N more". Conversations with identical `last_updated` keep
    /// the store's enumeration order.
    pub fn summaries(
        &self,
        limit: usize,
    ) -> Result<(Vec<ConversationSummary>, usize), StoreError> {
        let mut all = self.store.list_all()?;
        let total = all.len();

        // Stable sort, so ties preserve enumeration order.
        all.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        all.truncate(limit);

        Ok((all, total))
    }
}
