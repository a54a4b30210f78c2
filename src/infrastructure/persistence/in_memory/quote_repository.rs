//! # In-Memory Quote Repository
//!
//! In-memory implementation of [`QuoteRepository`].
//!
//! Used by tests and by the server when no database is configured.

use crate::domain::entities::Quote;
use crate::domain::value_objects::{ClientId, QuoteId};
use crate::infrastructure::persistence::traits::{
    QuoteFilter, QuotePage, QuoteRepository, RepositoryResult, newest_first,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`QuoteRepository`].
///
/// Uses a thread-safe `HashMap` keyed by quote id.
#[derive(Debug, Clone)]
pub struct InMemoryQuoteRepository {
    storage: Arc<RwLock<HashMap<QuoteId, Quote>>>,
}

impl InMemoryQuoteRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored quotes.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Returns true if no quote is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every quote.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

impl Default for InMemoryQuoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn save(&self, quote: &Quote) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.insert(quote.id(), quote.clone());
        Ok(())
    }

    async fn get(&self, client_id: &ClientId, id: &QuoteId) -> RepositoryResult<Option<Quote>> {
        let storage = self.storage.read().await;
        Ok(storage
            .get(id)
            .filter(|quote| quote.is_owned_by(client_id))
            .cloned())
    }

    async fn list(
        &self,
        client_id: &ClientId,
        filter: &QuoteFilter,
    ) -> RepositoryResult<QuotePage> {
        let storage = self.storage.read().await;

        // Keyset paging: the cursor quote is resolved without the filter so a
        // quote that changed status since the previous page still anchors it.
        let anchor = filter
            .cursor
            .and_then(|cursor| storage.get(&cursor))
            .filter(|quote| quote.is_owned_by(client_id));

        let mut owned: Vec<&Quote> = storage
            .values()
            .filter(|quote| quote.is_owned_by(client_id) && filter.matches(quote))
            .filter(|quote| anchor.is_none_or(|a| newest_first(a, quote).is_lt()))
            .collect();
        owned.sort_by(|a, b| newest_first(a, b));

        let rows: Vec<Quote> = owned
            .into_iter()
            .take(filter.limit.saturating_add(1))
            .cloned()
            .collect();

        Ok(QuotePage::from_overfetch(rows, filter.limit))
    }
}
