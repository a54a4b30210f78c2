//! # Repository Traits
//!
//! Port definitions for quote persistence.
//!
//! Implementations can use different backends such as PostgreSQL or
//! in-memory storage. Every lookup is scoped to the owning client: a quote
//! owned by another client is indistinguishable from a missing one.
//!
//! # Examples
//!
//! ```ignore
//! use shipquote::infrastructure::persistence::traits::{QuoteFilter, QuoteRepository};
//!
//! async fn latest(repo: &dyn QuoteRepository, client: &ClientId) {
//!     let page = repo.list(client, &QuoteFilter::default()).await.unwrap();
//!     println!("{} quotes, next cursor {:?}", page.quotes.len(), page.next_cursor);
//! }
//! ```

use crate::domain::entities::Quote;
use crate::domain::value_objects::{Carrier, ClientId, QuoteId, QuoteStatus, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Default page size of a quote listing.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a listing may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Filters and pagination for a quote listing.
///
/// Date bounds are inclusive. `cursor` is the id of the last quote of the
/// previous page; an unknown cursor is ignored and the listing starts from
/// the newest quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFilter {
    /// Only quotes in this status.
    pub status: Option<QuoteStatus>,
    /// Only quotes for this carrier.
    pub carrier: Option<Carrier>,
    /// Only quotes created at or after this instant.
    pub start_date: Option<Timestamp>,
    /// Only quotes created at or before this instant.
    pub end_date: Option<Timestamp>,
    /// Resume after this quote.
    pub cursor: Option<QuoteId>,
    /// Page size.
    pub limit: usize,
}

impl Default for QuoteFilter {
    fn default() -> Self {
        Self {
            status: None,
            carrier: None,
            start_date: None,
            end_date: None,
            cursor: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QuoteFilter {
    /// Returns true if `quote` passes the equality and date filters.
    ///
    /// Ownership and the cursor are not considered.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        self.status.is_none_or(|s| quote.status() == s)
            && self.carrier.is_none_or(|c| quote.carrier() == c)
            && self.start_date.is_none_or(|start| quote.created_at() >= start)
            && self.end_date.is_none_or(|end| quote.created_at() <= end)
    }
}

/// Listing order: newest first, quote id descending on equal timestamps.
#[must_use]
pub fn newest_first(a: &Quote, b: &Quote) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(&a.id()))
}

/// One page of a quote listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePage {
    /// Quotes in listing order.
    pub quotes: Vec<Quote>,
    /// Cursor for the next page, absent on the last page.
    pub next_cursor: Option<QuoteId>,
}

impl QuotePage {
    /// Builds a page from up to `limit + 1` ordered rows.
    ///
    /// The extra row, when present, only signals that another page exists.
    #[must_use]
    pub fn from_overfetch(mut rows: Vec<Quote>, limit: usize) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(Quote::id)
        } else {
            None
        };
        Self {
            quotes: rows,
            next_cursor,
        }
    }
}

/// Repository for quotes.
#[async_trait]
pub trait QuoteRepository: Send + Sync + fmt::Debug {
    /// Inserts or replaces a quote.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the save fails.
    async fn save(&self, quote: &Quote) -> RepositoryResult<()>;

    /// Finds a quote owned by `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn get(&self, client_id: &ClientId, id: &QuoteId) -> RepositoryResult<Option<Quote>>;

    /// Lists quotes owned by `client_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list(&self, client_id: &ClientId, filter: &QuoteFilter)
    -> RepositoryResult<QuotePage>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{Dimensions, ShipmentRequest};
    use crate::domain::value_objects::CorrelationId;
    use rust_decimal::Decimal;

    fn quote_at(millis: i64) -> Quote {
        let shipment = ShipmentRequest::builder(
            "01310100",
            "04547000",
            Decimal::ONE,
            Dimensions::new(Decimal::ONE, Decimal::ONE, Decimal::ONE),
        )
        .build()
        .unwrap();
        Quote::processing(
            ClientId::new("c"),
            Carrier::Frenet,
            shipment,
            CorrelationId::new("x"),
        )
        .with_created_at(Timestamp::from_millis(millis).unwrap())
    }

    #[test]
    fn filter_matches_dates_inclusively() {
        let quote = quote_at(1_000);
        let filter = QuoteFilter {
            start_date: Timestamp::from_millis(1_000),
            end_date: Timestamp::from_millis(1_000),
            ..QuoteFilter::default()
        };
        assert!(filter.matches(&quote));

        let later = QuoteFilter {
            start_date: Timestamp::from_millis(1_001),
            ..QuoteFilter::default()
        };
        assert!(!later.matches(&quote));
    }

    #[test]
    fn filter_matches_status() {
        let quote = quote_at(1_000);
        let filter = QuoteFilter {
            status: Some(QuoteStatus::Success),
            ..QuoteFilter::default()
        };
        assert!(!filter.matches(&quote));
    }

    #[test]
    fn newest_first_orders_by_time() {
        let mut quotes = vec![quote_at(1), quote_at(3), quote_at(2)];
        quotes.sort_by(newest_first);
        let times: Vec<i64> = quotes.iter().map(|q| q.created_at().timestamp_millis()).collect();
        assert_eq!(times, vec![3, 2, 1]);
    }

    #[test]
    fn page_from_overfetch() {
        let rows = vec![quote_at(3), quote_at(2), quote_at(1)];
        let expected_cursor = rows[1].id();

        let page = QuotePage::from_overfetch(rows.clone(), 2);
        assert_eq!(page.quotes.len(), 2);
        assert_eq!(page.next_cursor, Some(expected_cursor));

        let last = QuotePage::from_overfetch(rows, 3);
        assert_eq!(last.quotes.len(), 3);
        assert!(last.next_cursor.is_none());
    }
}
