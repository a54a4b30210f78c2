//! # PostgreSQL Quote Repository
//!
//! PostgreSQL implementation of [`QuoteRepository`] using sqlx.
//!
//! Filterable attributes live in their own columns; the full quote is kept
//! as a JSONB document so the entity can evolve without migrations.

use crate::domain::entities::Quote;
use crate::domain::value_objects::{ClientId, QuoteId};
use crate::infrastructure::persistence::traits::{
    QuoteFilter, QuotePage, QuoteRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS quotes (
        quote_id        TEXT   NOT NULL,
        client_id       TEXT   NOT NULL,
        carrier         TEXT   NOT NULL,
        status          TEXT   NOT NULL,
        created_at      BIGINT NOT NULL,
        updated_at      BIGINT,
        correlation_id  TEXT   NOT NULL,
        document        JSONB  NOT NULL,
        PRIMARY KEY (client_id, quote_id)
    )
"#;

const CREATE_LISTING_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS quotes_client_created_idx
        ON quotes (client_id, created_at DESC, quote_id DESC)
"#;

/// PostgreSQL implementation of [`QuoteRepository`].
///
/// # Examples
///
/// ```ignore
/// use shipquote::infrastructure::persistence::postgres::PostgresQuoteRepository;
///
/// let repo = PostgresQuoteRepository::connect("postgres://...", 5).await?;
/// repo.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresQuoteRepository {
    pool: PgPool,
}

impl PostgresQuoteRepository {
    /// Creates a repository over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the database is unreachable.
    pub async fn connect(url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `quotes` table and its listing index if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Query` if a statement fails.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        for statement in [CREATE_TABLE, CREATE_LISTING_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::query(e.to_string()))?;
        }
        Ok(())
    }

    async fn cursor_position(
        &self,
        client_id: &ClientId,
        cursor: &QuoteId,
    ) -> RepositoryResult<Option<(i64, String)>> {
        sqlx::query_as(
            r#"
            SELECT created_at, quote_id
            FROM quotes
            WHERE client_id = $1 AND quote_id = $2
            "#,
        )
        .bind(client_id.as_str())
        .bind(cursor.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))
    }
}

#[async_trait]
impl QuoteRepository for PostgresQuoteRepository {
    async fn save(&self, quote: &Quote) -> RepositoryResult<()> {
        let document = serde_json::to_value(quote)
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                quote_id, client_id, carrier, status,
                created_at, updated_at, correlation_id, document
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (client_id, quote_id) DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at,
                document = EXCLUDED.document
            "#,
        )
        .bind(quote.id().to_string())
        .bind(quote.client_id().as_str())
        .bind(quote.carrier().as_str())
        .bind(quote.status().as_str())
        .bind(quote.created_at().timestamp_millis())
        .bind(quote.updated_at().map(|t| t.timestamp_millis()))
        .bind(quote.correlation_id().as_str())
        .bind(&document)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, client_id: &ClientId, id: &QuoteId) -> RepositoryResult<Option<Quote>> {
        let row: Option<QuoteRow> = sqlx::query_as(
            r#"
            SELECT document
            FROM quotes
            WHERE client_id = $1 AND quote_id = $2
            "#,
        )
        .bind(client_id.as_str())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        row.map(QuoteRow::try_into_quote).transpose()
    }

    async fn list(
        &self,
        client_id: &ClientId,
        filter: &QuoteFilter,
    ) -> RepositoryResult<QuotePage> {
        let cursor = match &filter.cursor {
            Some(cursor) => self.cursor_position(client_id, cursor).await?,
            None => None,
        };

        let mut query = QueryBuilder::<Postgres>::new("SELECT document FROM quotes WHERE client_id = ");
        query.push_bind(client_id.as_str());

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(carrier) = filter.carrier {
            query.push(" AND carrier = ").push_bind(carrier.as_str());
        }
        if let Some(start) = filter.start_date {
            query.push(" AND created_at >= ").push_bind(start.timestamp_millis());
        }
        if let Some(end) = filter.end_date {
            query.push(" AND created_at <= ").push_bind(end.timestamp_millis());
        }
        if let Some((created_at, quote_id)) = cursor {
            query
                .push(" AND (created_at, quote_id) < (")
                .push_bind(created_at)
                .push(", ")
                .push_bind(quote_id)
                .push(")");
        }

        let fetch = i64::try_from(filter.limit.saturating_add(1)).unwrap_or(i64::MAX);
        query
            .push(" ORDER BY created_at DESC, quote_id DESC LIMIT ")
            .push_bind(fetch);

        let rows: Vec<QuoteRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

        let quotes = rows
            .into_iter()
            .map(QuoteRow::try_into_quote)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(QuotePage::from_overfetch(quotes, filter.limit))
    }
}

/// Row type for quote queries.
#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    document: serde_json::Value,
}

impl QuoteRow {
    fn try_into_quote(self) -> RepositoryResult<Quote> {
        serde_json::from_value(self.document)
            .map_err(|e| RepositoryError::serialization(e.to_string()))
    }
}
