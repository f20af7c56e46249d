//! Exchange repository for per-request conversation records

use chrono::{DateTime, Utc};

use super::DbPool;
use crate::{Error, Result};

/// One completed request: the user message and the generated reply
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Request identifier, also the audio object's key stem
    pub id: String,
    pub user_input: String,
    pub reply: String,
    pub audio_key: String,
    pub created_at: DateTime<Utc>,
}

/// Exchange repository
#[derive(Clone)]
pub struct ExchangeRepo {
    pool: DbPool,
}

impl ExchangeRepo {
    /// Create a new exchange repository
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record one completed exchange
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn insert(
        &self,
        id: &str,
        user_input: &str,
        reply: &str,
        audio_key: &str,
    ) -> Result<Exchange> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let now = Utc::now();
        let now_str = now.to_rfc3339();

        conn.execute(
            "INSERT INTO exchanges (id, user_input, reply, audio_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            [id, user_input, reply, audio_key, &now_str],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Exchange {
            id: id.to_string(),
            user_input: user_input.to_string(),
            reply: reply.to_string(),
            audio_key: audio_key.to_string(),
            created_at: now,
        })
    }

    /// Look up one exchange by request identifier
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn get(&self, id: &str) -> Result<Option<Exchange>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let exchange = conn
            .query_row(
                "SELECT id, user_input, reply, audio_key, created_at
                 FROM exchanges WHERE id = ?1",
                [id],
                row_to_exchange,
            )
            .ok();

        Ok(exchange)
    }

    /// List the most recent exchanges, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_recent(&self, limit: usize) -> Result<Vec<Exchange>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_input, reply, audio_key, created_at
                 FROM exchanges ORDER BY created_at DESC LIMIT ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let exchanges = stmt
            .query_map([limit], row_to_exchange)
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(exchanges)
    }
}

fn row_to_exchange(row: &rusqlite::Row) -> rusqlite::Result<Exchange> {
    Ok(Exchange {
        id: row.get(0)?,
        user_input: row.get(1)?,
        reply: row.get(2)?,
        audio_key: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

/// Parse an RFC 3339 timestamp, falling back to now on malformed rows
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
