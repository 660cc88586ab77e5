//! MySQL-backed corpus store.
//!
//! Source tables share the schema `content, title, tag, link, summery, sourse`
//! (the last two spellings are the stored column names). The initial load and
//! every reload run the same union query.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::debug;

use super::entry::CorpusEntry;
use super::error::{CorpusError, CorpusResult};
use super::store::CorpusStore;

const SELECT_COLUMNS: &str = "content, title, tag, link, summery, sourse";

/// Corpus store over a lazily connected MySQL pool.
#[derive(Clone)]
pub struct MySqlCorpusStore {
    pool: MySqlPool,
    tables: Vec<String>,
    query: String,
}

impl std::fmt::Debug for MySqlCorpusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlCorpusStore")
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

impl MySqlCorpusStore {
    /// Creates the pool without connecting; the first query opens connections.
    pub fn connect_lazy(
        url: &str,
        tables: &[String],
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> CorpusResult<Self> {
        let query = build_union_query(tables)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;

        Ok(Self {
            pool,
            tables: tables.to_vec(),
            query,
        })
    }

}

#[async_trait]
impl CorpusStore for MySqlCorpusStore {
    async fn fetch_all(&self) -> CorpusResult<Vec<CorpusEntry>> {
        let rows = sqlx::query(self.query.as_str())
            .fetch_all(&self.pool)
            .await?;

        debug!(rows = rows.len(), "Fetched corpus rows");

        rows.iter().map(row_to_entry).collect()
    }

    fn describe(&self) -> String {
        format!("mysql [{}]", self.tables.join(", "))
    }
}

fn row_to_entry(row: &MySqlRow) -> CorpusResult<CorpusEntry> {
    let text = |column: &str| -> CorpusResult<String> {
        Ok(row
            .try_get::<Option<String>, _>(column)?
            .unwrap_or_default())
    };

    Ok(CorpusEntry {
        content: text("content")?,
        title: text("title")?,
        tag: text("tag")?,
        link: text("link")?,
        summary: text("summery")?,
        source: text("sourse")?,
    })
}

/// Returns `true` for names safe to splice into SQL (MySQL identifier limit, no quoting).
pub fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builds `SELECT .. FROM a UNION SELECT .. FROM b ..`.
///
/// `UNION` (not `UNION ALL`) drops rows duplicated across sources.
pub fn build_union_query(tables: &[String]) -> CorpusResult<String> {
    if tables.is_empty() {
        return Err(CorpusError::InvalidTable {
            name: String::new(),
        });
    }

    if let Some(bad) = tables.iter().find(|t| !is_valid_table_name(t)) {
        return Err(CorpusError::InvalidTable { name: bad.clone() });
    }

    Ok(tables
        .iter()
        .map(|table| format!("SELECT {} FROM `{}`", SELECT_COLUMNS, table))
        .collect::<Vec<_>>()
        .join(" UNION "))
}
