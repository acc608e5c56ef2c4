
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A PDF recorded in the ingestion ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct IngestedDocument {
    pub id: i64,
    pub path: String,
    pub source: String,
    pub page_count: i64,
    pub chunk_count: i64,
    pub ingested_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIngestedDocument {
    pub path: String,
    pub source: String,
    pub page_count: i64,
    pub chunk_count: i64,
}

impl std::fmt::Display for IngestedDocument {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} pages, {} chunks, ingested {})",
            self.source,
            self.page_count,
            self.chunk_count,
            self.ingested_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
