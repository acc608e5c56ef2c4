// Database module
// LanceDB holds chunk vectors for similarity search, SQLite keeps the ingestion ledger

pub mod lancedb;
pub mod sqlite;

pub use sqlite::*;
