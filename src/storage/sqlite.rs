use crate::classifier::Sentiment;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        sentiment TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

/// A stored review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub text: String,
    pub sentiment: Sentiment,
    pub created_at: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("review {id} has unrecognised sentiment {value:?}")]
    CorruptRecord { id: i64, value: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Review table backed by a SQLite file.
///
/// Holds only the database path. Every operation opens its own connection,
/// which is closed when it goes out of scope on both success and error paths.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    path: PathBuf,
}

impl ReviewStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Create the reviews table if it is absent. Safe to call on every start.
    pub fn ensure_schema(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;

        info!(path = ?self.path, "Review table ready");
        Ok(())
    }

    /// Append a review and return its new id
    pub fn insert(&self, text: &str, sentiment: Sentiment, created_at: &str) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO reviews (text, sentiment, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![text, sentiment.as_str(), created_at],
        )?;
        let id = conn.last_insert_rowid();

        debug!(id, %sentiment, "Inserted review row");
        Ok(id)
    }

    /// All reviews in insertion order, optionally restricted to one sentiment.
    pub fn list(&self, sentiment: Option<Sentiment>) -> Result<Vec<Review>> {
        let conn = self.connect()?;

        let raw = match sentiment {
            Some(sentiment) => {
                let mut stmt = conn.prepare(
                    "SELECT id, text, sentiment, created_at FROM reviews WHERE sentiment = ?1 ORDER BY id",
                )?;
                let rows = stmt.query_map([sentiment.as_str()], RawReview::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT id, text, sentiment, created_at FROM reviews ORDER BY id")?;
                let rows = stmt.query_map([], RawReview::from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        raw.into_iter().map(RawReview::into_review).collect()
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Row as read from SQLite, before the sentiment column is validated
struct RawReview {
    id: i64,
    text: String,
    sentiment: String,
    created_at: String,
}

impl RawReview {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            sentiment: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_review(self) -> Result<Review> {
        let sentiment = self
            .sentiment
            .parse::<Sentiment>()
            .map_err(|_| StorageError::CorruptRecord {
                id: self.id,
                value: self.sentiment.clone(),
            })?;

        Ok(Review {
            id: self.id,
            text: self.text,
            sentiment,
            created_at: self.created_at,
        })
    }
}
