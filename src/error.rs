// src/error.rs

/// Crate-wide error type.
///
/// All fallible library operations return [`Result<T, Error>`](Result).
/// Store and parse failures wrap their source; the not-found variants let
/// callers distinguish bad input from a broken store.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No curated roadmap with this name, and it is not a topic roadmap.
    #[error("roadmap not found: {0}")]
    RoadmapNotFound(String),

    /// A progress or solution write referenced a problem id the store
    /// does not contain.
    #[error("problem not found: #{0}")]
    ProblemNotFound(i64),
}

pub type Result<T> = std::result::Result<T, Error>;
