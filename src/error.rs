//! Error types for rs-recipe-miner.
//!
//! This module defines the error types returned by discovery operations.
//! "No signal" outcomes (nothing repeats often enough, no field selected)
//! are not errors; they produce empty results.

/// Error type for discovery operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page or detail URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Fetching a page failed (network error or non-success status).
    #[error("Fetch failed for {url}: {reason}")]
    Fetch {
        /// The URL that was requested.
        url: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// Reading or writing the on-disk page cache failed.
    #[error("Cache I/O failed: {0}")]
    Cache(#[from] std::io::Error),

    /// The page is not cached and the fetcher runs in offline mode.
    #[error("Offline mode: {0} is not cached")]
    Offline(String),

    /// Two different normalized paths produced the same field-name hash.
    ///
    /// Aliasing two fields would corrupt every recipe built from them, so
    /// the current run must not continue.
    #[error("Field name collision: hash {hash:08x} for paths `{first}` and `{second}`")]
    NameCollision {
        /// The colliding 32-bit checksum.
        hash: u32,
        /// The path that claimed the hash first.
        first: String,
        /// The path that collided with it.
        second: String,
    },

    /// A generated selector was rejected by the selector engine.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Serializing preview records failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;
