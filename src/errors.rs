use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the HTTP stack, the catalog client and the store
#[derive(Debug, Error)]
pub enum Error {
    #[error("No response from server")]
    NoResponse,
    #[error("Connection reset by peer")]
    ConnectionReset,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// The server answered with a status outside of the 2xx range
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Malformed HTTP message: {0}")]
    Http(#[from] httparse::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Invalid route: {0}")]
    Route(#[from] matchit::InsertError),
}
