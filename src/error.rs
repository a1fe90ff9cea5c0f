use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required element is missing from the document.
    #[error("element not found: {query}")]
    ElementNotFound { query: String },

    #[error("no root node with id {id:?}")]
    UnknownRoot { id: String },

    #[error("no treemap data was received from the opener")]
    NoViewer,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid payload json: {0}")]
    Json(#[from] serde_json::Error),
}
