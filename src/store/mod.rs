pub mod answers;
pub mod json_store;
pub mod schema;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
