//! pn-store: local key/value storage and credential persistence.

pub mod credential;
pub mod local;

pub use credential::{API_KEY_STORAGE_KEY, clear_api_key, restore_api_key, save_api_key};
pub use local::{LocalStorage, MemoryStorage, Storage};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credential cannot be stored: {0}")]
    Codec(#[from] pn_core::CodecError),

    #[error("Invalid storage path: {message}")]
    InvalidPath { message: String },
}
