//! Error types for the pn-app service layer.

use std::path::PathBuf;

use crate::render::{PLOT_UNAVAILABLE_MESSAGE, RenderError};

/// Application error type that wraps errors from the backend crates and
/// gives both front-ends one thing to display.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Shown to the user verbatim.
    #[error(transparent)]
    Validation(#[from] pn_core::ValidationError),

    /// Server detail (or the generic fallback) verbatim.
    #[error(transparent)]
    Transport(#[from] pn_client::TransportError),

    /// Always displays the fixed refresh message; the cause is the source.
    #[error("{}", PLOT_UNAVAILABLE_MESSAGE)]
    Render(#[from] RenderError),

    #[error("Storage error: {0}")]
    Store(#[from] pn_store::StoreError),

    #[error("Failed to load settings from {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pn-app operations.
pub type AppResult<T> = Result<T, AppError>;
