//! pn-client: wire types and the phase-diagram API client.

pub mod api;
pub mod error;
pub mod http;
pub mod types;

pub use api::DiagramApi;
pub use error::{GENERIC_ERROR_DETAIL, TransportError, TransportResult, error_detail};
pub use http::HttpClient;
pub use types::*;
