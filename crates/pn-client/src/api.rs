use crate::error::TransportResult;
use crate::types::{DiagramRequest, DiagramResponse};

/// The remote phase-diagram service, as seen by the front-ends.
pub trait DiagramApi: Send + Sync {
    /// `POST /api/diagrams/` with the credential in `X-API-KEY`.
    fn generate_diagram(
        &self,
        request: &DiagramRequest,
        api_key: &str,
    ) -> TransportResult<DiagramResponse>;

    /// `GET /api/health/`. Liveness only; the body is returned unparsed.
    fn check_health(&self) -> TransportResult<serde_json::Value>;
}
