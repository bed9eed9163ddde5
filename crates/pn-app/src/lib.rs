//! Shared application service layer for phasenav.
//!
//! Both front-ends go through this crate: settings, the submission
//! orchestrator and the display models for diagram results.

pub mod error;
pub mod progress;
pub mod render;
pub mod settings;
pub mod submit;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use progress::{ProgressStep, SubmitProgressEvent};
pub use render::{
    EnergyClass, EntryCell, EntryLink, PLOT_UNAVAILABLE_MESSAGE, PhaseRow, PhaseTable, PlotTrace,
    PointLabel, RenderError, TraceMode, build_phase_table, plot_traces,
};
pub use settings::{ProgressTiming, Settings, functional_label};
pub use submit::{PreparedSubmission, ResultSurface, Session, SubmissionForm};
