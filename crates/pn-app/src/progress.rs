use std::fmt;

/// Optimistic markers shown while a submission is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    ValidatingFormulas,
    FetchingData,
    BuildingDiagram,
    RenderingPlot,
}

impl ProgressStep {
    pub const ALL: [ProgressStep; 4] = [
        ProgressStep::ValidatingFormulas,
        ProgressStep::FetchingData,
        ProgressStep::BuildingDiagram,
        ProgressStep::RenderingPlot,
    ];

    /// 1-based position, for "step n of 4" displays.
    pub fn number(self) -> usize {
        match self {
            ProgressStep::ValidatingFormulas => 1,
            ProgressStep::FetchingData => 2,
            ProgressStep::BuildingDiagram => 3,
            ProgressStep::RenderingPlot => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressStep::ValidatingFormulas => "Validating input formulas...",
            ProgressStep::FetchingData => "Fetching data from Materials Project...",
            ProgressStep::BuildingDiagram => "Building phase diagram...",
            ProgressStep::RenderingPlot => "Rendering interactive plot...",
        }
    }
}

impl fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitProgressEvent {
    pub step: ProgressStep,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl SubmitProgressEvent {
    pub fn step(step: ProgressStep, elapsed_wall_s: f64) -> Self {
        Self {
            step,
            elapsed_wall_s,
            message: None,
        }
    }

    /// `message` when set, else the step label.
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or(self.step.label())
    }
}
