use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use pn_app::{
    PhaseTable, PlotTrace, RenderError, ResultSurface, Session, SubmissionForm,
    SubmitProgressEvent, plot_traces,
};
use pn_client::PlotSpec;

/// Everything the plot panel needs, built off the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotModel {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub traces: Vec<PlotTrace>,
}

impl PlotModel {
    pub fn from_spec(plot: &PlotSpec) -> Result<Self, RenderError> {
        Ok(Self {
            title: plot.title().map(str::to_string),
            x_label: plot.axis_title("xaxis").map(str::to_string),
            y_label: plot.axis_title("yaxis").map(str::to_string),
            traces: plot_traces(plot)?,
        })
    }
}

#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Loading(bool),
    Progress(SubmitProgressEvent),
    Error { message: String },
    Plot(PlotModel),
    PhaseTable(PhaseTable),
    HidePhaseTable,
    Finished { success: bool },
}

/// Forwards surface calls to the UI thread.
struct ChannelSurface {
    tx: Sender<WorkerMessage>,
}

impl ChannelSurface {
    fn send(&self, msg: WorkerMessage) {
        // The UI may have gone away; nothing left to tell it.
        let _ = self.tx.send(msg);
    }
}

impl ResultSurface for ChannelSurface {
    fn set_loading(&mut self, loading: bool) {
        self.send(WorkerMessage::Loading(loading));
    }

    fn show_progress(&mut self, event: &SubmitProgressEvent) {
        self.send(WorkerMessage::Progress(event.clone()));
    }

    fn show_error(&mut self, message: &str) {
        self.send(WorkerMessage::Error {
            message: message.to_string(),
        });
    }

    fn render_plot(&mut self, plot: &PlotSpec) -> Result<(), RenderError> {
        let model = PlotModel::from_spec(plot)?;
        self.tx
            .send(WorkerMessage::Plot(model))
            .map_err(|_| RenderError::BackendUnavailable)
    }

    fn show_phase_table(&mut self, table: &PhaseTable) {
        self.send(WorkerMessage::PhaseTable(table.clone()));
    }

    fn hide_phase_table(&mut self) {
        self.send(WorkerMessage::HidePhaseTable);
    }
}

pub struct SubmitWorker {
    pub progress_rx: Receiver<WorkerMessage>,
    _handle: JoinHandle<()>,
}

impl SubmitWorker {
    pub fn start(session: Session, form: SubmissionForm) -> Self {
        let (tx, rx) = channel();

        let handle = thread::spawn(move || {
            let mut surface = ChannelSurface { tx: tx.clone() };
            let success = session.submit(&form, &mut surface).is_ok();
            let _ = tx.send(WorkerMessage::Finished { success });
        });

        Self {
            progress_rx: rx,
            _handle: handle,
        }
    }
}
