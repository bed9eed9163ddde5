use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use pn_app::{
    AppResult, PhaseTable, ProgressStep, Session, Settings, SubmissionForm, SubmitProgressEvent,
    functional_label,
};
use pn_core::{TemperatureControl, is_valid_api_key};
use tracing::warn;

use crate::submit_worker::{PlotModel, SubmitWorker, WorkerMessage};
use crate::views::{PlotView, TemperatureView, phase_table_view};

const KEY_SAVE_DELAY: Duration = Duration::from_millis(500);

/// Delays saving the API key until typing has paused.
#[derive(Debug, Default)]
struct KeySaveDebounce {
    last_edit: Option<Instant>,
}

impl KeySaveDebounce {
    fn edited(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    /// True once per pause, when the quiet period has elapsed.
    fn fire(&mut self, now: Instant) -> bool {
        match self.last_edit {
            Some(at) if now.duration_since(at) >= KEY_SAVE_DELAY => {
                self.last_edit = None;
                true
            }
            _ => false,
        }
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_edit
            .map(|at| KEY_SAVE_DELAY.saturating_sub(now.duration_since(at)))
    }
}

pub struct PhaseNavApp {
    session: Session,
    formulas: String,
    api_key: String,
    energy_cutoff: String,
    functional: String,
    temperature: TemperatureControl,
    temperature_view: TemperatureView,
    plot_view: PlotView,
    submit_worker: Option<SubmitWorker>,
    key_debounce: KeySaveDebounce,
    loading: bool,
    latest_progress: Option<SubmitProgressEvent>,
    error: Option<String>,
    plot: Option<PlotModel>,
    phase_table: Option<PhaseTable>,
    last_generated: Option<DateTime<Local>>,
}

impl PhaseNavApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> AppResult<Self> {
        let session = Session::from_settings(settings)?;
        let form = session.default_form();
        let api_key = session.restore_api_key().unwrap_or_default();

        Ok(Self {
            formulas: form.formulas,
            api_key,
            energy_cutoff: form.energy_cutoff,
            functional: form.functional,
            session,
            temperature: TemperatureControl::new(),
            temperature_view: TemperatureView::default(),
            plot_view: PlotView::default(),
            submit_worker: None,
            key_debounce: KeySaveDebounce::default(),
            loading: false,
            latest_progress: None,
            error: None,
            plot: None,
            phase_table: None,
            last_generated: None,
        })
    }

    fn form(&self) -> SubmissionForm {
        SubmissionForm {
            formulas: self.formulas.clone(),
            api_key: self.api_key.clone(),
            energy_cutoff: self.energy_cutoff.clone(),
            functional: self.functional.clone(),
            temperature_k: self.temperature.canonical_kelvin(),
        }
    }

    fn start_submit(&mut self) {
        if self.submit_worker.is_some() {
            return;
        }
        self.error = None;
        self.latest_progress = None;
        self.submit_worker = Some(SubmitWorker::start(self.session.clone(), self.form()));
    }

    fn poll_worker(&mut self) {
        let mut completed = false;

        if let Some(worker) = &self.submit_worker {
            while let Ok(msg) = worker.progress_rx.try_recv() {
                match msg {
                    WorkerMessage::Loading(loading) => {
                        self.loading = loading;
                        if loading {
                            self.plot = None;
                            self.phase_table = None;
                        }
                    }
                    WorkerMessage::Progress(event) => {
                        self.latest_progress = Some(event);
                    }
                    WorkerMessage::Error { message } => {
                        self.error = Some(message);
                        self.plot = None;
                        self.phase_table = None;
                    }
                    WorkerMessage::Plot(model) => {
                        self.plot = Some(model);
                    }
                    WorkerMessage::PhaseTable(table) => {
                        self.phase_table = Some(table);
                    }
                    WorkerMessage::HidePhaseTable => {
                        self.phase_table = None;
                    }
                    WorkerMessage::Finished { success } => {
                        if success {
                            self.last_generated = Some(Local::now());
                        }
                        completed = true;
                        break;
                    }
                }
            }
        }

        if completed {
            self.submit_worker = None;
            self.loading = false;
            self.latest_progress = None;
        }
    }

    fn poll_key_save(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.key_debounce.fire(now) {
            let key = self.api_key.trim();
            if is_valid_api_key(key) {
                if let Err(err) = self.session.save_api_key(key) {
                    warn!(error = %err, "could not save API key");
                }
            }
        } else if let Some(wait) = self.key_debounce.remaining(now) {
            ctx.request_repaint_after(wait);
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Inputs");
        ui.add_space(4.0);

        ui.label("Chemical formulas (2-4, comma separated)");
        ui.add(
            egui::TextEdit::singleline(&mut self.formulas)
                .hint_text("Li2O, CoO, O2")
                .desired_width(f32::INFINITY),
        );

        ui.add_space(6.0);
        ui.label("Materials Project API key");
        let key_response = ui.add(
            egui::TextEdit::singleline(&mut self.api_key)
                .password(true)
                .desired_width(f32::INFINITY),
        );
        if key_response.changed() {
            self.key_debounce.edited(Instant::now());
        }
        if !self.api_key.trim().is_empty() && !is_valid_api_key(self.api_key.trim()) {
            ui.colored_label(egui::Color32::from_rgb(0xd9, 0x77, 0x06), "Expected 32 letters and digits");
        }

        ui.add_space(6.0);
        ui.label("Energy cutoff (eV/atom)");
        ui.add(egui::TextEdit::singleline(&mut self.energy_cutoff).desired_width(80.0));

        ui.add_space(6.0);
        ui.label("Functional");
        let options = self.session.settings().supported_functionals.clone();
        egui::ComboBox::from_id_salt("functional")
            .selected_text(functional_label(&self.functional))
            .show_ui(ui, |ui| {
                for option in &options {
                    ui.selectable_value(
                        &mut self.functional,
                        option.clone(),
                        functional_label(option),
                    );
                }
            });

        ui.add_space(6.0);
        ui.separator();
        self.temperature_view.show(ui, &mut self.temperature);
        ui.separator();

        ui.add_enabled_ui(self.submit_worker.is_none(), |ui| {
            let label = if self.loading {
                "Generating..."
            } else {
                "Generate Phase Diagram"
            };
            if ui.button(label).clicked() {
                self.start_submit();
            }
        });
    }

    fn show_progress(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Generating phase diagram...");
        });
        let current = self.latest_progress.as_ref().map(|e| e.step.number()).unwrap_or(0);
        for step in ProgressStep::ALL {
            let text = format!("{}. {}", step.number(), step.label());
            if step.number() < current {
                ui.label(format!("✓ {text}"));
            } else if step.number() == current {
                ui.strong(text);
            } else {
                ui.weak(text);
            }
        }
        if let Some(event) = &self.latest_progress {
            ui.weak(format!("elapsed {:.1}s", event.elapsed_wall_s));
        }
    }
}

impl eframe::App for PhaseNavApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        self.poll_key_save(ctx);
        if self.submit_worker.is_some() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("PhaseNavigator");
                ui.separator();
                ui.weak(self.session.settings().api_base_url.as_str());
                if let Some(at) = &self.last_generated {
                    ui.separator();
                    ui.weak(format!("Last generated {}", at.format("%H:%M:%S")));
                }
            });
        });

        egui::SidePanel::left("inputs")
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.show_form(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.loading {
                self.show_progress(ui);
                return;
            }
            if let Some(error) = &self.error {
                ui.colored_label(egui::Color32::RED, error.as_str());
                return;
            }

            self.plot_view.show(ui, self.plot.as_ref());

            if let Some(table) = &self.phase_table {
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("phase_table")
                    .show(ui, |ui| phase_table_view::show(ui, table));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = KeySaveDebounce::default();
        assert!(!debounce.fire(start));

        debounce.edited(start);
        assert!(!debounce.fire(start + Duration::from_millis(100)));

        // another keystroke restarts the wait
        debounce.edited(start + Duration::from_millis(400));
        assert!(!debounce.fire(start + Duration::from_millis(600)));
        assert!(debounce.fire(start + Duration::from_millis(900)));
        assert!(!debounce.fire(start + Duration::from_millis(2000)));
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut debounce = KeySaveDebounce::default();
        assert_eq!(debounce.remaining(start), None);
        debounce.edited(start);
        assert_eq!(
            debounce.remaining(start + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            debounce.remaining(start + Duration::from_millis(800)),
            Some(Duration::ZERO)
        );
    }
}
