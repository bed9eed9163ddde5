//! Submission orchestration shared by the CLI and the GUI.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pn_client::{DiagramApi, DiagramRequest, DiagramResponse, HttpClient, PlotSpec};
use pn_core::{
    TemperatureUnit, key_fingerprint, parse_energy_cutoff, validate_api_key, validate_formulas,
    validate_temperature,
};
use pn_store::{LocalStorage, Storage};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::progress::{ProgressStep, SubmitProgressEvent};
use crate::render::{PhaseTable, RenderError, build_phase_table};
use crate::settings::Settings;

/// Where a submission shows its state. Implemented by each front-end.
pub trait ResultSurface {
    fn set_loading(&mut self, loading: bool);

    fn show_progress(&mut self, event: &SubmitProgressEvent);

    /// Replaces the result area with `message` and hides the phase table.
    fn show_error(&mut self, message: &str);

    fn render_plot(&mut self, plot: &PlotSpec) -> Result<(), RenderError>;

    fn show_phase_table(&mut self, table: &PhaseTable);

    fn hide_phase_table(&mut self);
}

/// Raw form values as the user left them.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    /// Comma separated.
    pub formulas: String,
    pub api_key: String,
    /// Free text; unreadable text falls back to the default cutoff.
    pub energy_cutoff: String,
    pub functional: String,
    /// Canonical Kelvin value from the temperature control (0 = none).
    pub temperature_k: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSubmission {
    pub request: DiagramRequest,
    pub api_key: String,
}

/// One front-end's connection to the diagram service and local storage.
#[derive(Clone)]
pub struct Session {
    settings: Arc<Settings>,
    api: Arc<dyn DiagramApi>,
    storage: Arc<dyn Storage>,
}

impl Session {
    pub fn new(settings: Settings, api: Arc<dyn DiagramApi>, storage: Arc<dyn Storage>) -> Self {
        Self {
            settings: Arc::new(settings),
            api,
            storage,
        }
    }

    /// HTTP client on `api_base_url`, file storage under `storage_dir`.
    pub fn from_settings(settings: Settings) -> AppResult<Self> {
        let api = HttpClient::new(&settings.api_base_url)?;
        let storage = LocalStorage::new(settings.storage_dir.clone())?;
        info!(
            api = %api.base_url(),
            storage = %storage.root_dir().display(),
            "session ready"
        );
        Ok(Self::new(settings, Arc::new(api), Arc::new(storage)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A blank form carrying the configured defaults.
    pub fn default_form(&self) -> SubmissionForm {
        SubmissionForm {
            formulas: String::new(),
            api_key: String::new(),
            energy_cutoff: self.settings.default_energy_cutoff.to_string(),
            functional: self.settings.default_functional.clone(),
            temperature_k: 0,
        }
    }

    pub fn restore_api_key(&self) -> Option<String> {
        pn_store::restore_api_key(self.storage.as_ref())
    }

    /// Stores `api_key` only if it has the right shape.
    pub fn save_api_key(&self, api_key: &str) -> AppResult<()> {
        let api_key = validate_api_key(api_key)?;
        pn_store::save_api_key(self.storage.as_ref(), api_key)?;
        Ok(())
    }

    pub fn clear_api_key(&self) -> AppResult<()> {
        pn_store::clear_api_key(self.storage.as_ref())?;
        info!("stored API key cleared");
        Ok(())
    }

    pub fn check_health(&self) -> AppResult<serde_json::Value> {
        Ok(self.api.check_health()?)
    }

    /// Validates the form in display order; the first problem wins.
    pub fn prepare(&self, form: &SubmissionForm) -> AppResult<PreparedSubmission> {
        let formulas = validate_formulas(&form.formulas)?;
        let api_key = validate_api_key(&form.api_key)?.to_string();
        let e_cut = parse_energy_cutoff(
            &form.energy_cutoff,
            self.settings.default_energy_cutoff,
            self.settings.max_energy_cutoff,
        )?;
        validate_temperature(i64::from(form.temperature_k), TemperatureUnit::Kelvin)?;

        Ok(PreparedSubmission {
            request: DiagramRequest {
                formulas,
                temperature_k: form.temperature_k,
                e_cut,
                functional: form.functional.trim().to_string(),
            },
            api_key,
        })
    }

    /// Runs one submission end to end, reporting through `surface`.
    ///
    /// Every failure is shown on the surface before it is returned, and
    /// loading is always cleared on the way out.
    pub fn submit(
        &self,
        form: &SubmissionForm,
        surface: &mut dyn ResultSurface,
    ) -> AppResult<DiagramResponse> {
        let result = self
            .prepare(form)
            .and_then(|prepared| self.submit_prepared(&prepared, surface));

        if let Err(err) = &result {
            warn!(error = %err, "submission failed");
            surface.show_error(&err.to_string());
        }
        surface.set_loading(false);
        result
    }

    fn submit_prepared(
        &self,
        prepared: &PreparedSubmission,
        surface: &mut dyn ResultSurface,
    ) -> AppResult<DiagramResponse> {
        if let Err(err) = pn_store::save_api_key(self.storage.as_ref(), &prepared.api_key) {
            warn!(error = %err, "could not persist API key");
        }

        let request = &prepared.request;
        info!(
            formulas = ?request.formulas,
            temperature_k = request.temperature_k,
            e_cut = request.e_cut,
            functional = %request.functional,
            key = %key_fingerprint(&prepared.api_key),
            "submitting diagram request"
        );

        surface.set_loading(true);
        let started = Instant::now();
        let timing = self.settings.progress;

        emit_progress(surface, ProgressStep::ValidatingFormulas, started);
        pause(timing.after_validating());

        emit_progress(surface, ProgressStep::FetchingData, started);
        pause(timing.before_fetching());

        let response = self.api.generate_diagram(request, &prepared.api_key)?;

        emit_progress(surface, ProgressStep::BuildingDiagram, started);
        pause(timing.after_building());

        surface.render_plot(&response.plot)?;
        emit_progress(surface, ProgressStep::RenderingPlot, started);

        match build_phase_table(&response.phase_info, &response.metadata) {
            Some(table) => surface.show_phase_table(&table),
            None => surface.hide_phase_table(),
        }

        info!(
            phases = response.phase_info.len(),
            traces = response.plot.data.len(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "diagram rendered"
        );
        Ok(response)
    }
}

fn emit_progress(surface: &mut dyn ResultSurface, step: ProgressStep, started: Instant) {
    let event = SubmitProgressEvent::step(step, started.elapsed().as_secs_f64());
    debug!(step = step.number(), label = step.label(), "progress");
    surface.show_progress(&event);
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_base_url", &self.settings.api_base_url)
            .finish_non_exhaustive()
    }
}
