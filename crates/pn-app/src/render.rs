//! Display models for a diagram response: the phase table and drawable plot
//! traces. Toolkit-free; the front-ends only draw what is built here.

use std::sync::OnceLock;

use pn_client::{DiagramMetadata, PhaseRecord, PlotSpec};
use pn_core::kelvin_to_celsius;
use regex::Regex;
use serde_json::Value;

pub const PLOT_UNAVAILABLE_MESSAGE: &str = "Plot library unavailable. Please refresh the page.";

pub const MATERIALS_PROJECT_URL: &str = "https://materialsproject.org/materials";

/// Functional tags the database appends to entry ids.
const FUNCTIONAL_TAG_PATTERN: &str = r"(?i)-r2scan|-gga\+u|-scan|-pbe|-hsesol";

const CORRECTED_NOTE: &str = "Some phases include DFT energy corrections.";
const UNCORRECTED_NOTE: &str = "No energy corrections applied (all phases are reference states).";

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("No plotting backend available")]
    BackendUnavailable,

    #[error("Plot trace {index} is not an object")]
    InvalidTrace { index: usize },
}

// ---------------------------------------------------------------------------
// Phase table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyClass {
    Positive,
    Negative,
    Zero,
}

impl EnergyClass {
    /// Missing values count as zero.
    pub fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > 0.0 => EnergyClass::Positive,
            Some(v) if v < 0.0 => EnergyClass::Negative,
            _ => EnergyClass::Zero,
        }
    }
}

/// Four decimals, or "N/A".
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "N/A".to_string(),
    }
}

fn functional_tags() -> Option<&'static Regex> {
    static FUNCTIONAL_TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
    FUNCTIONAL_TAG_RE
        .get_or_init(|| Regex::new(FUNCTIONAL_TAG_PATTERN).ok())
        .as_ref()
}

/// Entry id with functional tags removed; `Unknown` is returned unchanged.
pub fn clean_entry_id(id: &str) -> String {
    if id.is_empty() || id == "Unknown" {
        return id.to_string();
    }
    match functional_tags() {
        Some(re) => re.replace_all(id, "").into_owned(),
        None => id.to_string(),
    }
}

/// First functional tag in the id, e.g. `-GGA+U`, or "".
pub fn functional_suffix(id: &str) -> &str {
    if id.is_empty() || id == "Unknown" {
        return "";
    }
    functional_tags()
        .and_then(|re| re.find(id))
        .map_or("", |m| m.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryLink {
    pub clean_id: String,
    pub suffix: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryCell {
    Link(EntryLink),
    Plain(String),
}

impl EntryCell {
    /// `mp-` and `mvc-` ids link to the database; anything else is plain text.
    pub fn from_entry_id(id: &str) -> Self {
        if !(id.starts_with("mp-") || id.starts_with("mvc-")) {
            return EntryCell::Plain(id.to_string());
        }
        let clean_id = clean_entry_id(id);
        let suffix = functional_suffix(id).to_string();
        let computed_with = if suffix.is_empty() {
            "standard functional".to_string()
        } else {
            suffix.replacen('-', "", 1)
        };
        EntryCell::Link(EntryLink {
            url: format!("{MATERIALS_PROJECT_URL}/{clean_id}/"),
            title: format!("View {clean_id} on Materials Project (computed with {computed_with})"),
            clean_id,
            suffix,
        })
    }

    pub fn text(&self) -> String {
        match self {
            EntryCell::Link(link) => format!("{}{}", link.clean_id, link.suffix),
            EntryCell::Plain(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRow {
    pub formula: String,
    pub composition: String,
    pub formation_energy: String,
    pub energy_class: EnergyClass,
    pub energy_per_atom: String,
    pub correction: String,
    pub correction_tooltip: &'static str,
    pub entry: EntryCell,
}

impl PhaseRow {
    pub fn from_record(record: &PhaseRecord) -> Self {
        let correction_tooltip = if record.correction != 0.0 {
            "Energy correction for DFT systematic errors"
        } else {
            "No energy correction applied"
        };
        Self {
            formula: record.formula.clone(),
            composition: record.composition.clone(),
            formation_energy: format_number(record.formation_energy_per_atom),
            energy_class: EnergyClass::of(record.formation_energy_per_atom),
            energy_per_atom: format_number(record.energy_per_atom),
            correction: format_number(Some(record.correction)),
            correction_tooltip,
            entry: EntryCell::from_entry_id(&record.entry_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    /// "(N phases)"
    pub count_label: String,
    pub temperature_text: String,
    pub functional: String,
    pub energy_cutoff: String,
    pub correction_note: &'static str,
    pub rows: Vec<PhaseRow>,
}

impl PhaseTable {
    pub fn summary(&self) -> String {
        format!(
            "Temperature = {}, Functional = {}, Energy cutoff = {} eV/atom",
            self.temperature_text, self.functional, self.energy_cutoff
        )
    }
}

/// "0 K", or "T K (C°C)" with Celsius rounded.
pub fn temperature_text(kelvin: u32) -> String {
    if kelvin == 0 {
        "0 K".to_string()
    } else {
        let celsius = kelvin_to_celsius(f64::from(kelvin)).round() as i64;
        format!("{kelvin} K ({celsius}°C)")
    }
}

/// `None` when there is nothing to show; the table is then hidden.
pub fn build_phase_table(phases: &[PhaseRecord], metadata: &DiagramMetadata) -> Option<PhaseTable> {
    if phases.is_empty() {
        return None;
    }
    let corrected = phases.iter().any(|p| p.correction != 0.0);
    Some(PhaseTable {
        count_label: format!("({} phases)", phases.len()),
        temperature_text: temperature_text(metadata.temperature),
        functional: metadata
            .functional
            .clone()
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        energy_cutoff: metadata.e_cut.unwrap_or(0.0).to_string(),
        correction_note: if corrected {
            CORRECTED_NOTE
        } else {
            UNCORRECTED_NOTE
        },
        rows: phases.iter().map(PhaseRow::from_record).collect(),
    })
}

// ---------------------------------------------------------------------------
// Plot traces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMode {
    Lines,
    Markers,
    LinesMarkers,
}

impl TraceMode {
    fn parse(mode: Option<&str>) -> Self {
        let mode = mode.unwrap_or("lines+markers");
        match (mode.contains("lines"), mode.contains("markers")) {
            (true, false) => TraceMode::Lines,
            (false, true) => TraceMode::Markers,
            // text-only traces are drawn as labelled markers
            (false, false) => TraceMode::Markers,
            (true, true) => TraceMode::LinesMarkers,
        }
    }

    pub fn has_lines(self) -> bool {
        matches!(self, TraceMode::Lines | TraceMode::LinesMarkers)
    }

    pub fn has_markers(self) -> bool {
        matches!(self, TraceMode::Markers | TraceMode::LinesMarkers)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLabel {
    pub at: [f64; 2],
    pub text: String,
}

/// One Plotly trace reduced to what a 2-D plot can draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotTrace {
    pub name: Option<String>,
    pub mode: TraceMode,
    /// Runs of points between null gaps.
    pub segments: Vec<Vec<[f64; 2]>>,
    pub labels: Vec<PointLabel>,
    pub color: Option<[u8; 3]>,
    pub show_legend: bool,
}

impl PlotTrace {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

fn number_array(trace: &Value, key: &str) -> Vec<Option<f64>> {
    trace
        .get(key)
        .and_then(Value::as_array)
        .map(|values| values.iter().map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// `#rrggbb` or `rgb(r, g, b)`.
fn parse_color(text: &str) -> Option<[u8; 3]> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some([channel(0)?, channel(2)?, channel(4)?]);
    }
    let inner = text
        .strip_prefix("rgba(")
        .or_else(|| text.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<f64>().ok());
    let mut channel = || parts.next().flatten().map(|v| v.clamp(0.0, 255.0) as u8);
    Some([channel()?, channel()?, channel()?])
}

fn trace_color(trace: &Value) -> Option<[u8; 3]> {
    ["line", "marker"]
        .iter()
        .filter_map(|key| trace.get(key)?.get("color")?.as_str())
        .find_map(parse_color)
}

fn convert_trace(trace: &Value) -> PlotTrace {
    // z, when present, is dropped: 3-D traces are drawn as their x/y projection
    let xs = number_array(trace, "x");
    let ys = number_array(trace, "y");
    let texts: Vec<Option<&str>> = trace
        .get("text")
        .and_then(Value::as_array)
        .map(|t| t.iter().map(Value::as_str).collect())
        .unwrap_or_default();

    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut labels = Vec::new();
    for (i, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
        match (x, y) {
            (Some(x), Some(y)) => {
                current.push([*x, *y]);
                if let Some(Some(text)) = texts.get(i) {
                    if !text.is_empty() {
                        labels.push(PointLabel {
                            at: [*x, *y],
                            text: (*text).to_string(),
                        });
                    }
                }
            }
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    PlotTrace {
        name: trace.get("name").and_then(Value::as_str).map(str::to_string),
        mode: TraceMode::parse(trace.get("mode").and_then(Value::as_str)),
        segments,
        labels,
        color: trace_color(trace),
        show_legend: trace
            .get("showlegend")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    }
}

/// Converts every trace of `plot`. Traces with no finite points are dropped.
pub fn plot_traces(plot: &PlotSpec) -> Result<Vec<PlotTrace>, RenderError> {
    let mut traces = Vec::with_capacity(plot.data.len());
    for (index, trace) in plot.data.iter().enumerate() {
        if !trace.is_object() {
            return Err(RenderError::InvalidTrace { index });
        }
        let converted = convert_trace(trace);
        if converted.point_count() > 0 {
            traces.push(converted);
        }
    }
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(entry_id: &str, formation: Option<f64>, correction: f64) -> PhaseRecord {
        PhaseRecord {
            formula: "Fe2O3".to_string(),
            composition: "Fe2 O3".to_string(),
            energy_per_atom: Some(-6.85123456),
            formation_energy_per_atom: formation,
            correction,
            entry_id: entry_id.to_string(),
            total_energy: None,
            temperature: None,
            num_atoms: None,
        }
    }

    #[test]
    fn energy_classes() {
        assert_eq!(EnergyClass::of(Some(0.1)), EnergyClass::Positive);
        assert_eq!(EnergyClass::of(Some(-1.7)), EnergyClass::Negative);
        assert_eq!(EnergyClass::of(Some(0.0)), EnergyClass::Zero);
        assert_eq!(EnergyClass::of(None), EnergyClass::Zero);
    }

    #[test]
    fn numbers_have_four_decimals() {
        assert_eq!(format_number(Some(-6.85123456)), "-6.8512");
        assert_eq!(format_number(Some(0.0)), "0.0000");
        assert_eq!(format_number(None), "N/A");
    }

    #[test]
    fn functional_tags_are_stripped_case_insensitively() {
        assert_eq!(clean_entry_id("mp-19770-GGA+U"), "mp-19770");
        assert_eq!(functional_suffix("mp-19770-GGA+U"), "-GGA+U");
        assert_eq!(clean_entry_id("mp-1234-R2SCAN"), "mp-1234");
        assert_eq!(functional_suffix("mp-1234-R2SCAN"), "-R2SCAN");
        assert_eq!(clean_entry_id("mvc-42-PBE"), "mvc-42");
        assert_eq!(clean_entry_id("mp-12"), "mp-12");
        assert_eq!(functional_suffix("mp-12"), "");
        assert_eq!(clean_entry_id("Unknown"), "Unknown");
        assert_eq!(functional_suffix("Unknown"), "");
    }

    #[test]
    fn every_tag_is_removed_but_first_is_reported() {
        assert!(functional_tags().is_some());
        assert_eq!(clean_entry_id("mp-1-scan-pbe"), "mp-1");
        assert_eq!(functional_suffix("mp-1-scan-pbe"), "-scan");
        assert_eq!(clean_entry_id("mp-5-Hsesol-x"), "mp-5-x");
        assert_eq!(functional_suffix("mp-5-Hsesol-x"), "-Hsesol");
        // the longer tag wins where both start
        assert_eq!(functional_suffix("mp-7-r2SCAN"), "-r2SCAN");
    }

    #[test]
    fn database_ids_become_links() {
        match EntryCell::from_entry_id("mp-19770-GGA+U") {
            EntryCell::Link(link) => {
                assert_eq!(link.url, "https://materialsproject.org/materials/mp-19770/");
                assert_eq!(link.suffix, "-GGA+U");
                assert_eq!(
                    link.title,
                    "View mp-19770 on Materials Project (computed with GGA+U)"
                );
            }
            other => panic!("expected link, got {other:?}"),
        }
        match EntryCell::from_entry_id("mp-5") {
            EntryCell::Link(link) => assert!(link.title.ends_with("(computed with standard functional)")),
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn other_ids_stay_plain() {
        assert_eq!(
            EntryCell::from_entry_id("Unknown"),
            EntryCell::Plain("Unknown".to_string())
        );
        assert_eq!(
            EntryCell::from_entry_id("oqmd-77"),
            EntryCell::Plain("oqmd-77".to_string())
        );
    }

    #[test]
    fn table_summary_and_correction_note() {
        let metadata = DiagramMetadata {
            temperature: 1000,
            functional: Some("R2SCAN".to_string()),
            e_cut: Some(0.2),
            ..Default::default()
        };
        let phases = vec![
            record("mp-19770-GGA+U", Some(-1.7), -0.68),
            record("Unknown", None, 0.0),
        ];
        let table = build_phase_table(&phases, &metadata).unwrap();
        assert_eq!(table.count_label, "(2 phases)");
        assert_eq!(
            table.summary(),
            "Temperature = 1000 K (727°C), Functional = R2SCAN, Energy cutoff = 0.2 eV/atom"
        );
        assert_eq!(table.correction_note, CORRECTED_NOTE);
        assert_eq!(table.rows[0].energy_class, EnergyClass::Negative);
        assert_eq!(table.rows[0].correction, "-0.6800");
        assert_eq!(table.rows[1].formation_energy, "N/A");
        assert_eq!(table.rows[1].correction_tooltip, "No energy correction applied");
    }

    #[test]
    fn uncorrected_table_with_missing_metadata() {
        let phases = vec![record("mp-1", Some(0.0), 0.0)];
        let table = build_phase_table(&phases, &DiagramMetadata::default()).unwrap();
        assert_eq!(table.temperature_text, "0 K");
        assert_eq!(table.functional, "Unknown");
        assert_eq!(table.energy_cutoff, "0");
        assert_eq!(table.correction_note, UNCORRECTED_NOTE);
    }

    #[test]
    fn empty_phase_list_hides_table() {
        assert!(build_phase_table(&[], &DiagramMetadata::default()).is_none());
    }

    #[test]
    fn traces_split_on_null_gaps() {
        let plot = PlotSpec {
            data: vec![json!({
                "type": "scatter", "mode": "lines", "name": "tie lines",
                "x": [0.0, 1.0, null, 0.5, 0.75],
                "y": [0.0, -1.0, null, -0.5, 0.0],
                "line": {"color": "#1f77b4"}
            })],
            layout: json!({}),
        };
        let traces = plot_traces(&plot).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].segments.len(), 2);
        assert_eq!(traces[0].point_count(), 4);
        assert_eq!(traces[0].mode, TraceMode::Lines);
        assert_eq!(traces[0].color, Some([0x1f, 0x77, 0xb4]));
    }

    #[test]
    fn three_d_traces_are_projected_and_labelled() {
        let plot = PlotSpec {
            data: vec![json!({
                "type": "scatter3d", "mode": "markers+text",
                "x": [0.1, 0.2], "y": [0.3, 0.4], "z": [-1.0, -2.0],
                "text": ["Li2O", ""],
                "marker": {"color": "rgb(255, 0, 10)"}
            })],
            layout: json!({}),
        };
        let traces = plot_traces(&plot).unwrap();
        assert_eq!(traces[0].segments, vec![vec![[0.1, 0.3], [0.2, 0.4]]]);
        assert_eq!(traces[0].mode, TraceMode::Markers);
        assert_eq!(traces[0].labels.len(), 1);
        assert_eq!(traces[0].labels[0].text, "Li2O");
        assert_eq!(traces[0].color, Some([255, 0, 10]));
    }

    #[test]
    fn empty_traces_are_dropped_and_garbage_rejected() {
        let empty = PlotSpec {
            data: vec![json!({"x": [], "y": []})],
            layout: json!({}),
        };
        assert!(plot_traces(&empty).unwrap().is_empty());

        let garbage = PlotSpec {
            data: vec![json!({"x": [1], "y": [1]}), json!(42)],
            layout: json!({}),
        };
        assert_eq!(
            plot_traces(&garbage),
            Err(RenderError::InvalidTrace { index: 1 })
        );
    }
}
