//! Request/response payloads for the diagram API.

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/diagrams/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramRequest {
    /// Ordered; the order decides the diagram axes.
    #[serde(rename = "f")]
    pub formulas: Vec<String>,
    /// Kelvin; 0 means "no temperature".
    #[serde(rename = "temp")]
    pub temperature_k: u32,
    pub e_cut: f64,
    pub functional: String,
}

/// One phase as reported by the server. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub formula: String,
    pub composition: String,
    pub energy_per_atom: Option<f64>,
    #[serde(default)]
    pub formation_energy_per_atom: Option<f64>,
    #[serde(default)]
    pub correction: f64,
    pub entry_id: String,
    #[serde(default)]
    pub total_energy: Option<f64>,
    #[serde(default)]
    pub temperature: Option<u32>,
    #[serde(default)]
    pub num_atoms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramMetadata {
    #[serde(default)]
    pub temperature: u32,
    #[serde(default)]
    pub functional: Option<String>,
    #[serde(default)]
    pub e_cut: Option<f64>,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub num_phases: Option<usize>,
}

/// Plotly figure as sent by the server: trace list plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub layout: Value,
}

impl PlotSpec {
    /// `layout.title.text`, or `layout.title` when it is a bare string.
    pub fn title(&self) -> Option<&str> {
        let title = self.layout.get("title")?;
        title
            .get("text")
            .and_then(Value::as_str)
            .or_else(|| title.as_str())
    }

    pub fn axis_title(&self, axis: &str) -> Option<&str> {
        let title = self.layout.get(axis)?.get("title")?;
        title
            .get("text")
            .and_then(Value::as_str)
            .or_else(|| title.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramResponse {
    pub plot: PlotSpec,
    pub phase_info: Vec<PhaseRecord>,
    pub metadata: DiagramMetadata,
}

impl DiagramResponse {
    /// Accepts `{plot, phase_info, metadata}` or, from older servers, the
    /// bare plot object at top level.
    pub fn from_value(mut value: Value) -> Result<Self, TransportError> {
        if !value.is_object() {
            return Err(TransportError::MalformedBody(
                "expected a JSON object".to_string(),
            ));
        }

        let plot_value = match value.get_mut("plot").map(Value::take) {
            Some(Value::Null) | None => value.clone(),
            Some(plot) => plot,
        };
        let plot: PlotSpec = serde_json::from_value(plot_value)
            .map_err(|e| TransportError::MalformedBody(format!("plot: {e}")))?;

        let phase_info = match value.get_mut("phase_info").map(Value::take) {
            Some(Value::Null) | None => Vec::new(),
            Some(list) => serde_json::from_value(list)
                .map_err(|e| TransportError::MalformedBody(format!("phase_info: {e}")))?,
        };

        let metadata = match value.get_mut("metadata").map(Value::take) {
            Some(Value::Null) | None => DiagramMetadata::default(),
            Some(meta) => serde_json::from_value(meta)
                .map_err(|e| TransportError::MalformedBody(format!("metadata: {e}")))?,
        };

        Ok(Self {
            plot,
            phase_info,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_wire_names() {
        let request = DiagramRequest {
            formulas: vec!["Fe2O3".to_string(), "FeO".to_string()],
            temperature_k: 0,
            e_cut: 0.2,
            functional: "GGA".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"f": ["Fe2O3", "FeO"], "temp": 0, "e_cut": 0.2, "functional": "GGA"})
        );
    }

    #[test]
    fn full_response_shape() {
        let body = json!({
            "plot": {"data": [{"type": "scatter", "x": [0, 1], "y": [0, -0.5]}], "layout": {"title": {"text": "Fe-O"}}},
            "phase_info": [{
                "formula": "Fe2O3", "composition": "Fe2 O3", "energy_per_atom": -6.8,
                "total_energy": -34.0, "formation_energy_per_atom": -1.7, "correction": -0.68,
                "entry_id": "mp-19770-GGA+U", "temperature": 0, "num_atoms": 5.0
            }],
            "metadata": {"temperature": 0, "elements": ["Fe", "O"], "e_cut": 0.2, "functional": "GGA_GGA_U_R2SCAN", "num_phases": 1}
        });
        let response = DiagramResponse::from_value(body).unwrap();
        assert_eq!(response.plot.data.len(), 1);
        assert_eq!(response.plot.title(), Some("Fe-O"));
        assert_eq!(response.phase_info.len(), 1);
        assert_eq!(response.phase_info[0].formation_energy_per_atom, Some(-1.7));
        assert_eq!(response.metadata.functional.as_deref(), Some("GGA_GGA_U_R2SCAN"));
        assert_eq!(response.metadata.num_phases, Some(1));
    }

    #[test]
    fn legacy_bare_plot_shape() {
        let body = json!({"data": [{"x": [1], "y": [2]}], "layout": {"title": "legacy"}});
        let response = DiagramResponse::from_value(body).unwrap();
        assert_eq!(response.plot.data.len(), 1);
        assert_eq!(response.plot.title(), Some("legacy"));
        assert!(response.phase_info.is_empty());
        assert_eq!(response.metadata, DiagramMetadata::default());
    }

    #[test]
    fn null_plot_falls_back_to_top_level_figure() {
        let body = json!({
            "plot": null,
            "data": [{"x": [0, 1], "y": [0, 1]}],
            "layout": {"title": {"text": "fallback"}}
        });
        let response = DiagramResponse::from_value(body).unwrap();
        assert_eq!(response.plot.data.len(), 1);
        assert_eq!(response.plot.title(), Some("fallback"));
    }

    #[test]
    fn null_formation_energy_is_kept_as_none() {
        let body = json!({
            "plot": {"data": [], "layout": {}},
            "phase_info": [{
                "formula": "O2", "composition": "O2", "energy_per_atom": -4.9,
                "formation_energy_per_atom": null, "correction": 0.0, "entry_id": "Unknown"
            }],
            "metadata": {}
        });
        let response = DiagramResponse::from_value(body).unwrap();
        assert_eq!(response.phase_info[0].formation_energy_per_atom, None);
        assert_eq!(response.metadata.temperature, 0);
    }

    #[test]
    fn non_object_body_is_malformed() {
        assert!(matches!(
            DiagramResponse::from_value(json!([1, 2, 3])),
            Err(TransportError::MalformedBody(_))
        ));
    }

    #[test]
    fn bad_phase_list_is_malformed() {
        let body = json!({"plot": {"data": []}, "phase_info": "nope"});
        assert!(matches!(
            DiagramResponse::from_value(body),
            Err(TransportError::MalformedBody(_))
        ));
    }
}
