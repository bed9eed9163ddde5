use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::submit_worker::PlotModel;

#[derive(Default)]
pub struct PlotView {
    show_labels: bool,
}

impl PlotView {
    pub fn show(&mut self, ui: &mut egui::Ui, model: Option<&PlotModel>) {
        let Some(model) = model else {
            ui.label("Enter formulas and generate a diagram to see it here");
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(model.title.as_deref().unwrap_or("Phase diagram"));
            ui.separator();
            ui.checkbox(&mut self.show_labels, "Phase labels");
        });

        if model.traces.is_empty() {
            ui.label("The server returned no drawable traces");
            return;
        }

        let mut plot = Plot::new("phase_diagram")
            .legend(Legend::default())
            .height(ui.available_height() * 0.6);
        if let Some(x_label) = &model.x_label {
            plot = plot.x_axis_label(x_label.as_str());
        }
        if let Some(y_label) = &model.y_label {
            plot = plot.y_axis_label(y_label.as_str());
        }

        let show_labels = self.show_labels;
        plot.show(ui, |plot_ui| {
            for trace in &model.traces {
                let color = trace.color.map(|[r, g, b]| Color32::from_rgb(r, g, b));
                let name = trace
                    .name
                    .as_deref()
                    .filter(|_| trace.show_legend)
                    .unwrap_or("");

                // Only the first segment carries the legend entry
                for (i, segment) in trace.segments.iter().enumerate() {
                    let name = if i == 0 { name } else { "" };
                    if trace.mode.has_lines() {
                        let mut line = Line::new(PlotPoints::from(segment.clone())).name(name);
                        if let Some(color) = color {
                            line = line.color(color);
                        }
                        plot_ui.line(line);
                    }
                    if trace.mode.has_markers() {
                        let marker_name = if trace.mode.has_lines() { "" } else { name };
                        let mut points = Points::new(PlotPoints::from(segment.clone()))
                            .radius(4.0)
                            .name(marker_name);
                        if let Some(color) = color {
                            points = points.color(color);
                        }
                        plot_ui.points(points);
                    }
                }

                if show_labels {
                    for label in &trace.labels {
                        plot_ui.text(Text::new(
                            PlotPoint::new(label.at[0], label.at[1]),
                            label.text.as_str(),
                        ));
                    }
                }
            }
        });
    }
}
