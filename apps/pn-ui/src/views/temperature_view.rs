use pn_core::{ControlState, TemperatureControl, TemperatureUnit};

/// Binds a [`TemperatureControl`] to egui widgets.
#[derive(Default)]
pub struct TemperatureView {
    field_text: String,
    editing: bool,
}

impl TemperatureView {
    pub fn show(&mut self, ui: &mut egui::Ui, control: &mut TemperatureControl) {
        ui.horizontal(|ui| {
            let mut enabled = control.is_enabled();
            if ui.checkbox(&mut enabled, "Set temperature").changed() {
                control.toggle_enable();
            }

            ui.add_enabled_ui(control.is_enabled(), |ui| {
                let mut unit = control.unit();
                ui.selectable_value(&mut unit, TemperatureUnit::Kelvin, "K");
                ui.selectable_value(&mut unit, TemperatureUnit::Celsius, "°C");
                if unit != control.unit() {
                    control.toggle_unit();
                }
            });
        });

        ui.add_enabled_ui(control.is_enabled(), |ui| {
            let bounds = control.slider();
            let mut value = control.displayed();
            let slider = egui::Slider::new(&mut value, bounds.min..=bounds.max)
                .step_by(bounds.step as f64)
                .suffix(control.unit().suffix());
            if ui.add(slider).changed() {
                control.slide(value);
            }

            ui.horizontal(|ui| {
                if !self.editing {
                    self.field_text = control.displayed().to_string();
                }
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.field_text)
                        .desired_width(70.0)
                        .hint_text(control.unit().anchor().to_string()),
                );
                self.editing = response.has_focus();
                if response.lost_focus() {
                    control.type_text(&self.field_text);
                    self.field_text = control.displayed().to_string();
                }
                ui.label(control.unit().symbol());
                ui.weak(control.conversion_hint());
            });
        });

        match control.state() {
            ControlState::Disabled => {
                ui.weak("No temperature (0 K, ground state)");
            }
            ControlState::EnabledKelvin | ControlState::EnabledCelsius => {
                ui.weak(format!("Sent to server: {} K", control.canonical_kelvin()));
            }
        }
    }
}
