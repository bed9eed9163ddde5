//! Temperature control state machine.
//!
//! Owns the linked quartet a front-end shows for temperature: a slider, a
//! numeric field, a Kelvin/Celsius toggle and an enable toggle. The front-end
//! forwards user events here and reads back the displayed value, slider
//! range and conversion hint. Whatever the unit on screen, the value handed
//! downstream is `canonical_kelvin()`.
//!
//! States:
//! - `Disabled`: canonical value is 0, the displayed value is kept for
//!   re-enable
//! - `EnabledKelvin` / `EnabledCelsius`: canonical value follows the
//!   displayed value
//!
//! The displayed value never leaves the current unit's bounds: typed values
//! are clamped, never rejected.

use crate::units::{TemperatureUnit, UnitBounds, celsius_to_kelvin, kelvin_to_celsius};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Disabled,
    EnabledKelvin,
    EnabledCelsius,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureControl {
    unit: TemperatureUnit,
    displayed: i64,
    enabled: bool,
}

impl Default for TemperatureControl {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Kelvin,
            displayed: TemperatureUnit::Kelvin.anchor(),
            enabled: false,
        }
    }
}

impl TemperatureControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        match (self.enabled, self.unit) {
            (false, _) => ControlState::Disabled,
            (true, TemperatureUnit::Kelvin) => ControlState::EnabledKelvin,
            (true, TemperatureUnit::Celsius) => ControlState::EnabledCelsius,
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn displayed(&self) -> i64 {
        self.displayed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Slider min/max/step for the current unit.
    pub fn slider(&self) -> UnitBounds {
        self.unit.bounds()
    }

    pub fn toggle_enable(&mut self) -> ControlState {
        self.set_enabled(!self.enabled);
        self.state()
    }

    /// Re-enabling restores the last displayed value and unit.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// No-op while disabled.
    pub fn toggle_unit(&mut self) -> ControlState {
        if self.enabled {
            self.switch_unit(self.unit.other());
        }
        self.state()
    }

    /// No-op while disabled or when `unit` is already active.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        if self.enabled && unit != self.unit {
            self.switch_unit(unit);
        }
    }

    fn switch_unit(&mut self, to: TemperatureUnit) {
        let converted = self.unit.convert_to(self.displayed as f64, to);
        let bounds = to.bounds();
        let clamped = converted.clamp(bounds.min as f64, bounds.max as f64);
        self.displayed = clamped.round() as i64;
        self.unit = to;
    }

    /// Slider drag: snaps to the slider step grid.
    pub fn slide(&mut self, value: i64) {
        if self.enabled {
            self.displayed = self.unit.bounds().snap(value);
        }
    }

    /// Numeric field edit. Empty or unreadable text resets to the unit
    /// anchor; decimals are truncated; out-of-range values clamp.
    pub fn type_text(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        let bounds = self.unit.bounds();
        let parsed = parse_integer(text).unwrap_or(self.unit.anchor());
        self.displayed = bounds.clamp(parsed);
    }

    /// Kelvin value sent to the server; 0 when disabled.
    pub fn canonical_kelvin(&self) -> u32 {
        if !self.enabled {
            return 0;
        }
        self.displayed_kelvin() as u32
    }

    /// Kelvin equivalent of the displayed value, ignoring the enable toggle.
    pub fn displayed_kelvin(&self) -> i64 {
        match self.unit {
            TemperatureUnit::Kelvin => self.displayed,
            TemperatureUnit::Celsius => celsius_to_kelvin(self.displayed as f64).round() as i64,
        }
    }

    /// Secondary hint shown next to the field, in the other unit.
    pub fn conversion_hint(&self) -> String {
        match self.unit {
            TemperatureUnit::Kelvin => {
                format!("≈ {}°C", kelvin_to_celsius(self.displayed as f64).round() as i64)
            }
            TemperatureUnit::Celsius => {
                format!("≈ {}K", celsius_to_kelvin(self.displayed as f64).round() as i64)
            }
        }
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v.trunc() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> TemperatureControl {
        let mut control = TemperatureControl::new();
        control.toggle_enable();
        control
    }

    #[test]
    fn defaults_are_disabled_kelvin_300() {
        let control = TemperatureControl::new();
        assert_eq!(control.state(), ControlState::Disabled);
        assert_eq!(control.unit(), TemperatureUnit::Kelvin);
        assert_eq!(control.displayed(), 300);
        assert_eq!(control.canonical_kelvin(), 0);
    }

    #[test]
    fn first_enable_is_kelvin() {
        let control = enabled();
        assert_eq!(control.state(), ControlState::EnabledKelvin);
        assert_eq!(control.canonical_kelvin(), 300);
    }

    #[test]
    fn typed_values_clamp_in_kelvin() {
        let mut control = enabled();
        control.type_text("50");
        assert_eq!(control.displayed(), 300);
        control.type_text("3000");
        assert_eq!(control.displayed(), 2000);
        assert_eq!(control.canonical_kelvin(), 2000);
    }

    #[test]
    fn typed_values_clamp_in_celsius() {
        let mut control = enabled();
        control.toggle_unit();
        assert_eq!(control.state(), ControlState::EnabledCelsius);

        control.type_text("5");
        assert_eq!(control.displayed(), 27);
        assert_eq!(control.canonical_kelvin(), 300);

        control.type_text("2000");
        assert_eq!(control.displayed(), 1727);
        assert_eq!(control.canonical_kelvin(), 2000);

        control.type_text("1727");
        assert_eq!(control.displayed(), 1727);
        control.type_text("27");
        assert_eq!(control.displayed(), 27);
    }

    #[test]
    fn empty_or_garbage_resets_to_anchor() {
        let mut control = enabled();
        control.type_text("1200");
        control.type_text("");
        assert_eq!(control.displayed(), 300);

        control.toggle_unit();
        control.type_text("500");
        control.type_text("abc");
        assert_eq!(control.displayed(), 27);
    }

    #[test]
    fn decimals_truncate() {
        let mut control = enabled();
        control.type_text("1234.9");
        assert_eq!(control.displayed(), 1234);
    }

    #[test]
    fn unit_round_trip_from_300k() {
        let mut control = enabled();
        assert_eq!(control.toggle_unit(), ControlState::EnabledCelsius);
        assert_eq!(control.displayed(), 27);
        assert_eq!(control.slider(), TemperatureUnit::Celsius.bounds());
        assert_eq!(control.canonical_kelvin(), 300);

        assert_eq!(control.toggle_unit(), ControlState::EnabledKelvin);
        assert_eq!(control.displayed(), 300);
    }

    #[test]
    fn unit_switch_rounds_and_clamps() {
        let mut control = enabled();
        control.type_text("2000");
        control.toggle_unit();
        assert_eq!(control.displayed(), 1727);
        control.type_text("1000");
        control.toggle_unit();
        assert_eq!(control.displayed(), 1273);
    }

    #[test]
    fn disable_forces_zero_and_keeps_display() {
        let mut control = enabled();
        control.toggle_unit();
        control.type_text("500");
        assert_eq!(control.toggle_enable(), ControlState::Disabled);
        assert_eq!(control.canonical_kelvin(), 0);
        assert_eq!(control.displayed(), 500);

        assert_eq!(control.toggle_enable(), ControlState::EnabledCelsius);
        assert_eq!(control.canonical_kelvin(), 773);
    }

    #[test]
    fn edits_ignored_while_disabled() {
        let mut control = TemperatureControl::new();
        control.type_text("900");
        control.slide(900);
        control.toggle_unit();
        assert_eq!(control.displayed(), 300);
        assert_eq!(control.unit(), TemperatureUnit::Kelvin);
    }

    #[test]
    fn slide_snaps_to_step() {
        let mut control = enabled();
        control.slide(1234);
        assert_eq!(control.displayed(), 1230);
        control.toggle_unit();
        control.slide(101);
        assert_eq!(control.displayed(), 102);
    }

    #[test]
    fn hint_shows_other_unit() {
        let mut control = enabled();
        assert_eq!(control.conversion_hint(), "≈ 27°C");
        control.toggle_unit();
        assert_eq!(control.conversion_hint(), "≈ 300K");
    }
}
