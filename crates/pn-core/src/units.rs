// pn-core/src/units.rs

use uom::si::f64::ThermodynamicTemperature as UomThermodynamicTemperature;
use uom::si::thermodynamic_temperature::{degree_celsius, kelvin};

pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn k(v: f64) -> Temperature {
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn deg_c(v: f64) -> Temperature {
    Temperature::new::<degree_celsius>(v)
}

/// `k - 273.15`
pub fn kelvin_to_celsius(value_k: f64) -> f64 {
    k(value_k).get::<degree_celsius>()
}

/// `c + 273.15`
pub fn celsius_to_kelvin(value_c: f64) -> f64 {
    deg_c(value_c).get::<kelvin>()
}

/// Units offered by the temperature control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemperatureUnit {
    #[default]
    Kelvin,
    Celsius,
}

/// Inclusive integer range plus slider step for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitBounds {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl UnitBounds {
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }

    /// Nearest point on the `min + n * step` grid, clamped.
    pub fn snap(&self, value: i64) -> i64 {
        let steps = ((value - self.min) as f64 / self.step as f64).round() as i64;
        self.clamp(self.min + steps * self.step)
    }
}

pub const KELVIN_BOUNDS: UnitBounds = UnitBounds {
    min: 300,
    max: 2000,
    step: 10,
};

pub const CELSIUS_BOUNDS: UnitBounds = UnitBounds {
    min: 27,
    max: 1727,
    step: 5,
};

impl TemperatureUnit {
    pub const fn bounds(self) -> UnitBounds {
        match self {
            TemperatureUnit::Kelvin => KELVIN_BOUNDS,
            TemperatureUnit::Celsius => CELSIUS_BOUNDS,
        }
    }

    /// Value an empty or unreadable field falls back to.
    pub const fn anchor(self) -> i64 {
        self.bounds().min
    }

    pub const fn other(self) -> Self {
        match self {
            TemperatureUnit::Kelvin => TemperatureUnit::Celsius,
            TemperatureUnit::Celsius => TemperatureUnit::Kelvin,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Kelvin => "K",
            TemperatureUnit::Celsius => "°C",
        }
    }

    /// Symbol as it follows a number in messages ("300 K", "27°C").
    pub const fn suffix(self) -> &'static str {
        match self {
            TemperatureUnit::Kelvin => " K",
            TemperatureUnit::Celsius => "°C",
        }
    }

    pub fn to_kelvin(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Kelvin => value,
            TemperatureUnit::Celsius => celsius_to_kelvin(value),
        }
    }

    pub fn from_kelvin(self, value_k: f64) -> f64 {
        match self {
            TemperatureUnit::Kelvin => value_k,
            TemperatureUnit::Celsius => kelvin_to_celsius(value_k),
        }
    }

    pub fn convert_to(self, value: f64, to: TemperatureUnit) -> f64 {
        to.from_kelvin(self.to_kelvin(value))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn kelvin_round_trip(kv in -10_000i64..10_000i64) {
            let back = celsius_to_kelvin(kelvin_to_celsius(kv as f64));
            prop_assert!((back - kv as f64).abs() < 1e-9);
        }
    }
}
