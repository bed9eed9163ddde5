//! pn-core: toolkit-free foundation for phasenav.
//!
//! Contains:
//! - units (Kelvin/Celsius conversion over uom + per-unit control bounds)
//! - codec (obfuscating credential codec)
//! - validate (formula list, API key, temperature and energy-cutoff checks)
//! - temperature (the linked slider/field/unit/enable control state machine)
//! - fingerprint (short API-key digest safe for logs)

pub mod codec;
pub mod fingerprint;
pub mod temperature;
pub mod units;
pub mod validate;

// Re-exports: nice ergonomics for downstream crates
pub use codec::{CodecError, decode, encode};
pub use fingerprint::key_fingerprint;
pub use temperature::{ControlState, TemperatureControl};
pub use units::*;
pub use validate::{
    ValidationError, is_valid_api_key, parse_energy_cutoff, validate_api_key, validate_formulas,
    validate_temperature,
};
