//! Input validation for the diagram form.

use crate::units::TemperatureUnit;

pub const MIN_FORMULAS: usize = 2;
pub const MAX_FORMULAS: usize = 4;
pub const API_KEY_LEN: usize = 32;
pub const DEFAULT_ENERGY_CUTOFF: f64 = 0.2;
pub const MAX_ENERGY_CUTOFF: f64 = 2.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("At least {min} chemical formulas are required")]
    TooFewFormulas { min: usize, found: usize },

    #[error("Maximum {max} formulas allowed")]
    TooManyFormulas { max: usize, found: usize },

    #[error("Materials Project API key is required")]
    MissingApiKey,

    #[error("Invalid API key format. Please check your Materials Project API key.")]
    InvalidApiKey,

    #[error(
        "Temperature must be 0{suffix} or between {min}-{max}{suffix}",
        suffix = .unit.suffix(),
        min = .unit.bounds().min,
        max = .unit.bounds().max
    )]
    TemperatureOutOfRange { value: i64, unit: TemperatureUnit },

    #[error("Energy cutoff must be between 0 and {max} eV/atom (got {value})")]
    EnergyCutoffOutOfRange { value: f64, max: f64 },
}

/// Split on commas, trim, drop empty entries. Order is kept: it decides the
/// diagram axes downstream.
pub fn validate_formulas(text: &str) -> Result<Vec<String>, ValidationError> {
    let formulas: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if formulas.len() < MIN_FORMULAS {
        return Err(ValidationError::TooFewFormulas {
            min: MIN_FORMULAS,
            found: formulas.len(),
        });
    }
    if formulas.len() > MAX_FORMULAS {
        return Err(ValidationError::TooManyFormulas {
            max: MAX_FORMULAS,
            found: formulas.len(),
        });
    }
    Ok(formulas)
}

/// Exactly 32 ASCII letters or digits.
pub fn is_valid_api_key(key: &str) -> bool {
    key.len() == API_KEY_LEN && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Trims the key and checks presence, then shape. Returns the trimmed key.
pub fn validate_api_key(key: &str) -> Result<&str, ValidationError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    if !is_valid_api_key(key) {
        return Err(ValidationError::InvalidApiKey);
    }
    Ok(key)
}

/// Zero means "no temperature" and is always accepted.
pub fn validate_temperature(value: i64, unit: TemperatureUnit) -> Result<i64, ValidationError> {
    if value == 0 || unit.bounds().contains(value) {
        Ok(value)
    } else {
        Err(ValidationError::TemperatureOutOfRange { value, unit })
    }
}

/// Unreadable text falls back to `default`; readable values must be in
/// `[0, max]` eV/atom.
pub fn parse_energy_cutoff(text: &str, default: f64, max: f64) -> Result<f64, ValidationError> {
    let value = match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Ok(default),
    };
    if !(0.0..=max).contains(&value) {
        return Err(ValidationError::EnergyCutoffOutOfRange { value, max });
    }
    Ok(value)
}
