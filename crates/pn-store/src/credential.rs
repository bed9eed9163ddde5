//! API key persistence on top of [`Storage`].
//!
//! The key is stored obfuscated (see `pn_core::codec`), never in plain text.
//! A stored value that fails to decode or no longer looks like an API key is
//! removed on restore and reported as absent.

use crate::StoreResult;
use crate::local::Storage;
use pn_core::{decode, encode, is_valid_api_key, key_fingerprint};
use tracing::{debug, info, warn};

pub const API_KEY_STORAGE_KEY: &str = "mp_api_key_encrypted";

/// Empty keys are ignored.
pub fn save_api_key(storage: &dyn Storage, api_key: &str) -> StoreResult<()> {
    if api_key.is_empty() {
        return Ok(());
    }
    let encoded = encode(api_key)?;
    storage.set_item(API_KEY_STORAGE_KEY, &encoded)?;
    info!(key = %key_fingerprint(api_key), "API key saved");
    Ok(())
}

pub fn restore_api_key(storage: &dyn Storage) -> Option<String> {
    let stored = match storage.get_item(API_KEY_STORAGE_KEY) {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            debug!("no stored API key");
            return None;
        }
        Err(err) => {
            warn!(error = %err, "failed to read stored API key");
            return None;
        }
    };

    match decode(&stored) {
        Ok(key) if is_valid_api_key(&key) => {
            info!(key = %key_fingerprint(&key), "API key restored");
            Some(key)
        }
        _ => {
            if let Err(err) = storage.remove_item(API_KEY_STORAGE_KEY) {
                warn!(error = %err, "failed to clear corrupted API key");
            } else {
                warn!("cleared corrupted stored API key");
            }
            None
        }
    }
}

pub fn clear_api_key(storage: &dyn Storage) -> StoreResult<()> {
    storage.remove_item(API_KEY_STORAGE_KEY)
}
