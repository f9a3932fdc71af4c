//! Player preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::{KeyValueStore, StoreError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Commentary ===
    /// Ask the commentary service for a post-run quip
    pub commentary_enabled: bool,
    /// Give up on the service after this long (ms) and use a canned line
    pub commentary_timeout_ms: u32,

    // === Display ===
    /// Show the on-screen steering buttons
    pub touch_controls: bool,

    // === Accessibility ===
    /// Reduced motion (no car tilt, static road divider)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            commentary_enabled: true,
            commentary_timeout_ms: 6000,
            touch_controls: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Load settings; anything unreadable falls back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Ok(Some(json)) = store.get(SETTINGS_KEY) {
            if let Ok(settings) = serde_json::from_str(&json) {
                log::info!("Loaded settings from storage");
                return settings;
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        // Serializing plain fields cannot fail
        let json = serde_json::to_string(self).unwrap_or_default();
        store.set(SETTINGS_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
