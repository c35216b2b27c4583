//! Player preferences
//!
//! Persisted in LocalStorage, separate from lore records.

use serde::{Deserialize, Serialize};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no running bob)
    pub reduced_motion: bool,

    // === HUD ===
    pub show_distance: bool,

    /// Lore service URL
    pub lore_endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            reduced_motion: false,

            show_distance: true,

            lore_endpoint: "/api/lore".to_string(),
        }
    }
}

impl Settings {
    /// Whether the player sprite bobs while running
    pub fn bobbing_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// Gain applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "edge_of_the_world_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {err}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.lore_endpoint, "/api/lore");
        assert!(settings.bobbing_enabled());
        assert!(settings.show_distance);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"reduced_motion":true}"#).unwrap();
        assert!(!settings.bobbing_enabled());
        assert_eq!(settings.master_volume, 0.8);
        assert_eq!(settings.lore_endpoint, "/api/lore");
    }

    #[test]
    fn test_muted_silences_effects() {
        let mut settings = Settings::default();
        assert!(settings.effective_sfx_volume() > 0.0);
        settings.muted = true;
        assert_eq!(settings.effective_sfx_volume(), 0.0);
    }
}
