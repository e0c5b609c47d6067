//! Player preferences
//!
//! Persisted separately from the game in LocalStorage. Game sessions
//! themselves are never saved.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, SoundCue};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play sound cues for game events
    pub sound_enabled: bool,
    /// Show the debug overlay (hitboxes, entity counts)
    pub show_debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            show_debug: false,
        }
    }
}

impl Settings {
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.show_debug = !self.show_debug;
        self.show_debug
    }

    /// Sound cues to play for a tick's events (none when muted)
    pub fn sound_cues<'a>(
        &self,
        events: &'a [GameEvent],
    ) -> impl Iterator<Item = SoundCue> + 'a {
        let enabled = self.sound_enabled;
        events
            .iter()
            .filter(move |_| enabled)
            .filter_map(GameEvent::sound_cue)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "horde_shooter_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
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

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
