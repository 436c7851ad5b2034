//! Player preferences
//!
//! Cosmetic only: these gate screen shake and sound volume, never gameplay math.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub effects_volume: f32,

    // === Accessibility ===
    /// Reduced motion (minimize shake)
    pub reduce_motion: bool,
    /// Disable screen shake on hits
    pub disable_screen_shake: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Audio
            master_volume: 0.5,
            effects_volume: 0.7,

            // Accessibility
            reduce_motion: false,
            disable_screen_shake: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduce_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.disable_screen_shake && !self.reduce_motion
    }

    /// Gain applied to an effect's base volume
    pub fn effects_gain(&self) -> f32 {
        self.master_volume.clamp(0.0, 1.0) * self.effects_volume.clamp(0.0, 1.0)
    }

    /// Parse saved settings; malformed input falls back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_motion_disables_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduce_motion = true;
        assert!(!settings.effective_screen_shake());
    }

    #[test]
    fn test_gain_clamped() {
        let settings = Settings {
            master_volume: 2.0,
            effects_volume: 0.5,
            ..Default::default()
        };
        assert_eq!(settings.effects_gain(), 0.5);
    }

    #[test]
    fn test_json_round_trip_and_fallback() {
        let settings = Settings {
            disable_screen_shake: true,
            ..Default::default()
        };
        assert_eq!(Settings::from_json(&settings.to_json()), settings);
        assert_eq!(Settings::from_json("{nope"), Settings::default());
        // Partial documents keep defaults
        let partial = Settings::from_json(r#"{"master_volume":0.1}"#);
        assert_eq!(partial.effects_volume, 0.7);
    }
}
