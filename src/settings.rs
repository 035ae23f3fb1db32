//! Engine settings and tuning constants
//!
//! Persisted in LocalStorage on the web; loaded from a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::error::OrbResult;

/// Quality preset levels (blob outline resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Outline sample count for the parent blob
    pub fn parent_points(&self) -> usize {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 96,
            QualityPreset::High => 128,
        }
    }

    /// Outline sample count for each child blob
    pub fn child_points(&self) -> usize {
        self.parent_points() / 2
    }

    /// Bezier subdivisions per segment when tessellating
    pub fn curve_steps(&self) -> usize {
        match self {
            QualityPreset::Low => 2,
            QualityPreset::Medium => 3,
            QualityPreset::High => 4,
        }
    }
}

/// Hand-tuned physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Parent drag spring base stiffness (scaled by `1 + morph_speed`)
    pub parent_stiffness: f32,
    /// Parent drag spring base damping (reduced by `0.2 * morph_speed`)
    pub parent_damping: f32,
    /// Parent morph speed; feeds stiffness, damping, wobble and target decay
    pub morph_speed: f32,
    /// Child return-to-orbit spring
    pub return_stiffness: f32,
    pub return_damping: f32,
    /// Offset (per axis) below which a disrupted child counts as settled
    pub settle_threshold: f32,
    /// Scroll speed above which children get knocked out of orbit
    pub disruption_velocity: f32,
    /// Per-frame smoothing of a child toward its orbital slot
    pub lag_smoothing: f32,
    /// Parent drag target range over which children fade out
    pub fade_start: f32,
    pub fade_end: f32,
    /// Minimum time between two lightning strikes from the same child
    pub transmission_cooldown_ms: f64,
    /// Red channel distance under which child and parent colors "match"
    pub color_match_threshold: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            parent_stiffness: 0.06,
            parent_damping: 0.94,
            morph_speed: 0.012,
            return_stiffness: 0.03,
            return_damping: 0.85,
            settle_threshold: 1.0,
            disruption_velocity: 10.0,
            lag_smoothing: 0.15,
            fade_start: 40.0,
            fade_end: 340.0,
            transmission_cooldown_ms: 2000.0,
            color_match_threshold: 20,
        }
    }
}

/// Orb hero settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Outline resolution preset
    pub quality: QualityPreset,
    /// Dissolve/materialize particle bursts
    pub particles: bool,
    /// Lightning links between children and parent
    pub transmissions: bool,
    /// Reduced motion (no drift, no revolution, no lightning)
    pub reduced_motion: bool,
    /// Fixed RNG seed; a time-based seed is used when absent
    pub seed: Option<u64>,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            particles: true,
            transmissions: true,
            reduced_motion: false,
            seed: None,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> OrbResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> OrbResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective lightning (respects reduced_motion)
    pub fn effective_transmissions(&self) -> bool {
        self.transmissions && !self.reduced_motion
    }

    /// Effective floating drift and child revolution (respects reduced_motion)
    pub fn effective_motion(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "orb_hero_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
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
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> OrbResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hand_tuned_constants() {
        let settings = Settings::default();
        assert_eq!(settings.quality.parent_points(), 128);
        assert_eq!(settings.quality.child_points(), 64);
        assert_eq!(settings.tuning.return_stiffness, 0.03);
        assert_eq!(settings.tuning.return_damping, 0.85);
        assert_eq!(settings.tuning.transmission_cooldown_ms, 2000.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings =
            Settings::from_json(r#"{"quality":"Low","tuning":{"lag_smoothing":0.3}}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.particles);
        assert_eq!(settings.tuning.lag_smoothing, 0.3);
        assert_eq!(settings.tuning.fade_end, 340.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::from_preset(QualityPreset::Medium);
        settings.seed = Some(7);
        settings.reduced_motion = true;
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back.quality, QualityPreset::Medium);
        assert_eq!(back.seed, Some(7));
        assert!(!back.effective_transmissions());
        assert_eq!(back.tuning, settings.tuning);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }
}
