//! Deck scheduling configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Number of FSRS-6 model weights.
pub const WEIGHT_COUNT: usize = 21;

/// FSRS-6 default weight vector (21 parameters).
///
/// Layout: w[0..4] initial stability per rating, w[4..6] initial
/// difficulty, w[6..8] difficulty transition, w[8..11] recall stability,
/// w[11..15] forget stability, w[15..17] hard penalty / easy bonus,
/// w[17..20] short-term, w[20] decay.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.212, 1.2931, 2.3065, 8.2956, // initial stability (0-3)
    6.4133, 0.8334, // initial difficulty (4-5)
    3.0194, 0.001, // difficulty transition (6-7)
    1.8722, 0.1666, 0.796, // stability recall (8-10)
    1.4835, 0.0614, 0.2629, 1.6483, // stability forget (11-14)
    0.6014, 1.8729, // hard/easy factors (15-16)
    0.5425, 0.0912, 0.0658, // short term (17-19)
    0.1542, // decay (20)
];

/// FSRS engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsrsParameters {
    /// Target recall probability used to size intervals, in [0.7, 0.99].
    pub request_retention: f64,
    /// Hard cap on scheduled intervals, in days.
    pub maximum_interval: u32,
    /// Model weight vector; must hold exactly 21 values.
    pub w: Vec<f64>,
}

impl Default for FsrsParameters {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: 36500,
            w: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

impl FsrsParameters {
    /// Default parameters with a custom request retention.
    pub fn with_retention(request_retention: f64) -> Self {
        Self {
            request_retention,
            ..Default::default()
        }
    }
}

/// Named scheduling presets a deck can start from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
pub enum DeckPreset {
    /// Dense early steps and high retention for material that slips away.
    Forgetful,
    /// Sparse steps and relaxed retention for easy material.
    EasyToRemember,
    /// The default middle ground.
    #[default]
    Balanced,
    /// Aggressive short-horizon drilling with a 30-day interval cap.
    ExamPrep,
    /// Hand-edited settings; no preset values apply.
    Custom,
}

/// Per-deck scheduling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSettings {
    /// Preset these settings were derived from.
    pub preset: DeckPreset,
    /// Daily cap on newly introduced cards.
    pub new_cards_per_day: u32,
    /// Daily cap on Review-state answers.
    pub reviews_per_day: u32,
    /// Space-separated learning step durations, e.g. "1m 10m 1d".
    pub learning_steps: String,
    /// Space-separated relearning step durations, e.g. "10m".
    pub relearning_steps: String,
    /// FSRS engine parameters.
    pub fsrs_parameters: FsrsParameters,
    /// When the weight optimizer last ran for this deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_optimized: Option<DateTime<Utc>>,
}

impl Default for DeckSettings {
    fn default() -> Self {
        DeckPreset::Balanced.settings()
    }
}

impl DeckPreset {
    /// Build the settings this preset stands for.
    ///
    /// `Custom` yields the Balanced configuration as a starting point.
    pub fn settings(self) -> DeckSettings {
        let (learning_steps, relearning_steps, fsrs_parameters) = match self {
            DeckPreset::Forgetful => (
                "1m 5m 20m",
                "5m 20m",
                FsrsParameters::with_retention(0.92),
            ),
            DeckPreset::EasyToRemember => ("10m 1d", "10m", FsrsParameters::with_retention(0.85)),
            DeckPreset::Balanced | DeckPreset::Custom => {
                ("1m 10m", "10m", FsrsParameters::default())
            }
            DeckPreset::ExamPrep => (
                "1m 10m 30m 1h 3h 12h",
                "1m 10m",
                FsrsParameters {
                    request_retention: 0.93,
                    maximum_interval: 30,
                    ..Default::default()
                },
            ),
        };

        DeckSettings {
            preset: self,
            new_cards_per_day: 20,
            reviews_per_day: 200,
            learning_steps: learning_steps.to_string(),
            relearning_steps: relearning_steps.to_string(),
            fsrs_parameters,
            last_optimized: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_balanced() {
        let settings = DeckSettings::default();
        assert_eq!(settings.preset, DeckPreset::Balanced);
        assert_eq!(settings.new_cards_per_day, 20);
        assert_eq!(settings.reviews_per_day, 200);
        assert_eq!(settings.learning_steps, "1m 10m");
        assert_eq!(settings.fsrs_parameters.request_retention, 0.9);
        assert_eq!(settings.fsrs_parameters.w.len(), WEIGHT_COUNT);
    }

    #[test]
    fn test_exam_prep_caps_interval() {
        let settings = DeckPreset::ExamPrep.settings();
        assert_eq!(settings.fsrs_parameters.maximum_interval, 30);
        assert_eq!(settings.fsrs_parameters.request_retention, 0.93);
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let settings = DeckSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"newCardsPerDay\":20"));
        assert!(json.contains("\"requestRetention\":0.9"));
        assert!(json.contains("\"learningSteps\":\"1m 10m\""));

        let back: DeckSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_preset_display_round_trip() {
        use std::str::FromStr;
        let preset = DeckPreset::EasyToRemember;
        assert_eq!(preset.to_string(), "EasyToRemember");
        assert_eq!(DeckPreset::from_str("EasyToRemember").unwrap(), preset);
    }
}
