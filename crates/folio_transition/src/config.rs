//! Transition configuration presets.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransitionError};

/// Where the expanding card is pinned inside the animated container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalExpandingStyle {
    /// Card grows downward from the container's top edge
    #[default]
    FromTop,
    /// Card grows outward from the container's center
    FromCenter,
}

/// Timing and geometry constants shared by every card transition.
///
/// One immutable value is handed to the coordinator, which passes it on to
/// the animators and the detail screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    /// Corner radius of a card in the list (points).
    pub card_corner_radius: f32,
    /// Scale of a highlighted (pressed) card.
    pub card_highlighted_factor: f32,
    /// Status bar show/hide animation (seconds).
    pub status_bar_animation_duration: f32,
    /// Duration of the non-interactive dismissal (seconds).
    pub dismissal_animation_duration: f32,
    pub vertical_expanding_style: VerticalExpandingStyle,
    /// Drag distance that commits an interactive dismissal (points).
    pub dismissal_distance: f32,
    /// Scale of the detail view at full interactive progress.
    pub dismissal_shrink_scale: f32,
    /// How much damping drops for a card far from its final position.
    pub damping_interval: f32,
    /// Presentation duration for a card already at the top (seconds).
    pub baseline_duration: f32,
    /// Presentation duration for a card a full screen away (seconds).
    pub max_duration: f32,
    /// Share of the presentation spent expanding the card to full size.
    pub expansion_relative_duration: f32,
    /// Spring damping ratio of the dismissal.
    pub dismissal_damping: f32,
    /// Log temporary animation views and their frames at debug level.
    pub debug_animating_views: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl TransitionConfig {
    /// Standard card timings and geometry.
    pub fn standard() -> Self {
        Self {
            card_corner_radius: 16.0,
            card_highlighted_factor: 0.96,
            status_bar_animation_duration: 0.4,
            dismissal_animation_duration: 0.6,
            vertical_expanding_style: VerticalExpandingStyle::FromTop,
            dismissal_distance: 100.0,
            dismissal_shrink_scale: 0.86,
            damping_interval: 0.3,
            baseline_duration: 0.5,
            max_duration: 0.9,
            expansion_relative_duration: 0.6,
            dismissal_damping: 0.7,
            debug_animating_views: false,
        }
    }

    /// Standard timings with temporary views traced.
    pub fn debug() -> Self {
        Self {
            debug_animating_views: true,
            ..Self::standard()
        }
    }

    /// Cards expand from their center instead of their top edge.
    pub fn centered() -> Self {
        Self {
            vertical_expanding_style: VerticalExpandingStyle::FromCenter,
            ..Self::standard()
        }
    }

    /// Parse a config from TOML. Missing keys fall back to the standard preset.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.dismissal_distance.is_nan() || self.dismissal_distance <= 0.0 {
            return Err(TransitionError::Config(format!(
                "dismissal_distance must be positive, got {}",
                self.dismissal_distance
            )));
        }
        if self.baseline_duration.is_nan()
            || self.max_duration.is_nan()
            || self.baseline_duration < 0.0
            || self.max_duration < self.baseline_duration
        {
            return Err(TransitionError::Config(format!(
                "durations must satisfy 0 <= baseline ({}) <= max ({})",
                self.baseline_duration, self.max_duration
            )));
        }
        if !(0.0..=1.0).contains(&self.expansion_relative_duration) {
            return Err(TransitionError::Config(format!(
                "expansion_relative_duration must be within [0, 1], got {}",
                self.expansion_relative_duration
            )));
        }
        if !(0.0..=1.0).contains(&self.damping_interval) {
            return Err(TransitionError::Config(format!(
                "damping_interval must be within [0, 1], got {}",
                self.damping_interval
            )));
        }
        if self.dismissal_animation_duration.is_nan() || self.dismissal_animation_duration < 0.0 {
            return Err(TransitionError::Config(
                "dismissal_animation_duration must not be negative".to_string(),
            ));
        }
        for (name, value) in [
            ("dismissal_damping", self.dismissal_damping),
            ("dismissal_shrink_scale", self.dismissal_shrink_scale),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(TransitionError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Set the vertical expanding style.
    pub fn with_vertical_expanding_style(mut self, style: VerticalExpandingStyle) -> Self {
        self.vertical_expanding_style = style;
        self
    }

    /// Set the card corner radius.
    pub fn with_card_corner_radius(mut self, radius: f32) -> Self {
        self.card_corner_radius = radius;
        self
    }

    /// Set the drag distance that commits a dismissal.
    pub fn with_dismissal_distance(mut self, distance: f32) -> Self {
        self.dismissal_distance = distance;
        self
    }

    /// Set the non-interactive dismissal duration.
    pub fn with_dismissal_duration(mut self, duration: f32) -> Self {
        self.dismissal_animation_duration = duration;
        self
    }

    /// Enable or disable tracing of temporary animation views.
    pub fn with_debug_animating_views(mut self, enabled: bool) -> Self {
        self.debug_animating_views = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_values() {
        let config = TransitionConfig::default();
        assert_eq!(config.card_corner_radius, 16.0);
        assert_eq!(config.dismissal_distance, 100.0);
        assert_eq!(config.dismissal_shrink_scale, 0.86);
        assert_eq!(config.vertical_expanding_style, VerticalExpandingStyle::FromTop);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TransitionConfig::from_toml_str(
            r#"
            vertical_expanding_style = "from_center"
            card_corner_radius = 12.0
            "#,
        )
        .unwrap();
        assert_eq!(config.vertical_expanding_style, VerticalExpandingStyle::FromCenter);
        assert_eq!(config.card_corner_radius, 12.0);
        assert_eq!(config.dismissal_animation_duration, 0.6);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TransitionConfig::from_toml_str("card_radius = 3.0").unwrap_err();
        assert!(matches!(err, TransitionError::ConfigParse(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TransitionConfig::from_toml_str("dismissal_distance = 0.0").unwrap_err();
        assert!(matches!(err, TransitionError::Config(_)));

        let config = TransitionConfig::standard().with_dismissal_distance(-5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spring_and_duration_values_rejected() {
        let cases: [fn(&mut TransitionConfig); 7] = [
            |c| c.baseline_duration = f32::NAN,
            |c| c.max_duration = f32::NAN,
            |c| c.dismissal_damping = 0.0,
            |c| c.dismissal_damping = f32::NAN,
            |c| c.dismissal_shrink_scale = -0.5,
            |c| c.damping_interval = 1.5,
            |c| c.damping_interval = f32::NAN,
        ];
        for tweak in cases {
            let mut config = TransitionConfig::standard();
            tweak(&mut config);
            assert!(
                matches!(config.validate(), Err(TransitionError::Config(_))),
                "{config:?} passed validation"
            );
        }

        let err = TransitionConfig::from_toml_str("damping_interval = -0.1").unwrap_err();
        assert!(matches!(err, TransitionError::Config(_)));

        let mut edge = TransitionConfig::standard();
        edge.damping_interval = 0.0;
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_of_preset() {
        let config = TransitionConfig::centered().with_debug_animating_views(true);
        let text = config.to_toml().unwrap();
        assert_eq!(TransitionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "folio_transition_config_{}.toml",
            std::process::id()
        ));
        let config = TransitionConfig::debug()
            .with_card_corner_radius(10.0)
            .with_dismissal_duration(0.8);
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = TransitionConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.debug_animating_views);
        assert_eq!(loaded.card_corner_radius, 10.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TransitionConfig::load("/nonexistent/folio/transition.toml").unwrap_err();
        assert!(matches!(err, TransitionError::Io(_)));
    }
}
