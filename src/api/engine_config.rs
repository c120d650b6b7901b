use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::render::Color;

use super::validation::validate_engine_config;

/// Visual style of a scope's axis bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarStyle {
    pub height: f64,
    pub color: Color,
    pub class_name: String,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            height: 6.0,
            color: Color::rgb(0.55, 0.57, 0.62),
            class_name: "timeline-bar".to_owned(),
        }
    }
}

impl BarStyle {
    /// Applies the fields present in `style_override`.
    #[must_use]
    pub fn with_override(mut self, style_override: &BarStyleOverride) -> Self {
        if let Some(height) = style_override.height {
            self.height = height;
        }
        if let Some(color) = style_override.color {
            self.color = color;
        }
        if let Some(class_name) = &style_override.class_name {
            self.class_name.clone_from(class_name);
        }
        self
    }
}

/// Caller-supplied partial bar style for one layout invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarStyleOverride {
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub class_name: Option<String>,
}

/// Styling shared by anchors, ticks and connectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldStyleConfig {
    pub anchor_class: String,
    pub tick_class: String,
    pub connector_class: String,
    pub tick_color: Color,
    pub connector_color: Color,
    pub tick_length_px: f64,
    pub tick_font_size_px: f64,
    pub connector_stroke_width: f64,
}

impl Default for ScaffoldStyleConfig {
    fn default() -> Self {
        Self {
            anchor_class: "timeline-anchor".to_owned(),
            tick_class: "timeline-tick".to_owned(),
            connector_class: "timeline-connector".to_owned(),
            tick_color: Color::rgb(0.35, 0.37, 0.42),
            connector_color: Color::rgba(0.55, 0.57, 0.62, 0.8),
            tick_length_px: 8.0,
            tick_font_size_px: 11.0,
            connector_stroke_width: 1.0,
        }
    }
}

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load timeline
/// tuning without inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEngineConfig {
    /// Horizontal inset of the projection region inside its bounding region.
    pub padding: f64,
    pub min_bar_width: f64,
    /// Fraction of the raw time span added on both ends of the axis.
    pub time_margin_ratio: f64,
    pub collision_step: f64,
    /// Extra bar length beyond the outermost placed entity.
    pub bar_margin: f64,
    pub bounds_tolerance: f64,
    /// Distance above the axis at which freshly laid out entities are placed.
    pub entity_offset_y: f64,
    pub bar_style: BarStyle,
    pub scaffold_style: ScaffoldStyleConfig,
    pub unlock_retry_interval_ms: u64,
    pub unlock_retry_max_attempts: u32,
}

impl Default for TimelineEngineConfig {
    fn default() -> Self {
        Self {
            padding: 50.0,
            min_bar_width: 200.0,
            time_margin_ratio: 0.05,
            collision_step: 10.0,
            bar_margin: 20.0,
            bounds_tolerance: crate::core::BOUNDS_TOLERANCE,
            entity_offset_y: 80.0,
            bar_style: BarStyle::default(),
            scaffold_style: ScaffoldStyleConfig::default(),
            unlock_retry_interval_ms: 100,
            unlock_retry_max_attempts: 50,
        }
    }
}

impl TimelineEngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_min_bar_width(mut self, min_bar_width: f64) -> Self {
        self.min_bar_width = min_bar_width;
        self
    }

    #[must_use]
    pub fn with_time_margin_ratio(mut self, ratio: f64) -> Self {
        self.time_margin_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_collision_step(mut self, step: f64) -> Self {
        self.collision_step = step;
        self
    }

    #[must_use]
    pub fn with_bar_margin(mut self, bar_margin: f64) -> Self {
        self.bar_margin = bar_margin;
        self
    }

    #[must_use]
    pub fn with_entity_offset_y(mut self, offset: f64) -> Self {
        self.entity_offset_y = offset;
        self
    }

    #[must_use]
    pub fn with_bar_style(mut self, style: BarStyle) -> Self {
        self.bar_style = style;
        self
    }

    /// Sets the Bar unlock retry cadence used after restore passes.
    #[must_use]
    pub fn with_unlock_retry(mut self, interval_ms: u64, max_attempts: u32) -> Self {
        self.unlock_retry_interval_ms = interval_ms;
        self.unlock_retry_max_attempts = max_attempts;
        self
    }

    pub fn validate(self) -> TimelineResult<Self> {
        validate_engine_config(&self)?;
        Ok(self)
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            TimelineError::InvalidData(format!("failed to serialize engine config: {e}"))
        })
    }

    /// Parses a config; missing fields take their defaults.
    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            TimelineError::InvalidData(format!("failed to parse engine config json: {e}"))
        })?;
        config.validate()
    }
}
