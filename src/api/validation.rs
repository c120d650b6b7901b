use crate::core::primitives::{ensure_finite, ensure_non_negative, ensure_positive};
use crate::error::{TimelineError, TimelineResult};

use super::{BarStyle, BarStyleOverride, LayoutRequest, TimelineEngineConfig};

pub(super) fn validate_engine_config(config: &TimelineEngineConfig) -> TimelineResult<()> {
    ensure_non_negative(config.padding, "padding")?;
    ensure_positive(config.min_bar_width, "min bar width")?;
    ensure_non_negative(config.time_margin_ratio, "time margin ratio")?;
    ensure_non_negative(config.collision_step, "collision step")?;
    ensure_non_negative(config.bar_margin, "bar margin")?;
    ensure_non_negative(config.bounds_tolerance, "bounds tolerance")?;
    ensure_finite(config.entity_offset_y, "entity offset")?;
    validate_bar_style(&config.bar_style)?;

    let scaffold = &config.scaffold_style;
    scaffold.tick_color.validate()?;
    scaffold.connector_color.validate()?;
    ensure_positive(scaffold.tick_length_px, "tick length")?;
    ensure_positive(scaffold.tick_font_size_px, "tick font size")?;
    ensure_positive(scaffold.connector_stroke_width, "connector stroke width")?;

    if config.unlock_retry_interval_ms == 0 {
        return Err(TimelineError::InvalidData(
            "unlock retry interval must be > 0 ms".to_owned(),
        ));
    }
    if config.unlock_retry_max_attempts == 0 {
        return Err(TimelineError::InvalidData(
            "unlock retry attempts must be > 0".to_owned(),
        ));
    }
    Ok(())
}

pub(super) fn validate_bar_style(style: &BarStyle) -> TimelineResult<()> {
    ensure_positive(style.height, "bar height")?;
    style.color.validate()?;
    if style.class_name.trim().is_empty() {
        return Err(TimelineError::InvalidData(
            "bar class name must not be empty".to_owned(),
        ));
    }
    Ok(())
}

fn validate_bar_style_override(style_override: &BarStyleOverride) -> TimelineResult<()> {
    if let Some(height) = style_override.height {
        ensure_positive(height, "bar height override")?;
    }
    if let Some(color) = style_override.color {
        color.validate()?;
    }
    if style_override
        .class_name
        .as_ref()
        .is_some_and(|class_name| class_name.trim().is_empty())
    {
        return Err(TimelineError::InvalidData(
            "bar class name override must not be empty".to_owned(),
        ));
    }
    Ok(())
}

pub(super) fn validate_layout_request(request: &LayoutRequest) -> TimelineResult<()> {
    if let Some(padding) = request.padding {
        ensure_non_negative(padding, "request padding")?;
    }
    if let Some(min_bar_width) = request.min_bar_width {
        ensure_positive(min_bar_width, "request min bar width")?;
    }
    if let Some(style_override) = &request.bar_style {
        validate_bar_style_override(style_override)?;
    }
    Ok(())
}
