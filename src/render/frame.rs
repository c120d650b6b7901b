use crate::core::BoundingBox;
use crate::error::{TimelineError, TimelineResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Backend-agnostic scene for one scaffolding draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub extent: BoundingBox,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(extent: BoundingBox) -> Self {
        Self {
            extent,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if self.extent.width() <= 0.0 || self.extent.height() <= 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "render extent must be non-empty: width={}, height={}",
                self.extent.width(),
                self.extent.height()
            )));
        }

        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}
