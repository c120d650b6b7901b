use crate::core::ScaffoldKind;
use crate::render::{LinePrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive};

use super::TimelineEngine;

const TICK_STROKE_WIDTH: f64 = 1.0;
const TICK_LABEL_GAP_PX: f64 = 2.0;

impl<R: Renderer> TimelineEngine<R> {
    /// Materializes visible scaffolding (bars, ticks, connectors) of every scope.
    #[must_use]
    pub fn build_render_frame(&self) -> RenderFrame {
        let style = &self.core.config.scaffold_style;
        let index = &self.core.session.scaffolding;
        let mut frame = RenderFrame::new(self.core.graph.viewport_extent());

        for element in index.elements().filter(|element| element.style.visible) {
            let position = element.position;
            match &element.kind {
                ScaffoldKind::Bar(geometry) => {
                    frame.rects.push(RectPrimitive::new(
                        position.x - geometry.width / 2.0,
                        position.y - geometry.height / 2.0,
                        geometry.width,
                        geometry.height,
                        element.style.color,
                    ));
                }
                ScaffoldKind::Tick { label, .. } => {
                    let half = style.tick_length_px / 2.0;
                    frame.lines.push(LinePrimitive::new(
                        position.x,
                        position.y - half,
                        position.x,
                        position.y + half,
                        TICK_STROKE_WIDTH,
                        element.style.color,
                    ));
                    frame.texts.push(TextPrimitive::new(
                        label.clone(),
                        position.x,
                        position.y + half + TICK_LABEL_GAP_PX + style.tick_font_size_px,
                        style.tick_font_size_px,
                        element.style.color,
                        TextHAlign::Center,
                    ));
                }
                ScaffoldKind::Anchor { .. } => {}
            }
        }

        for connector in index.connectors().filter(|connector| connector.style.visible) {
            let (Some(anchor), Some(target)) = (
                index.get(&connector.anchor),
                self.core.graph.get(&connector.target),
            ) else {
                continue;
            };
            if !anchor.position.is_finite() || !target.position.is_finite() {
                continue;
            }
            frame.lines.push(LinePrimitive::new(
                anchor.position.x,
                anchor.position.y,
                target.position.x,
                target.position.y,
                style.connector_stroke_width,
                connector.style.color,
            ));
        }

        frame
    }
}
