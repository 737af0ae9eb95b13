//! Visual scale of the sheet as a function of its offset.
//!
//! When collapsed the sheet is inset by a corner margin on both sides. It
//! grows linearly to full width as it is dragged from the collapsed anchor up
//! to the full-width anchor and stays at full width above that.

use browsesheet_ui_graphics::{Px, Size};

use crate::anchors::SheetAnchors;
use crate::gesture_constants::CORNER_MARGIN_DP;
use crate::sheet_state::SheetState;

/// Scale for `offset` with the default 12px corner margin.
pub fn scale(offset: f32, max_width: f32, collapsed_offset: f32, full_width_offset: f32) -> f32 {
    scale_with_margin(
        offset,
        max_width,
        collapsed_offset,
        full_width_offset,
        CORNER_MARGIN_DP,
    )
}

pub fn scale_with_margin(
    offset: f32,
    max_width: f32,
    collapsed_offset: f32,
    full_width_offset: f32,
    corner_margin: f32,
) -> f32 {
    if !(max_width > 0.0) {
        return 1.0;
    }
    let collapsed_scale = ((max_width - 2.0 * corner_margin) / max_width).max(0.0);
    if offset < full_width_offset {
        1.0
    } else if offset < collapsed_offset {
        // Reached only when collapsed_offset > full_width_offset.
        let progress = (collapsed_offset - offset) / (collapsed_offset - full_width_offset);
        collapsed_scale + progress * (1.0 - collapsed_scale)
    } else {
        collapsed_scale
    }
}

pub fn sheet_scale(offset: f32, max_width: f32, anchors: &SheetAnchors, corner_margin: f32) -> f32 {
    scale_with_margin(
        offset,
        max_width,
        anchors.collapsed_offset,
        anchors.full_width_offset,
        corner_margin,
    )
}

/// Transform a renderer applies to the sheet for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetTransform {
    pub scale: f32,
    /// Offset rounded to whole pixels.
    pub translation_y: Px,
}

impl SheetTransform {
    pub fn from_state(state: &SheetState, size: Size) -> Self {
        let offset = state.offset();
        let anchors = state.anchors();
        if size.width <= 0.0 {
            log::debug!("sheet transform for zero width");
        }
        let scale = if anchors.is_empty() {
            1.0
        } else {
            sheet_scale(
                offset,
                size.width,
                &anchors,
                state.config().corner_margin_px(),
            )
        };
        Self {
            scale,
            translation_y: Px((offset + 0.5).floor()),
        }
    }
}
