//! Layout rendering.
//!
//! One dispatch over [`Slide`](crate::Slide), two media: [`screen`] builds a
//! visual tree for interactive display, [`export`] builds the drawing
//! primitives for the presentation file. Both read colors from the same
//! [`Theme`] and share the placement rules in this module.

pub mod export;
pub mod screen;

pub use export::{
    render_export, Align, ExportSlide, Frame, ImagePrimitive, Primitive, ShapeKind,
    ShapePrimitive, Stroke, TextPrimitive, VAlign,
};
pub use screen::{document_html, render_screen, Icon, Node, NodeKind};

use crate::image::ImageUrlBuilder;
use crate::theme::Theme;

/// Everything a render call needs besides the slide itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub images: &'a ImageUrlBuilder,
}

impl<'a> RenderContext<'a> {
    pub fn new(theme: &'a Theme, images: &'a ImageUrlBuilder) -> Self {
        Self { theme, images }
    }

    /// Image URL for a slide's image description, if it has one.
    pub fn image_url(&self, description: Option<&str>) -> Option<String> {
        self.images.url_for(description)
    }
}

/// Grid cell of the bento card at `index`, as `(column, row)`.
pub fn bento_cell(index: usize) -> (usize, usize) {
    (index % 2, index / 2)
}

/// Bar length as a percentage of the available width.
pub fn bar_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Icon shown on the bento card at `index`.
pub fn bento_icon(index: usize) -> Icon {
    match index {
        0 => Icon::Layout,
        1 => Icon::BarChart,
        2 => Icon::Type,
        _ => Icon::Grid,
    }
}

/// Center of marker `index` of `count` evenly spaced markers, as a fraction of the line.
pub fn marker_position(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.5;
    }
    (index as f64 + 0.5) / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bento_cell() {
        assert_eq!(bento_cell(0), (0, 0));
        assert_eq!(bento_cell(1), (1, 0));
        assert_eq!(bento_cell(2), (0, 1));
        assert_eq!(bento_cell(3), (1, 1));
        assert_eq!(bento_cell(6), (0, 3));
    }

    #[test]
    fn test_bar_percent_clamps() {
        assert_eq!(bar_percent(42.0), 42.0);
        assert_eq!(bar_percent(140.0), 100.0);
        assert_eq!(bar_percent(-3.0), 0.0);
        assert_eq!(bar_percent(f64::NAN), 0.0);
    }

    #[test]
    fn test_marker_positions_are_even() {
        let positions: Vec<f64> = (0..4).map(|i| marker_position(i, 4)).collect();
        assert_eq!(positions, vec![0.125, 0.375, 0.625, 0.875]);
        assert_eq!(marker_position(0, 1), 0.5);
    }
}
