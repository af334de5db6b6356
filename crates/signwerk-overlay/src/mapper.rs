// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate mapper — overlay space to document space.
//
// Overlay space has its origin at the top-left with y growing downward;
// document space has its origin at the bottom-left with y growing upward. Both
// share the left edge, so only the vertical axis flips. The mapper performs no
// unit conversion: values must already be in document units (see
// `OverlayScale`).

use signwerk_core::Point;

/// A position in document space (origin bottom-left, y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentPoint {
    pub x: f32,
    pub y: f32,
}

/// Flip an overlay point into document space on a page of height `page_height`.
pub fn to_document_space(point: Point, page_height: f32) -> DocumentPoint {
    DocumentPoint {
        x: point.x,
        y: page_height - point.y,
    }
}

/// Inverse of [`to_document_space`].
pub fn to_overlay_space(point: DocumentPoint, page_height: f32) -> Point {
    Point::new(point.x, page_height - point.y)
}

/// Document-space y of the bottom edge of an object whose overlay top edge is
/// `top_y` and whose height is `height`.
pub fn document_bottom(top_y: f32, height: f32, page_height: f32) -> f32 {
    page_height - top_y - height
}

/// Ratio of overlay pixels to document units.
///
/// The overlay raster is rendered at some scale; positions and sizes captured
/// on it must be divided by the same scale before mapping, or drawn output is
/// misaligned. `OverlayScale::IDENTITY` is the 1:1 mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayScale(f32);

impl OverlayScale {
    pub const IDENTITY: OverlayScale = OverlayScale(1.0);

    /// Non-finite or non-positive scales fall back to 1:1.
    pub fn new(pixels_per_unit: f32) -> Self {
        if pixels_per_unit.is_finite() && pixels_per_unit > 0.0 {
            Self(pixels_per_unit)
        } else {
            Self::IDENTITY
        }
    }

    pub fn factor(&self) -> f32 {
        self.0
    }

    /// Convert an overlay length to document units.
    pub fn to_units(&self, pixels: f32) -> f32 {
        pixels / self.0
    }

    /// Convert an overlay point to document units, without flipping.
    pub fn point_to_units(&self, point: Point) -> Point {
        Point::new(self.to_units(point.x), self.to_units(point.y))
    }
}

impl Default for OverlayScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_keeps_x_and_inverts_y() {
        let doc = to_document_space(Point::new(10.0, 10.0), 792.0);
        assert_eq!(doc, DocumentPoint { x: 10.0, y: 782.0 });
    }

    #[test]
    fn flip_round_trips() {
        for (x, y, h) in [(0.0, 0.0, 100.0), (12.5, 99.0, 842.0), (-3.0, 900.0, 612.0)] {
            let doc = to_document_space(Point::new(x, y), h);
            assert_eq!(to_overlay_space(doc, h), Point::new(x, y));
        }
    }

    #[test]
    fn bottom_anchor_recovers_top_edge() {
        let (y, height, h) = (120.0, 40.0, 792.0);
        let bottom = document_bottom(y, height, h);
        assert_eq!(bottom, 632.0);
        assert_eq!(h - bottom - height, y);
    }

    #[test]
    fn scale_divides_overlay_values() {
        let scale = OverlayScale::new(2.0);
        assert_eq!(scale.to_units(30.0), 15.0);
        assert_eq!(scale.point_to_units(Point::new(8.0, 4.0)), Point::new(4.0, 2.0));
    }

    #[test]
    fn invalid_scale_falls_back_to_identity() {
        assert_eq!(OverlayScale::new(0.0), OverlayScale::IDENTITY);
        assert_eq!(OverlayScale::new(f32::NAN), OverlayScale::IDENTITY);
        assert_eq!(OverlayScale::new(-1.5).factor(), 1.0);
    }
}
