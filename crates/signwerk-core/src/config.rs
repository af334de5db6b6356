// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignwerkError};
use crate::types::{Point, Rgb, Size};

/// Smallest font size a text annotation may carry.
pub const MIN_FONT_SIZE: u32 = 8;
/// Largest font size a text annotation may carry.
pub const MAX_FONT_SIZE: u32 = 72;

/// Persistent editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size for newly placed text annotations.
    pub default_font_size: u32,
    /// Colour for newly placed text annotations, as `#rrggbb`.
    pub default_text_color: String,
    /// Scale at which pages are rasterised for the overlay. Overlay positions
    /// are divided by this factor when baked into the document.
    pub render_scale: f32,
    /// Size given to a signature when it is first placed.
    pub signature_size: Size,
    /// Overlay position at which a new signature is placed.
    pub signature_position: Point,
    /// Whether newly placed checkboxes start checked.
    pub checkbox_checked: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_font_size: 12,
            default_text_color: "#000000".into(),
            render_scale: 1.0,
            signature_size: Size::new(150.0, 60.0),
            signature_position: Point::new(50.0, 50.0),
            checkbox_checked: true,
        }
    }
}

impl EditorConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.normalized()
    }

    /// Clamp the font size into range and validate colour and scale.
    pub fn normalized(mut self) -> Result<Self> {
        self.default_font_size = self.default_font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        Rgb::from_hex(&self.default_text_color)?;
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(SignwerkError::Config(format!(
                "render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        Ok(self)
    }

    /// The default text colour, falling back to black if unparsable.
    pub fn text_color(&self) -> Rgb {
        Rgb::from_hex(&self.default_text_color).unwrap_or(Rgb::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_one_to_one() {
        let config = EditorConfig::default();
        assert_eq!(config.render_scale, 1.0);
        assert_eq!(config.default_font_size, 12);
        assert_eq!(config.text_color(), Rgb::BLACK);
    }

    #[test]
    fn partial_json_fills_defaults_and_clamps() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "default_font_size": 200 }"#).unwrap();
        let config = config.normalized().unwrap();
        assert_eq!(config.default_font_size, MAX_FONT_SIZE);
        assert!(config.checkbox_checked);
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let config = EditorConfig {
            render_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.normalized(), Err(SignwerkError::Config(_))));
    }

    #[test]
    fn bad_colour_is_rejected() {
        let config = EditorConfig {
            default_text_color: "red".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.normalized(),
            Err(SignwerkError::InvalidColor(_))
        ));
    }
}
