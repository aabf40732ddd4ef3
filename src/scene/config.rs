use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::assets::color::Color;
use crate::foundation::error::{PosterError, PosterResult};
use crate::scene::model::{Overflow, Radius, SceneNode};

/// Font size used by text nodes that do not set one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Instance-wide defaults, overridable per render call.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosterOptions {
    /// Logical canvas width.
    pub width: Option<f64>,
    /// Logical canvas height.
    pub height: Option<f64>,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f64,
    /// Font size for text nodes without `fontSize`.
    pub default_font_size: f64,
}

impl Default for PosterOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            pixel_ratio: 1.0,
            default_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Root of a render call: the canvas size plus the implicit root container.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterConfig {
    /// Logical canvas width; falls back to [`PosterOptions::width`].
    #[serde(default)]
    pub width: Option<f64>,
    /// Logical canvas height; falls back to [`PosterOptions::height`].
    #[serde(default)]
    pub height: Option<f64>,
    /// Device pixel ratio; falls back to [`PosterOptions::pixel_ratio`].
    #[serde(default)]
    pub pixel_ratio: Option<f64>,
    /// Fill of the whole canvas.
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Corner radius of the canvas box.
    #[serde(default)]
    pub border_radius: Option<Radius>,
    /// Whether children are clipped to the rounded canvas box.
    #[serde(default)]
    pub overflow: Overflow,
    /// Top-level nodes in draw order.
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

/// Canvas size after merging a [`PosterConfig`] over [`PosterOptions`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f64,
}

impl CanvasSize {
    /// Backing surface size in device pixels (rounded, at least 1).
    pub fn pixel_dims(self) -> (u32, u32) {
        let px = |v: f64| (v * self.pixel_ratio).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

impl PosterConfig {
    /// Parse a scene from a JSON file.
    pub fn from_json_file(path: &Path) -> PosterResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open scene '{}'", path.display()))?;
        let r = std::io::BufReader::new(f);
        let cfg = serde_json::from_reader(r)
            .with_context(|| format!("parse scene JSON '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Merge with `options` and validate the canvas size.
    pub fn canvas(&self, options: &PosterOptions) -> PosterResult<CanvasSize> {
        let width = self.width.or(options.width);
        let height = self.height.or(options.height);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(PosterError::validation("missing width or height"));
        };
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(PosterError::validation(
                "width and height must be finite and > 0",
            ));
        }
        let pixel_ratio = self.pixel_ratio.unwrap_or(options.pixel_ratio);
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(PosterError::validation("pixelRatio must be finite and > 0"));
        }
        Ok(CanvasSize {
            width,
            height,
            pixel_ratio,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
