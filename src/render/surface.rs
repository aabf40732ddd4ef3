use std::ops::{Deref, DerefMut};

use crate::assets::color::Color;
use crate::assets::decode::{DecodedImage, FontData};
use crate::foundation::core::{BezPath, Point, RasterFrame, Rect};
use crate::foundation::error::PosterResult;
use crate::scene::model::FontWeight;

/// Font selection applied to subsequent text calls.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Family name or CSS generic family.
    pub family: String,
    /// Size in logical pixels.
    pub size: f64,
    /// Weight.
    pub weight: FontWeight,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_owned(),
            size: crate::scene::config::DEFAULT_FONT_SIZE,
            weight: FontWeight::NORMAL,
        }
    }
}

impl FontSpec {
    /// CSS `font` shorthand, e.g. `700 16px sans-serif`.
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight.0, self.size, self.family)
    }
}

/// 2D drawing capability the renderer draws through.
///
/// Coordinates are logical pixels; [`Surface::scale`] maps them to device pixels. State saved by
/// [`Surface::save`] covers the clip and the current font.
pub trait Surface {
    /// Reset the surface to `width` x `height` device pixels, clearing content, clip, font and
    /// scale.
    fn resize(&mut self, width: u32, height: u32) -> PosterResult<()>;
    /// Multiply the current scale by `factor`.
    fn scale(&mut self, factor: f64);
    /// Push the current clip and font.
    fn save(&mut self);
    /// Pop back to the last saved clip and font. Does nothing without a matching save.
    fn restore(&mut self);
    /// Intersect the clip with `path`.
    fn clip(&mut self, path: &BezPath);
    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Draw `image` stretched into `rect`.
    fn draw_image(&mut self, image: &DecodedImage, rect: Rect) -> PosterResult<()>;
    /// Make `font` available under its family name. Registering a family twice is a no-op.
    fn register_font(&mut self, font: &FontData) -> PosterResult<()>;
    /// Select the font for measuring and drawing text.
    fn set_font(&mut self, font: &FontSpec);
    /// Advance width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;
    /// Draw `text` left-aligned with its alphabetic baseline starting at `baseline`.
    fn fill_text(&mut self, text: &str, baseline: Point, color: Color);
    /// Read the surface back as RGBA8 pixels.
    fn read_pixels(&mut self) -> PosterResult<RasterFrame>;
}

/// Saves surface state on creation and restores it when dropped.
pub struct SurfaceScope<'s, S: Surface + ?Sized> {
    surface: &'s mut S,
}

impl<'s, S: Surface + ?Sized> SurfaceScope<'s, S> {
    /// Save `surface` state for the lifetime of the returned guard.
    pub fn enter(surface: &'s mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for SurfaceScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SurfaceScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SurfaceScope<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}
