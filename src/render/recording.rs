use crate::assets::color::Color;
use crate::assets::decode::{DecodedImage, FontData};
use crate::foundation::core::{BezPath, Point, RasterFrame, Rect};
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::surface::{FontSpec, Surface};

/// One call observed by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`Surface::resize`].
    Resize {
        /// Device width.
        width: u32,
        /// Device height.
        height: u32,
    },
    /// [`Surface::scale`].
    Scale(f64),
    /// [`Surface::save`].
    Save,
    /// [`Surface::restore`].
    Restore,
    /// [`Surface::clip`], recorded by the clip path's bounding box.
    Clip {
        /// Bounding box of the clip path.
        bounds: Rect,
    },
    /// [`Surface::fill_rect`].
    FillRect {
        /// Filled rectangle.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// [`Surface::draw_image`].
    DrawImage {
        /// Intrinsic image size.
        image_size: (u32, u32),
        /// Destination rectangle.
        rect: Rect,
    },
    /// [`Surface::register_font`].
    RegisterFont {
        /// Declared family.
        family: String,
    },
    /// [`Surface::fill_text`].
    FillText {
        /// Drawn text.
        text: String,
        /// Baseline origin.
        baseline: Point,
        /// Text color.
        color: Color,
        /// Font active at the time of the call.
        font: FontSpec,
    },
}

/// Headless surface that records draw calls instead of rasterizing.
///
/// Text is measured with a fixed advance per character: `advance_em * font size`.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    advance_em: f64,
    size: (u32, u32),
    font: FontSpec,
    saved_fonts: Vec<FontSpec>,
    fonts: Vec<String>,
    commands: Vec<DrawCommand>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Recording surface with an advance of `0.6em` per character.
    pub fn new() -> Self {
        Self::with_advance(0.6)
    }

    /// Recording surface with a custom per-character advance, in ems.
    pub fn with_advance(advance_em: f64) -> Self {
        Self {
            advance_em,
            size: (0, 0),
            font: FontSpec::default(),
            saved_fonts: Vec::new(),
            fonts: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Every call recorded so far.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop the recorded calls, keeping surface state.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Text drawn so far, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of saves without a matching restore.
    pub fn depth(&self) -> usize {
        self.saved_fonts.len()
    }

    /// Families registered through [`Surface::register_font`].
    pub fn registered_fonts(&self) -> &[String] {
        &self.fonts
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) -> PosterResult<()> {
        if width == 0 || height == 0 {
            return Err(PosterError::validation("surface width/height must be > 0"));
        }
        self.size = (width, height);
        self.font = FontSpec::default();
        self.saved_fonts.clear();
        self.commands.push(DrawCommand::Resize { width, height });
        Ok(())
    }

    fn scale(&mut self, factor: f64) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn save(&mut self) {
        self.saved_fonts.push(self.font.clone());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(font) = self.saved_fonts.pop() {
            self.font = font;
            self.commands.push(DrawCommand::Restore);
        }
    }

    fn clip(&mut self, path: &BezPath) {
        use kurbo::Shape;

        self.commands.push(DrawCommand::Clip {
            bounds: path.bounding_box(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn draw_image(&mut self, image: &DecodedImage, rect: Rect) -> PosterResult<()> {
        self.commands.push(DrawCommand::DrawImage {
            image_size: (image.width, image.height),
            rect,
        });
        Ok(())
    }

    fn register_font(&mut self, font: &FontData) -> PosterResult<()> {
        if self.fonts.contains(&font.family) {
            return Ok(());
        }
        self.fonts.push(font.family.clone());
        self.commands.push(DrawCommand::RegisterFont {
            family: font.family.clone(),
        });
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font.size * self.advance_em
    }

    fn fill_text(&mut self, text: &str, baseline: Point, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            baseline,
            color,
            font: self.font.clone(),
        });
    }

    fn read_pixels(&mut self) -> PosterResult<RasterFrame> {
        let (width, height) = self.size;
        Ok(RasterFrame {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
            premultiplied: true,
        })
    }
}
