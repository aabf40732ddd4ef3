use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::color::Color;
use crate::assets::decode::{DecodedImage, FontData};
use crate::foundation::core::{Affine, BezPath, Point, RasterFrame, Rect};
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::surface::{FontSpec, Surface};

#[derive(Clone, Debug)]
struct DrawState {
    // Clip layers pushed since the matching save.
    clip_layers: usize,
    font: FontSpec,
}

/// CPU raster surface backed by `vello_cpu` with `parley` text shaping.
///
/// Generic families (`sans-serif`, `serif`, ...) resolve through the system font collection.
/// Fonts registered through [`Surface::register_font`] are looked up by their declared family.
pub struct CpuSurface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    base: Affine,
    state: DrawState,
    saved: Vec<DrawState>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Color>,
    // declared family -> family name reported by the font file
    aliases: HashMap<String, String>,
    // (declared family, font bytes) -> family name, so re-registration of a known file is free
    faces: HashMap<(String, usize), (Arc<Vec<u8>>, String)>,
    glyph_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
    image_cache: HashMap<usize, (Arc<Vec<u8>>, vello_cpu::Image)>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("base", &self.base)
            .field("saved", &self.saved.len())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl CpuSurface {
    /// Create a transparent surface of `width` x `height` device pixels.
    pub fn new(width: u32, height: u32) -> PosterResult<Self> {
        let (w, h) = surface_dims(width, height)?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
            base: Affine::IDENTITY,
            state: DrawState {
                clip_layers: 0,
                font: FontSpec::default(),
            },
            saved: Vec::new(),
            font_ctx: parley::FontContext::new(),
            layout_ctx: parley::LayoutContext::new(),
            aliases: HashMap::new(),
            faces: HashMap::new(),
            glyph_fonts: HashMap::new(),
            image_cache: HashMap::new(),
        })
    }

    /// Register every `.ttf`/`.otf`/`.ttc` file in `dir` under the family names the files declare.
    ///
    /// Returns the number of font files registered.
    pub fn load_font_dir(&mut self, dir: &Path) -> PosterResult<usize> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir '{}'", dir.display()))?;
        let mut count = 0usize;
        for entry in entries {
            let path = entry.context("read font dir entry")?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"));
            if !is_font {
                continue;
            }
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font file '{}'", path.display()))?;
            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes), None);
            tracing::debug!(path = %path.display(), families = families.len(), "registered font file");
            count += 1;
        }
        Ok(count)
    }

    /// Current device size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn resolve_family(&self, family: &str) -> String {
        match self.aliases.get(family) {
            Some(name) => format!("\"{name}\""),
            None => family.to_owned(),
        }
    }

    fn layout(&mut self, text: &str) -> parley::Layout<Color> {
        let font = &self.state.font;
        let family = self.resolve_family(&font.family);
        let size = font.size as f32;
        let weight = f32::from(font.weight.0);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));

        let mut layout: parley::Layout<Color> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    fn glyph_font(&mut self, blob_id: u64, index: u32, bytes: &[u8]) -> vello_cpu::peniko::FontData {
        self.glyph_fonts
            .entry((blob_id, index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.to_vec()), index)
            })
            .clone()
    }

    fn image_paint(&mut self, image: &DecodedImage) -> PosterResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some((_, paint)) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }

        let pixmap =
            pixmap_from_premul(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache
            .insert(key, (Arc::clone(&image.rgba8_premul), paint.clone()));
        Ok(paint)
    }

    fn pop_clip_layers(&mut self) {
        for _ in 0..self.state.clip_layers {
            self.ctx.pop_layer();
        }
        self.state.clip_layers = 0;
    }

    fn unwind(&mut self) {
        while let Some(prev) = self.saved.pop() {
            self.pop_clip_layers();
            self.state = prev;
        }
        self.pop_clip_layers();
    }
}

impl Surface for CpuSurface {
    fn resize(&mut self, width: u32, height: u32) -> PosterResult<()> {
        let (w, h) = surface_dims(width, height)?;
        self.ctx = vello_cpu::RenderContext::new(w, h);
        self.width = w;
        self.height = h;
        self.base = Affine::IDENTITY;
        self.saved.clear();
        self.state = DrawState {
            clip_layers: 0,
            font: FontSpec::default(),
        };
        self.image_cache.clear();
        self.glyph_fonts.clear();
        Ok(())
    }

    fn scale(&mut self, factor: f64) {
        self.base = self.base * Affine::scale(factor);
    }

    fn save(&mut self) {
        let snapshot = self.state.clone();
        self.state.clip_layers = 0;
        self.saved.push(snapshot);
    }

    fn restore(&mut self) {
        let Some(prev) = self.saved.pop() else {
            return;
        };
        self.pop_clip_layers();
        self.state = prev;
    }

    fn clip(&mut self, path: &BezPath) {
        self.ctx.set_transform(affine_to_cpu(self.base));
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
        self.state.clip_layers += 1;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_transform(affine_to_cpu(self.base));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn draw_image(&mut self, image: &DecodedImage, rect: Rect) -> PosterResult<()> {
        if image.width == 0 || image.height == 0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Ok(());
        }
        let paint = self.image_paint(image)?;
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let transform = self.base
            * Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);

        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        Ok(())
    }

    fn register_font(&mut self, font: &FontData) -> PosterResult<()> {
        let key = (font.family.clone(), Arc::as_ptr(&font.bytes) as usize);
        if let Some((_, name)) = self.faces.get(&key) {
            self.aliases.insert(font.family.clone(), name.clone());
            return Ok(());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PosterError::validation(format!(
                "font for family '{}' contains no usable faces",
                font.family
            ))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %font.family, resolved = %name, "registered font");
        if self.aliases.contains_key(&font.family) {
            tracing::warn!(
                family = %font.family,
                resolved = %name,
                "font family declared with another source; following text uses this file"
            );
        }
        self.faces
            .insert(key, (Arc::clone(&font.bytes), name.clone()));
        self.aliases.insert(font.family.clone(), name);
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        // Trailing whitespace counts, as with canvas `measureText`.
        f64::from(self.layout(text).full_width())
    }

    fn fill_text(&mut self, text: &str, baseline: Point, color: Color) {
        if text.is_empty() {
            return;
        }
        let layout = self.layout(text);
        let Some(first_baseline) = layout.lines().next().map(|l| f64::from(l.metrics().baseline))
        else {
            return;
        };

        let transform = self.base * Affine::translate((baseline.x, baseline.y - first_baseline));
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let mut x = run.offset();
                let y = run.baseline();
                let glyphs: Vec<vello_cpu::Glyph> = run
                    .glyphs()
                    .map(|g| {
                        let glyph = vello_cpu::Glyph {
                            id: u32::from(g.id),
                            x: x + g.x,
                            y: y - g.y,
                        };
                        x += g.advance;
                        glyph
                    })
                    .collect();

                let run_font = run.run().font();
                let font = self.glyph_font(run_font.data.id(), run_font.index, run_font.data.data());
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs.into_iter());
            }
        }
    }

    fn read_pixels(&mut self) -> PosterResult<RasterFrame> {
        self.unwind();

        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        Ok(RasterFrame {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn surface_dims(width: u32, height: u32) -> PosterResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(PosterError::validation("surface width/height must be > 0"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::unsupported("cpu surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::unsupported("cpu surface height exceeds u16"))?;
    Ok((w, h))
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul(rgba8_premul: &[u8], width: u32, height: u32) -> PosterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::unsupported("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::unsupported("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PosterError::validation("decoded image byte length mismatch"));
    }

    let mut opaque = true;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            opaque &= px[3] == 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, !opaque))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
