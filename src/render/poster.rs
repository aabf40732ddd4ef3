use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::assets::cache::AssetCache;
use crate::assets::color::Color;
use crate::assets::decode::FontData;
use crate::assets::loader::{FontLoader, FsAssetLoader, ImageLoader};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{AssetError, PosterError, PosterResult};
use crate::geometry::align::align_offset;
use crate::geometry::path::rounded_rect_path;
use crate::geometry::radius::normalize_radius;
use crate::layout::object_fit::place_image;
use crate::layout::text::break_lines;
use crate::render::export::{ExportOptions, ExportedImage, Exporter};
use crate::render::report::{NodeKind, RenderReport, SkipReason};
use crate::render::surface::{FontSpec, Surface, SurfaceScope};
use crate::scene::config::{CanvasSize, PosterConfig, PosterOptions};
use crate::scene::model::{
    ImageNode, Overflow, Radius, SceneNode, TextDecoration, TextNode,
};
use crate::scene::normalize::{NormalizedNode, Placed, normalize};

/// Text color used when a node sets none.
pub const DEFAULT_TEXT_COLOR: Color = Color::rgba(0x33, 0x33, 0x33, 0xff);
/// Font family used when a node sets none.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
/// Line height as a multiple of the font size when a node sets none.
pub const DEFAULT_LINE_HEIGHT_FACTOR: f64 = 1.43;

// Line-through bar placement, as fractions of the font size.
const STRIKE_OFFSET: f64 = 0.64;
const STRIKE_THICKNESS: f64 = 1.0 / 14.0;

/// Measured box of an `id`-tagged text node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextSize {
    /// Box width when set, otherwise the measured width of the whole content.
    pub width: f64,
    /// `lineHeight * lineCount`.
    pub height: f64,
}

/// Renders declarative scenes onto a [`Surface`].
///
/// A `Poster` owns one asset cache for its lifetime: every image `src` and font `fontSrc` is
/// loaded at most once, and failed loads stay failed until [`Poster::clear_assets`].
pub struct Poster<S: Surface> {
    surface: S,
    options: PosterOptions,
    assets: AssetCache,
    images: Rc<dyn ImageLoader>,
    fonts: Rc<dyn FontLoader>,
    exporter: Option<Box<dyn Exporter>>,
    canvas: Option<CanvasSize>,
    sizes: HashMap<String, TextSize>,
}

impl<S: Surface> std::fmt::Debug for Poster<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poster")
            .field("options", &self.options)
            .field("canvas", &self.canvas)
            .field("images_cached", &self.assets.images().len())
            .field("fonts_cached", &self.assets.fonts().len())
            .field("has_exporter", &self.exporter.is_some())
            .finish()
    }
}

impl<S: Surface> Poster<S> {
    /// Poster drawing onto `surface`, loading assets from the current directory.
    pub fn new(surface: S, options: PosterOptions) -> Self {
        let loader = Rc::new(FsAssetLoader::new("."));
        Self {
            surface,
            options,
            assets: AssetCache::new(),
            images: loader.clone(),
            fonts: loader,
            exporter: None,
            canvas: None,
            sizes: HashMap::new(),
        }
    }

    /// Use `loader` for both images and fonts.
    pub fn with_loader<L>(mut self, loader: L) -> Self
    where
        L: ImageLoader + FontLoader + 'static,
    {
        let loader = Rc::new(loader);
        self.images = loader.clone();
        self.fonts = loader;
        self
    }

    /// Use separate image and font loaders.
    pub fn with_loaders(
        mut self,
        images: impl ImageLoader + 'static,
        fonts: impl FontLoader + 'static,
    ) -> Self {
        self.images = Rc::new(images);
        self.fonts = Rc::new(fonts);
        self
    }

    /// Enable [`Poster::export`] through `exporter`.
    pub fn with_exporter(mut self, exporter: impl Exporter + 'static) -> Self {
        self.exporter = Some(Box::new(exporter));
        self
    }

    /// The drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the drawing surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give back the drawing surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The asset cache shared by every render of this poster.
    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// Forget every cached image and font, including failed loads.
    pub fn clear_assets(&self) {
        self.assets.clear();
    }

    /// Canvas of the last successful [`Poster::render`].
    pub fn canvas(&self) -> Option<CanvasSize> {
        self.canvas
    }

    /// Draw the whole scene, starting from a freshly sized surface.
    ///
    /// Fails only when the canvas size is missing or invalid, or the surface cannot be sized.
    /// Nodes whose resources fail to load are skipped and listed in the report.
    #[tracing::instrument(skip_all, fields(children = config.children.len()))]
    pub async fn render(&mut self, config: &PosterConfig) -> PosterResult<RenderReport> {
        let canvas = config.canvas(&self.options)?;
        let (width, height) = canvas.pixel_dims();
        self.surface.resize(width, height)?;
        self.surface.scale(canvas.pixel_ratio);
        self.canvas = Some(canvas);
        self.sizes.clear();

        let root = BoxStyle {
            rect: Rect::new(0.0, 0.0, canvas.width, canvas.height),
            background: config.background_color,
            radius: config.border_radius.as_ref(),
            overflow: config.overflow,
            children: &config.children,
        };

        let mut report = RenderReport::default();
        self.pass(&mut report).draw_box(root).await;
        report.record(NodeKind::Container, Ok(()));

        tracing::info!(
            width,
            height,
            drawn = report.drawn,
            skipped = report.skipped.len(),
            "rendered poster"
        );
        Ok(report)
    }

    /// Draw `nodes` on top of the current surface, positioned against the origin.
    ///
    /// Assets are requested for all of `nodes` before the first one is drawn. Failing nodes are
    /// skipped.
    pub async fn draw(&mut self, nodes: &[SceneNode]) -> RenderReport {
        let mut report = RenderReport::default();
        self.pass(&mut report)
            .draw_children(nodes, Point::ZERO)
            .await;
        report
    }

    /// Measured size of the text node drawn with `id`.
    pub fn get_size(&self, id: &str) -> Option<TextSize> {
        self.sizes.get(id).copied()
    }

    /// Encode the surface through the configured exporter.
    pub async fn export(&mut self, options: &ExportOptions) -> PosterResult<ExportedImage> {
        let Some(exporter) = &self.exporter else {
            return Err(PosterError::unsupported(
                "no export backend configured for this poster",
            ));
        };
        let frame = self.surface.read_pixels()?;
        let request = options.resolve(frame.width, frame.height)?;
        exporter.export(frame, request).await
    }

    fn pass<'p>(&'p mut self, report: &'p mut RenderReport) -> Pass<'p, S> {
        Pass {
            surface: &mut self.surface,
            assets: &self.assets,
            images: self.images.as_ref(),
            fonts: self.fonts.as_ref(),
            default_font_size: self.options.default_font_size,
            sizes: &mut self.sizes,
            report,
        }
    }
}

struct BoxStyle<'n> {
    rect: Rect,
    background: Option<Color>,
    radius: Option<&'n Radius>,
    overflow: Overflow,
    children: &'n [SceneNode],
}

// Borrowed state of one render or draw call.
struct Pass<'p, S> {
    surface: &'p mut S,
    assets: &'p AssetCache,
    images: &'p dyn ImageLoader,
    fonts: &'p dyn FontLoader,
    default_font_size: f64,
    sizes: &'p mut HashMap<String, TextSize>,
    report: &'p mut RenderReport,
}

impl<S: Surface> Pass<'_, S> {
    fn preload(&self, nodes: &[SceneNode]) {
        for node in nodes {
            match node {
                SceneNode::Image(image) => {
                    let _ = self.assets.request_image(&image.src, self.images);
                }
                SceneNode::Text(TextNode {
                    font_family: Some(family),
                    font_src: Some(src),
                    ..
                }) => {
                    let _ = self.assets.request_font(family, src, self.fonts);
                }
                SceneNode::Text(_) | SceneNode::Container(_) => {}
            }
        }
    }

    async fn draw_children(&mut self, children: &[SceneNode], origin: Point) {
        self.preload(children);
        for child in children {
            self.draw_node(child, origin).await;
        }
    }

    fn draw_node<'f>(&'f mut self, node: &'f SceneNode, parent: Point) -> LocalBoxFuture<'f, ()> {
        async move {
            match normalize(node, parent) {
                NormalizedNode::Container(placed) => {
                    let style = BoxStyle {
                        rect: placed.rect(),
                        background: placed.node.background_color,
                        radius: placed.node.border_radius.as_ref(),
                        overflow: placed.node.overflow,
                        children: &placed.node.children,
                    };
                    self.draw_box(style).await;
                    self.report.record(NodeKind::Container, Ok(()));
                }
                NormalizedNode::Image(placed) => {
                    let outcome = self.draw_image(placed).await;
                    self.report.record(NodeKind::Image, outcome);
                }
                NormalizedNode::Text(placed) => {
                    let outcome = self.draw_text(placed).await;
                    self.report.record(NodeKind::Text, outcome);
                }
            }
        }
        .boxed_local()
    }

    async fn draw_box(&mut self, style: BoxStyle<'_>) {
        let radii = box_radii(style.radius, style.rect);
        let path = rounded_rect_path(style.rect, radii);
        let origin = style.rect.origin();

        let mut scope = SurfaceScope::enter(&mut *self.surface);
        scope.clip(&path);
        if let Some(color) = style.background {
            scope.fill_rect(style.rect, color);
        }

        match style.overflow {
            Overflow::Hidden => {
                let mut inner = Pass {
                    surface: &mut *scope,
                    assets: self.assets,
                    images: self.images,
                    fonts: self.fonts,
                    default_font_size: self.default_font_size,
                    sizes: &mut *self.sizes,
                    report: &mut *self.report,
                };
                inner.draw_children(style.children, origin).await;
            }
            Overflow::Visible => {
                drop(scope);
                self.draw_children(style.children, origin).await;
            }
        }
    }

    async fn draw_image(&mut self, placed: Placed<'_, ImageNode>) -> Result<(), SkipReason> {
        let node = placed.node;
        let image = self
            .assets
            .images()
            .await_ready(&node.src)
            .await
            .map_err(SkipReason::Image)?;

        let rect = placed.rect();
        let path = rounded_rect_path(rect, box_radii(node.border_radius.as_ref(), rect));

        let mut scope = SurfaceScope::enter(&mut *self.surface);
        scope.clip(&path);
        if let Some(color) = node.background_color {
            scope.fill_rect(rect, color);
        }
        let target = place_image(
            f64::from(image.width),
            f64::from(image.height),
            rect,
            node.object_fit,
        );
        scope
            .draw_image(&image, target)
            .map_err(|e| SkipReason::Surface(e.to_string()))
    }

    async fn draw_text(&mut self, placed: Placed<'_, TextNode>) -> Result<(), SkipReason> {
        let node = placed.node;
        let family = node.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY);

        if let (Some(_), Some(src)) = (&node.font_family, &node.font_src) {
            let font = self
                .assets
                .fonts()
                .await_ready(src)
                .await
                .map_err(SkipReason::Font)?;
            // The cache is keyed by source, so another node may have loaded it as a different family.
            let registered = if font.family == family {
                self.surface.register_font(&font)
            } else {
                self.surface.register_font(&FontData {
                    family: family.to_owned(),
                    bytes: font.bytes.clone(),
                })
            };
            registered.map_err(|e| SkipReason::Font(AssetError::new(src, e.to_string())))?;
        }

        let font_size = node.font_size.unwrap_or(self.default_font_size);
        let line_height = node
            .line_height
            .unwrap_or(font_size * DEFAULT_LINE_HEIGHT_FACTOR);
        let color = node.color.unwrap_or(DEFAULT_TEXT_COLOR);

        let mut scope = SurfaceScope::enter(&mut *self.surface);
        scope.set_font(&FontSpec {
            family: family.to_owned(),
            size: font_size,
            weight: node.font_weight,
        });

        // A zero-width box does not constrain the text.
        let box_width = node.width.filter(|w| *w > 0.0);
        let clamp = node.line_clamp.map(|c| c as usize);
        let lines = break_lines(&node.content, box_width, |s| scope.measure_text(s), clamp);

        for (i, line) in lines.iter().enumerate() {
            let line_top = placed.top() + (line_height - font_size) / 2.0 + line_height * i as f64;
            let line_width = scope.measure_text(line);
            let x = align_offset(placed.left(), node.text_align, box_width, Some(line_width));
            scope.fill_text(line, Point::new(x, line_top + font_size), color);

            if node.text_decoration == TextDecoration::LineThrough {
                let bar = Rect::from_origin_size(
                    (x, line_top + font_size * STRIKE_OFFSET),
                    (line_width, font_size * STRIKE_THICKNESS),
                );
                scope.fill_rect(bar, color);
            }
        }

        if let Some(id) = &node.id {
            let width = match box_width {
                Some(w) => w,
                None => scope.measure_text(&node.content),
            };
            let size = TextSize {
                width,
                height: line_height * lines.len() as f64,
            };
            tracing::debug!(id = %id, width = size.width, height = size.height, "recorded text size");
            self.sizes.insert(id.clone(), size);
        }
        Ok(())
    }
}

fn box_radii(radius: Option<&Radius>, rect: Rect) -> [f64; 4] {
    match radius {
        Some(r) => normalize_radius(r, rect.width(), rect.height()),
        None => [0.0; 4],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/poster.rs"]
mod tests;
