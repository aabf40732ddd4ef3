//! posterkit renders declarative poster scenes to a single raster image.
//!
//! A scene is a tree of absolutely positioned nodes: containers (background, rounded corners,
//! clipping), images and text blocks. Rendering goes through a [`Poster`]:
//!
//! - Describe the scene as a [`PosterConfig`] (in Rust or JSON)
//! - Create a [`Poster`] over a [`Surface`] such as [`CpuSurface`]
//! - [`Poster::render`] it, then [`Poster::export`] the result through an [`Exporter`]
//!
//! Images and fonts are loaded through [`ImageLoader`]/[`FontLoader`] capabilities and cached
//! per poster. A resource that fails to load skips its node; the rest of the scene still draws.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod geometry;
mod layout;
mod render;
mod scene;

pub use crate::foundation::core::{Affine, BezPath, Point, RasterFrame, Rect, Size, Vec2};
pub use crate::foundation::error::{AssetError, PosterError, PosterResult};

pub use crate::assets::cache::{AssetCache, AssetHandle, AssetKind, AssetSlots, LoadOutcome};
pub use crate::assets::color::Color;
pub use crate::assets::decode::{DecodedImage, FontData, decode_image};
pub use crate::assets::loader::{
    FontLoader, FsAssetLoader, ImageLoader, LoadFuture, normalize_rel_path,
};

pub use crate::geometry::align::align_offset;
pub use crate::geometry::path::rounded_rect_path;
pub use crate::geometry::radius::normalize_radius;
pub use crate::geometry::search::fit_prefix;

pub use crate::layout::object_fit::place_image;
pub use crate::layout::text::{ELLIPSIS, break_lines};

pub use crate::render::cpu::CpuSurface;
pub use crate::render::export::{
    DEFAULT_JPEG_QUALITY, ExportOptions, ExportRequest, ExportedImage, Exporter, FileExporter,
    FileType, encode_to_file,
};
pub use crate::render::poster::{
    DEFAULT_FONT_FAMILY, DEFAULT_LINE_HEIGHT_FACTOR, DEFAULT_TEXT_COLOR, Poster, TextSize,
};
pub use crate::render::recording::{DrawCommand, RecordingSurface};
pub use crate::render::report::{NodeKind, RenderReport, SkipReason, SkippedNode};
pub use crate::render::surface::{FontSpec, Surface, SurfaceScope};

pub use crate::scene::config::{CanvasSize, DEFAULT_FONT_SIZE, PosterConfig, PosterOptions};
pub use crate::scene::model::{
    ContainerNode, Coord, FontWeight, ImageNode, ObjectFit, Overflow, Radius, SceneNode,
    TextAlign, TextDecoration, TextNode,
};
pub use crate::scene::normalize::{NormalizedNode, Placed, normalize};
