use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Deserialize;

use crate::foundation::core::RasterFrame;
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::task::spawn_blocking;

/// Default JPEG quality, matching what browsers use for `toDataURL("image/jpeg")`.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

/// Encoded output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// Lossy JPEG; alpha is dropped.
    #[serde(alias = "jpeg")]
    Jpg,
}

impl FileType {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

/// Export request as supplied by callers. Unset fields default to the whole surface.
///
/// All values are device pixels of the rendered surface.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Left edge of the exported region.
    pub x: u32,
    /// Top edge of the exported region.
    pub y: u32,
    /// Region width; defaults to the remaining surface width.
    pub width: Option<u32>,
    /// Region height; defaults to the remaining surface height.
    pub height: Option<u32>,
    /// Output width; defaults to the region width.
    pub dest_width: Option<u32>,
    /// Output height; defaults to the region height.
    pub dest_height: Option<u32>,
    /// Output format.
    pub file_type: FileType,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: Option<f32>,
    /// Output file. Exporters pick a name when unset.
    pub path: Option<PathBuf>,
}

/// [`ExportOptions`] resolved against a concrete surface size.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRequest {
    /// Region origin.
    pub x: u32,
    /// Region origin.
    pub y: u32,
    /// Region width.
    pub width: u32,
    /// Region height.
    pub height: u32,
    /// Output width.
    pub dest_width: u32,
    /// Output height.
    pub dest_height: u32,
    /// Output format.
    pub file_type: FileType,
    /// JPEG quality in `0.0..=1.0`.
    pub quality: f32,
    /// Output file, if chosen by the caller.
    pub path: Option<PathBuf>,
}

impl ExportOptions {
    /// Fill defaults and check the region against a `surface_w` x `surface_h` surface.
    pub fn resolve(&self, surface_w: u32, surface_h: u32) -> PosterResult<ExportRequest> {
        if self.x >= surface_w || self.y >= surface_h {
            return Err(PosterError::validation(format!(
                "export origin ({}, {}) lies outside the {surface_w}x{surface_h} surface",
                self.x, self.y
            )));
        }
        let width = self.width.unwrap_or(surface_w - self.x);
        let height = self.height.unwrap_or(surface_h - self.y);
        if width == 0 || height == 0 {
            return Err(PosterError::validation("export region must not be empty"));
        }
        if self.x.saturating_add(width) > surface_w || self.y.saturating_add(height) > surface_h {
            return Err(PosterError::validation(format!(
                "export region {width}x{height}+{}+{} exceeds the {surface_w}x{surface_h} surface",
                self.x, self.y
            )));
        }

        let dest_width = self.dest_width.unwrap_or(width);
        let dest_height = self.dest_height.unwrap_or(height);
        if dest_width == 0 || dest_height == 0 {
            return Err(PosterError::validation("export destination size must be > 0"));
        }

        let quality = self.quality.unwrap_or(DEFAULT_JPEG_QUALITY);
        if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
            return Err(PosterError::validation("export quality must be within 0..=1"));
        }

        Ok(ExportRequest {
            x: self.x,
            y: self.y,
            width,
            height,
            dest_width,
            dest_height,
            file_type: self.file_type,
            quality,
            path: self.path.clone(),
        })
    }
}

/// An encoded image written by an [`Exporter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// Where the image was written.
    pub path: PathBuf,
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
}

/// Host capability that turns surface pixels into an image file.
pub trait Exporter {
    /// Encode `request`'s region of `frame`.
    fn export(
        &self,
        frame: RasterFrame,
        request: ExportRequest,
    ) -> LocalBoxFuture<'static, PosterResult<ExportedImage>>;
}

static NEXT_EXPORT: AtomicU64 = AtomicU64::new(0);

/// Writes PNG/JPEG files with the `image` crate.
#[derive(Clone, Debug)]
pub struct FileExporter {
    out_dir: PathBuf,
}

impl FileExporter {
    /// Exporter resolving relative paths and generated names against `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Exporter writing into `<system temp>/posterkit`.
    pub fn temp() -> Self {
        Self::new(std::env::temp_dir().join("posterkit"))
    }

    /// Directory for relative and generated paths.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn target(&self, request: &ExportRequest) -> PathBuf {
        match &request.path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.out_dir.join(p),
            None => self.out_dir.join(format!(
                "poster-{}-{}.{}",
                std::process::id(),
                NEXT_EXPORT.fetch_add(1, Ordering::Relaxed),
                request.file_type.extension()
            )),
        }
    }
}

impl Exporter for FileExporter {
    fn export(
        &self,
        frame: RasterFrame,
        request: ExportRequest,
    ) -> LocalBoxFuture<'static, PosterResult<ExportedImage>> {
        let path = self.target(&request);
        let work = spawn_blocking("posterkit-export", move || {
            encode_to_file(&frame, &request, &path)?;
            Ok(ExportedImage {
                path,
                width: request.dest_width,
                height: request.dest_height,
            })
        });
        async move { work.await.map_err(|e| PosterError::export(format!("{e:#}"))) }.boxed_local()
    }
}

/// Crop, scale and encode `frame` into `path`.
pub fn encode_to_file(frame: &RasterFrame, request: &ExportRequest, path: &Path) -> anyhow::Result<()> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .context("frame byte length does not match its dimensions")?;

    let region = image::imageops::crop_imm(&img, request.x, request.y, request.width, request.height)
        .to_image();
    let out = if (request.dest_width, request.dest_height) == (request.width, request.height) {
        region
    } else {
        image::imageops::resize(
            &region,
            request.dest_width,
            request.dest_height,
            image::imageops::FilterType::Triangle,
        )
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    match request.file_type {
        FileType::Png => out
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?,
        FileType::Jpg => {
            let rgb = image::DynamicImage::ImageRgba8(out).to_rgb8();
            let file = File::create(path)
                .with_context(|| format!("create jpeg '{}'", path.display()))?;
            let quality = (request.quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(BufWriter::new(file), quality);
            encoder
                .encode_image(&rgb)
                .with_context(|| format!("write jpeg '{}'", path.display()))?;
        }
    }

    tracing::debug!(path = %path.display(), "exported image");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
