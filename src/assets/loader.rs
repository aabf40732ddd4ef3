use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::assets::decode::{DecodedImage, FontData, decode_image};
use crate::foundation::error::{AssetError, PosterError, PosterResult};
use crate::foundation::task::{build_thread_pool, spawn_pooled};

/// Future produced by a loader. Loaders start their work when called, not when polled.
pub type LoadFuture<T> = LocalBoxFuture<'static, Result<T, AssetError>>;

/// Platform image-decode primitive.
pub trait ImageLoader {
    /// Fetch and decode the image identified by `src`.
    fn load_image(&self, src: &str) -> LoadFuture<DecodedImage>;
}

/// Platform font-fetch primitive.
///
/// The returned bytes are registered with the drawing surface under `family` once the load
/// completes.
pub trait FontLoader {
    /// Fetch the font file identified by `src` for use as `family`.
    fn load_font(&self, family: &str, src: &str) -> LoadFuture<FontData>;
}

/// Loads images and fonts from a directory, decoding on a rayon pool.
///
/// Sources are relative paths under the assets root. With the `http` feature enabled,
/// `http://` and `https://` sources are fetched over the network instead, through one client
/// shared by every load.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    sources: Arc<Sources>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

#[derive(Debug)]
struct Sources {
    root: PathBuf,
    #[cfg(feature = "http")]
    client: std::sync::OnceLock<reqwest::blocking::Client>,
}

impl FsAssetLoader {
    /// Create a loader resolving sources relative to `root`, running loads on rayon's global
    /// pool.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            sources: Arc::new(Sources {
                root: root.into(),
                #[cfg(feature = "http")]
                client: std::sync::OnceLock::new(),
            }),
            pool: None,
        }
    }

    /// Like [`FsAssetLoader::new`], but with a dedicated pool of `threads` workers.
    pub fn with_threads(root: impl Into<PathBuf>, threads: usize) -> PosterResult<Self> {
        let pool = build_thread_pool(Some(threads)).map_err(|e| {
            PosterError::validation(format!("asset loader pool: {e:#}"))
        })?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
            ..Self::new(root)
        })
    }

    /// Return the directory sources are resolved against.
    pub fn root(&self) -> &Path {
        &self.sources.root
    }

    /// Worker threads of the dedicated pool, if one was configured.
    pub fn threads(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.current_num_threads())
    }

    fn spawn<T, F>(&self, src: &str, decode: F) -> LoadFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(Vec<u8>) -> anyhow::Result<T> + Send + 'static,
    {
        let sources = Arc::clone(&self.sources);
        let key = src.to_owned();
        let src = src.to_owned();
        tracing::debug!(src = %key, "issuing asset load");
        spawn_pooled(self.pool.as_deref(), move || decode(sources.read(&src)?))
            .map(move |res| res.map_err(|e| AssetError::new(key, format!("{e:#}"))))
            .boxed_local()
    }
}

impl ImageLoader for FsAssetLoader {
    fn load_image(&self, src: &str) -> LoadFuture<DecodedImage> {
        self.spawn(src, |bytes| decode_image(&bytes).map_err(anyhow::Error::from))
    }
}

impl FontLoader for FsAssetLoader {
    fn load_font(&self, family: &str, src: &str) -> LoadFuture<FontData> {
        let family = family.to_owned();
        self.spawn(src, move |bytes| {
            if bytes.is_empty() {
                anyhow::bail!("font file is empty");
            }
            Ok(FontData {
                family,
                bytes: Arc::new(bytes),
            })
        })
    }
}

impl Sources {
    fn read(&self, src: &str) -> anyhow::Result<Vec<u8>> {
        if src.starts_with("http://") || src.starts_with("https://") {
            return self.fetch_remote(src);
        }
        let norm = normalize_rel_path(src)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path).with_context(|| format!("read asset bytes from '{}'", path.display()))
    }

    #[cfg(feature = "http")]
    fn client(&self) -> anyhow::Result<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("construct http client")?;
        // Another load may have set it first.
        Ok(self.client.get_or_init(|| client))
    }

    #[cfg(feature = "http")]
    fn fetch_remote(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        fetch_with(self.client()?, url)
    }

    #[cfg(not(feature = "http"))]
    fn fetch_remote(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        Err(anyhow::Error::new(PosterError::unsupported(format!(
            "remote source '{url}' requires the `http` feature"
        ))))
    }
}

#[cfg(feature = "http")]
fn fetch_with(client: &reqwest::blocking::Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request '{url}'"))?
        .error_for_status()
        .with_context(|| format!("fetch '{url}'"))?;
    Ok(resp.bytes().context("read response body")?.to_vec())
}

/// Normalize and validate assets-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PosterResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PosterError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PosterError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PosterError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PosterError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
