use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::assets::decode::{DecodedImage, FontData};
use crate::assets::loader::{FontLoader, ImageLoader};
use crate::foundation::error::AssetError;

/// Outcome of a completed load, shared by every requester of the same key.
pub type LoadOutcome<T> = Result<Arc<T>, AssetError>;

/// Awaitable handle to a cache entry. Cloning is cheap and all clones resolve together.
pub type AssetHandle<T> = Shared<LocalBoxFuture<'static, LoadOutcome<T>>>;

/// Kind of resource held by an [`AssetCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Decoded raster image (`src` of an image node).
    Image,
    /// Font file (`fontSrc` of a text node).
    Font,
}

/// Memoized loads for one resource kind.
///
/// The first request for a key invokes the loader; every later request returns the pending or
/// settled entry from the first one. The check and the insert happen under one borrow, so a
/// key never gets a second loader call.
pub struct AssetSlots<T> {
    entries: RefCell<HashMap<String, AssetHandle<T>>>,
    loads: Cell<u64>,
}

impl<T> Default for AssetSlots<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            loads: Cell::new(0),
        }
    }
}

impl<T: 'static> AssetSlots<T> {
    /// Return the entry for `key`, invoking `load` only if no entry exists yet.
    pub fn request<F, Fut>(&self, key: &str, load: F) -> AssetHandle<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AssetError>> + 'static,
    {
        let mut entries = self.entries.borrow_mut();
        match entries.entry(key.to_owned()) {
            Entry::Occupied(e) => {
                tracing::trace!(key, "asset cache hit");
                e.get().clone()
            }
            Entry::Vacant(e) => {
                self.loads.set(self.loads.get() + 1);
                let pending = load();
                let handle = async move { pending.await.map(Arc::new) }
                    .boxed_local()
                    .shared();
                e.insert(handle).clone()
            }
        }
    }

    /// Return the existing entry for `key`, if one was requested.
    pub fn get(&self, key: &str) -> Option<AssetHandle<T>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Wait until the entry for `key` settles.
    ///
    /// Keys that were never requested resolve to an error.
    pub async fn await_ready(&self, key: &str) -> LoadOutcome<T> {
        match self.get(key) {
            Some(handle) => handle.await,
            None => Err(AssetError::new(key, "asset was never requested")),
        }
    }

    /// Whether an entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Number of entries, pending or settled.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no entries exist.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of loader invocations since creation.
    pub fn load_count(&self) -> u64 {
        self.loads.get()
    }

    /// Drop every entry so that later requests load again.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Per-instance cache of image and font loads.
///
/// Entries are never evicted; failed loads stay failed until [`AssetCache::clear`].
#[derive(Default)]
pub struct AssetCache {
    images: AssetSlots<DecodedImage>,
    fonts: AssetSlots<FontData>,
}

impl AssetCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Image entries keyed by `src`.
    pub fn images(&self) -> &AssetSlots<DecodedImage> {
        &self.images
    }

    /// Font entries keyed by `fontSrc`.
    pub fn fonts(&self) -> &AssetSlots<FontData> {
        &self.fonts
    }

    /// Request the image `src` through `loader`.
    pub fn request_image(&self, src: &str, loader: &dyn ImageLoader) -> AssetHandle<DecodedImage> {
        self.images.request(src, || loader.load_image(src))
    }

    /// Request the font `src` through `loader`, registering it as `family`.
    pub fn request_font(
        &self,
        family: &str,
        src: &str,
        loader: &dyn FontLoader,
    ) -> AssetHandle<FontData> {
        self.fonts.request(src, || loader.load_font(family, src))
    }

    /// Whether an entry of `kind` exists for `key`.
    pub fn contains(&self, kind: AssetKind, key: &str) -> bool {
        match kind {
            AssetKind::Image => self.images.contains(key),
            AssetKind::Font => self.fonts.contains(key),
        }
    }

    /// Drop all image and font entries.
    pub fn clear(&self) {
        self.images.clear();
        self.fonts.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
