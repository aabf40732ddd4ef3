/// Convenience result type used across posterkit.
pub type PosterResult<T> = Result<T, PosterError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Invalid user-provided configuration (for example a root without a size).
    #[error("validation error: {0}")]
    Validation(String),

    /// An image or font could not be loaded.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The requested capability is not available on this host.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Encoding or writing the rendered surface failed.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`PosterError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

/// Failure to load a single image or font resource.
///
/// Every awaiter of a cache entry observes the same failure, so the error is cheap to clone.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load '{key}': {message}")]
pub struct AssetError {
    /// Resource key (image `src` or font `fontSrc`).
    pub key: String,
    /// Human-readable cause.
    pub message: String,
}

impl AssetError {
    /// Build an [`AssetError`] for `key`.
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
