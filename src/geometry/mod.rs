//! Pure geometry helpers shared by the renderer and layout code.

pub(crate) mod align;
pub(crate) mod path;
pub(crate) mod radius;
pub(crate) mod search;
