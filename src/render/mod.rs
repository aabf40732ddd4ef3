//! Drawing surfaces, the scene renderer and export.

pub(crate) mod cpu;
pub(crate) mod export;
pub(crate) mod poster;
pub(crate) mod recording;
pub(crate) mod report;
pub(crate) mod surface;
