pub(crate) mod object_fit;
pub(crate) mod text;
