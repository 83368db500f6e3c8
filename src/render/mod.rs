pub(crate) mod reveal;
pub(crate) mod surface;
pub(crate) mod timeline;
