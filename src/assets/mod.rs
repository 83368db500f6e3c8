pub(crate) mod bundle;
pub(crate) mod decode;
pub(crate) mod trim;
pub(crate) mod trim_cache;
