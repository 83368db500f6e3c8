pub(crate) mod naming;
pub(crate) mod writer;
