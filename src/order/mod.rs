pub(crate) mod shuffle;
