//! Codec backends

pub(crate) mod pkware;
pub(crate) mod zlib;
