//! Input normalization: asset sources, image/SVG decoding, audio decoding and colors.

pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod media;
pub(crate) mod source;
pub(crate) mod svg;
