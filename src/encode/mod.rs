//! Encoding: the encoder contract, the ffmpeg WebM encoder and soundtrack staging.

pub(crate) mod audio;
pub(crate) mod ffmpeg;
pub(crate) mod sink;
