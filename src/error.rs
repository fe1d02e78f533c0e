use thiserror::Error;

use crate::{
    decoders::{StreamHandle, VideoCodec},
    frame::PixelFormat,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while planning, converting or decoding a
/// frame. No operation in this crate hands back a partially built buffer
/// alongside one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(PixelFormat),

    #[error("failed to allocate a frame buffer of {bytes} bytes")]
    AllocationFailure { bytes: u128 },

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("unsupported video codec {0:?}")]
    UnsupportedCodec(VideoCodec),

    #[error("video stream {0:?} is not registered")]
    StreamNotRegistered(StreamHandle),

    #[error("expected {expected} bytes of {format:?} data, got {actual}")]
    InvalidDataLength {
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },

    #[error("{format:?} frames have {expected} planes, got {actual}")]
    PlaneCountMismatch {
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },

    #[error("plane {index} does not fit its layout (stride {stride}, {len} bytes)")]
    InvalidPlane { index: usize, stride: u32, len: usize },

    #[error("stride alignment {0} is not a power of two")]
    InvalidAlignment(u32),

    #[error("missing mandatory field '{0}'")]
    MissingField(&'static str),

    #[cfg(feature = "ffmpeg")]
    #[error("codec option '{0}' contains a NUL byte")]
    InvalidOption(String),

    #[cfg(feature = "ffmpeg")]
    #[error(transparent)]
    Ffmpeg(#[from] rsmpeg::error::RsmpegError),
}

impl Error {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError(message.into())
    }
}
