//! The boundary between compressed video and [FrameBuffer]s.
//!
//! Decoders implement [VideoDecoder] and hand back frames in whatever planar
//! format they produce natively. [VideoStreams] keeps one decoder per stream
//! and turns their output into RGBA.

use crate::{
    error::{Error, Result},
    frame::FrameBuffer,
};

pub mod h263;
mod raw;
mod stream;
pub mod vp6;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;
#[cfg(feature = "ffmpeg")]
pub(crate) mod utils;

pub use raw::*;
pub use stream::*;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::*;

/// Video codecs a SWF `DefineVideoStream` tag can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    H263,
    ScreenVideo,
    Vp6,
    Vp6WithAlpha,
    ScreenVideoV2,
    H264,
}

impl VideoCodec {
    /// Maps a SWF codec id (2 through 7) to its codec.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            2 => Ok(Self::H263),
            3 => Ok(Self::ScreenVideo),
            4 => Ok(Self::Vp6),
            5 => Ok(Self::Vp6WithAlpha),
            6 => Ok(Self::ScreenVideoV2),
            7 => Ok(Self::H264),
            other => Err(Error::decode(format!("unknown video codec id {other}"))),
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::H263 => 2,
            Self::ScreenVideo => 3,
            Self::Vp6 => 4,
            Self::Vp6WithAlpha => 5,
            Self::ScreenVideoV2 => 6,
            Self::H264 => 7,
        }
    }
}

/// One compressed frame, borrowed from wherever the stream's bytes live.
#[derive(Clone, Copy, Debug)]
pub struct EncodedFrame<'a> {
    pub codec: VideoCodec,
    pub data: &'a [u8],
    pub frame_id: u32,
}

impl<'a> EncodedFrame<'a> {
    pub fn new(codec: VideoCodec, data: &'a [u8], frame_id: u32) -> Self {
        Self {
            codec,
            data,
            frame_id,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// What a frame needs decoded before it can be decoded itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameDependency {
    /// A keyframe.
    None,

    /// The frame is coded against the previously decoded frame.
    Past,
}

impl FrameDependency {
    pub fn is_keyframe(self) -> bool {
        self == Self::None
    }
}

pub trait VideoDecoder: Send {
    /// Inspects a frame without decoding it, reporting which frames it
    /// depends on.
    fn preload_frame(&mut self, encoded_frame: EncodedFrame<'_>) -> Result<FrameDependency>;

    /// Decodes a frame into the decoder's native planar format.
    fn decode_frame(&mut self, encoded_frame: EncodedFrame<'_>) -> Result<FrameBuffer>;
}
