//! Frame buffers, layout planning and YUV to RGBA conversion for the video
//! streams embedded in Flash content.
//!
//! Decoded frames arrive as planar YUV ([frame::PixelFormat::Yuv420p], or
//! [frame::PixelFormat::Yuva420p] for VP6 with alpha) and leave as packed
//! RGBA bitmaps. The libavcodec decoders and the swscale converter are
//! available behind the `ffmpeg` feature.

#[macro_use]
mod builder;

pub mod convert;
pub mod decoders;
pub mod error;
pub mod frame;
pub mod layout;

#[cfg(feature = "ffmpeg")]
pub mod options;
#[cfg(feature = "ffmpeg")]
pub mod scaling;

#[cfg(feature = "ffmpeg")]
pub use rsmpeg::ffi;

pub use convert::{convert, ColorRange, Converter, ConverterBuilder};
pub use decoders::{
    EncodedFrame, FrameDependency, StreamHandle, VideoCodec, VideoDecoder, VideoStreams,
    Yuv420pDecoder,
};
pub use error::{Error, Result};
pub use frame::{FrameBuffer, PixelFormat, Plane, PlaneView};
pub use layout::{plan_aligned_layout, plan_layout, FrameLayout, PlaneLayout};
