use log::{debug, trace, warn};

use crate::{
    convert::Converter,
    error::{Error, Result},
    frame::{check_dimensions, FrameBuffer},
};

use super::{EncodedFrame, FrameDependency, VideoCodec, VideoDecoder};

/// Identifies a stream registered with [VideoStreams]. Handles of
/// unregistered streams are never handed out again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    index: u32,
    generation: u32,
}

struct VideoStream {
    size: (u16, u16),
    decoder: Box<dyn VideoDecoder>,
    last_frame: Option<FrameBuffer>,
}

struct Slot {
    generation: u32,
    stream: Option<VideoStream>,
}

/// Registry of video streams, each with its own decoder and the last frame
/// it produced.
pub struct VideoStreams {
    converter: Converter,
    slots: Vec<Slot>,
}

impl Default for VideoStreams {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoStreams {
    pub fn new() -> Self {
        Self::with_converter(Converter::default())
    }

    /// Uses `converter` to turn decoded frames into RGBA.
    pub fn with_converter(converter: Converter) -> Self {
        Self {
            converter,
            slots: Vec::new(),
        }
    }

    /// Registers a stream decoded by the decoder built into this crate for
    /// `codec`.
    #[allow(unreachable_code, unused_variables)]
    pub fn register_stream(&mut self, size: (u16, u16), codec: VideoCodec) -> Result<StreamHandle> {
        let decoder: Box<dyn VideoDecoder> = match codec {
            #[cfg(feature = "ffmpeg")]
            VideoCodec::H263 | VideoCodec::Vp6 | VideoCodec::Vp6WithAlpha => {
                Box::new(super::DecoderBuilder::new().codec(codec).build()?)
            }
            other => return Err(Error::UnsupportedCodec(other)),
        };

        self.register_decoder(size, decoder)
    }

    /// Registers a stream decoded by `decoder`.
    pub fn register_decoder(
        &mut self,
        size: (u16, u16),
        decoder: Box<dyn VideoDecoder>,
    ) -> Result<StreamHandle> {
        check_dimensions(size.0 as u32, size.1 as u32)?;

        let stream = VideoStream {
            size,
            decoder,
            last_frame: None,
        };

        let handle = match self.slots.iter().position(|slot| slot.stream.is_none()) {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.stream = Some(stream);

                StreamHandle {
                    index: index as u32,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    stream: Some(stream),
                });

                StreamHandle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        debug!("Registered {}x{} video stream {:?}", size.0, size.1, handle);
        Ok(handle)
    }

    pub fn unregister_stream(&mut self, handle: StreamHandle) -> Result<()> {
        self.slot_mut(handle)?.stream = None;
        debug!("Unregistered video stream {:?}", handle);
        Ok(())
    }

    pub fn preload_frame(
        &mut self,
        handle: StreamHandle,
        encoded_frame: EncodedFrame<'_>,
    ) -> Result<FrameDependency> {
        self.stream_mut(handle)?.decoder.preload_frame(encoded_frame)
    }

    /// Decodes `encoded_frame` and stores it, as RGBA, as the stream's last
    /// frame.
    ///
    /// Decoders may produce frames larger than the stream (padded out to
    /// whole macroblocks); those are cropped to the stream bounds.
    pub fn decode_frame(
        &mut self,
        handle: StreamHandle,
        encoded_frame: EncodedFrame<'_>,
    ) -> Result<&FrameBuffer> {
        let converter = self.converter;
        let stream = self.stream_mut(handle)?;

        let decoded = stream.decoder.decode_frame(encoded_frame)?;
        let (width, height) = (decoded.width(), decoded.height());
        let (bounds_width, bounds_height) = (stream.size.0 as u32, stream.size.1 as u32);

        trace!(
            "Decoded frame {} of stream {:?}: {}x{} {:?}",
            encoded_frame.frame_id,
            handle,
            width,
            height,
            decoded.pixel_format()
        );

        if width < bounds_width || height < bounds_height {
            warn!(
                "Frame {} is {}x{}, smaller than its {}x{} stream",
                encoded_frame.frame_id, width, height, bounds_width, bounds_height
            );
        }

        let decoded = if width > bounds_width || height > bounds_height {
            decoded.crop(width.min(bounds_width), height.min(bounds_height))?
        } else {
            decoded
        };

        let rgba = converter.to_rgba(&decoded)?;
        Ok(stream.last_frame.insert(rgba))
    }

    /// The last frame [Self::decode_frame] produced for the stream, if any.
    pub fn last_frame(&self, handle: StreamHandle) -> Result<Option<&FrameBuffer>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.stream.as_ref())
            .map(|stream| stream.last_frame.as_ref())
            .ok_or(Error::StreamNotRegistered(handle))
    }

    fn slot_mut(&mut self, handle: StreamHandle) -> Result<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.stream.is_some())
            .ok_or(Error::StreamNotRegistered(handle))
    }

    fn stream_mut(&mut self, handle: StreamHandle) -> Result<&mut VideoStream> {
        self.slot_mut(handle)?
            .stream
            .as_mut()
            .ok_or(Error::StreamNotRegistered(handle))
    }
}
