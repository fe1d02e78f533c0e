use log::trace;

use crate::{
    error::{Error, Result},
    frame::{FrameBuffer, PixelFormat},
};

use super::{EncodedFrame, FrameDependency, VideoDecoder};

/// Decoder for streams of uncompressed, tightly packed YUV420P pictures.
/// Every frame stands on its own.
#[derive(Clone, Copy, Debug)]
pub struct Yuv420pDecoder {
    width: u32,
    height: u32,
}

impl Yuv420pDecoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn frame_size(&self) -> Result<usize> {
        PixelFormat::Yuv420p
            .length_for_size(self.width as usize, self.height as usize)
            .ok_or_else(|| {
                Error::decode(format!(
                    "{}x{} raw YUV420P frames are too large",
                    self.width, self.height
                ))
            })
    }
}

impl VideoDecoder for Yuv420pDecoder {
    fn preload_frame(&mut self, _encoded_frame: EncodedFrame<'_>) -> Result<FrameDependency> {
        Ok(FrameDependency::None)
    }

    fn decode_frame(&mut self, encoded_frame: EncodedFrame<'_>) -> Result<FrameBuffer> {
        let data = encoded_frame.data();
        trace!(
            "Decoding raw frame {} ({} bytes)",
            encoded_frame.frame_id,
            data.len()
        );

        let frame_size = self.frame_size()?;
        if data.len() != frame_size {
            return Err(Error::decode(format!(
                "raw YUV420P frame {} is {} bytes, expected {}",
                encoded_frame.frame_id,
                data.len(),
                frame_size
            )));
        }

        FrameBuffer::from_packed_data(self.width, self.height, PixelFormat::Yuv420p, data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::Yuv420pDecoder;
    use crate::{
        decoders::{EncodedFrame, FrameDependency, VideoCodec, VideoDecoder},
        error::Error,
        frame::PixelFormat,
    };

    #[test]
    fn every_frame_is_a_keyframe() {
        let mut decoder = Yuv420pDecoder::new(2, 2);
        let frame = EncodedFrame::new(VideoCodec::Vp6, &[0x80], 3);
        assert_eq!(decoder.preload_frame(frame).unwrap(), FrameDependency::None);
    }

    #[test]
    fn decodes_packed_planes() {
        let data: Vec<u8> = (0..6).collect();
        let mut decoder = Yuv420pDecoder::new(2, 2);

        let frame = decoder
            .decode_frame(EncodedFrame::new(VideoCodec::Vp6, &data, 0))
            .unwrap();

        assert_eq!(frame.pixel_format(), PixelFormat::Yuv420p);
        assert_eq!(frame.data(0), Some(&[0, 1, 2, 3][..]));
        assert_eq!(frame.data(2), Some(&[5][..]));
    }

    #[test]
    fn wrong_sized_frames_are_decode_errors() {
        let mut decoder = Yuv420pDecoder::new(4, 4);
        let result = decoder.decode_frame(EncodedFrame::new(VideoCodec::Vp6, &[0; 10], 1));
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn oversized_streams_are_decode_errors() {
        let mut decoder = Yuv420pDecoder::new(u32::MAX, u32::MAX);
        let result = decoder.decode_frame(EncodedFrame::new(VideoCodec::Vp6, &[0; 6], 0));
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }
}
