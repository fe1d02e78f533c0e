use std::ffi::CStr;

use cstr::cstr;
use log::debug;
use rsmpeg::{
    avcodec::{AVCodec, AVCodecContext},
    error::RsmpegError,
};

use crate::{
    builder::unwrap_mandatory,
    error::{Error, Result},
    frame::FrameBuffer,
    options::Options,
};

use super::{
    h263,
    utils::{avframe::read_avframe, packet::encoded_packet},
    vp6, EncodedFrame, FrameDependency, VideoCodec, VideoDecoder,
};

fn decoder_name(codec: VideoCodec) -> Result<&'static CStr> {
    match codec {
        VideoCodec::Vp6 => Ok(cstr!("vp6f")),
        VideoCodec::Vp6WithAlpha => Ok(cstr!("vp6a")),
        VideoCodec::H263 => Ok(cstr!("flv")),
        other => Err(Error::UnsupportedCodec(other)),
    }
}

pub struct DecoderBuilder {
    codec: Option<VideoCodec>,
    options: Option<Options>,
}

impl DecoderBuilder {
    pub fn new() -> Self {
        Self {
            codec: None,
            options: None,
        }
    }

    pub fn build(self) -> Result<FfmpegDecoder> {
        let codec = unwrap_mandatory(self.codec, "codec")?;
        let options = self.options.unwrap_or_default().to_av_dict()?;

        let name = decoder_name(codec)?;
        let decoder = AVCodec::find_decoder_by_name(name).ok_or(Error::UnsupportedCodec(codec))?;

        let mut decode_context = AVCodecContext::new(&decoder);
        decode_context.open(Some(options))?;

        debug!("Opened FFmpeg {:?} decoder for {:?}", name, codec);

        Ok(FfmpegDecoder {
            codec,
            decode_context,
        })
    }

    builder_set!(codec, VideoCodec);
    builder_set!(options, Options);
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes VP6 and Sorenson H.263 through libavcodec.
pub struct FfmpegDecoder {
    codec: VideoCodec,
    decode_context: AVCodecContext,
}

// SAFETY: the codec context is owned by this decoder alone and only touched
// through `&mut self`.
unsafe impl Send for FfmpegDecoder {}

impl FfmpegDecoder {
    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    pub fn codec(&self) -> VideoCodec {
        self.codec
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn preload_frame(&mut self, encoded_frame: EncodedFrame<'_>) -> Result<FrameDependency> {
        match self.codec {
            VideoCodec::Vp6 => Ok(vp6::frame_dependency(encoded_frame.data(), false)),
            VideoCodec::Vp6WithAlpha => Ok(vp6::frame_dependency(encoded_frame.data(), true)),
            VideoCodec::H263 => h263::frame_dependency(encoded_frame.data()),
            other => Err(Error::UnsupportedCodec(other)),
        }
    }

    fn decode_frame(&mut self, encoded_frame: EncodedFrame<'_>) -> Result<FrameBuffer> {
        let frame_id = encoded_frame.frame_id;
        let packet = encoded_packet(encoded_frame.data(), frame_id as i64)?;

        self.decode_context
            .send_packet(Some(&packet))
            .map_err(|error| Error::decode(format!("failed to send frame {frame_id}: {error}")))?;

        let avframe = match self.decode_context.receive_frame() {
            Ok(avframe) => avframe,
            Err(RsmpegError::DecoderDrainError) => {
                debug!("No frames to be pulled for frame {}", frame_id);
                return Err(Error::decode(format!("frame {frame_id} produced no picture")));
            }
            Err(error) => {
                return Err(Error::decode(format!("failed to decode frame {frame_id}: {error}")));
            }
        };

        let frame = read_avframe(&avframe)?;
        if !frame.pixel_format().is_planar() {
            return Err(Error::UnsupportedFormat(frame.pixel_format()));
        }

        Ok(frame)
    }
}
