use log::trace;
use rsmpeg::swscale::SwsContext;

use crate::{
    builder::unwrap_mandatory,
    decoders::utils::avframe::{av_pixel_format, new_avframe, read_avframe, write_frame_to_avframe},
    error::{Error, Result},
    ffi,
    frame::{check_dimensions, FrameBuffer, PixelFormat},
};

pub struct ScalerBuilder {
    width: Option<u32>,
    height: Option<u32>,
    input_pixel_format: Option<PixelFormat>,
    output_pixel_format: Option<PixelFormat>,
    scaling_flags: Option<u32>,
}

impl ScalerBuilder {
    pub fn new() -> Self {
        Self {
            width: None,
            height: None,
            input_pixel_format: None,
            output_pixel_format: None,
            scaling_flags: None,
        }
    }

    pub fn build(self) -> Result<Scaler> {
        let width = unwrap_mandatory(self.width, "width")?;
        let height = unwrap_mandatory(self.height, "height")?;
        let input_pixel_format = unwrap_mandatory(self.input_pixel_format, "input_pixel_format")?;
        let output_pixel_format = unwrap_mandatory(self.output_pixel_format, "output_pixel_format")?;

        let scaling_flags = self.scaling_flags.unwrap_or(ffi::SWS_BILINEAR);

        check_dimensions(width, height)?;
        let (Ok(av_width), Ok(av_height)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(Error::InvalidDimensions { width, height });
        };

        let sws_context = SwsContext::get_context(
            av_width,
            av_height,
            av_pixel_format(input_pixel_format),
            av_width,
            av_height,
            av_pixel_format(output_pixel_format),
            scaling_flags,
        )
        .ok_or(Error::UnsupportedFormat(output_pixel_format))?;

        Ok(Scaler {
            sws_context,
            width,
            height,
            input_pixel_format,
            output_pixel_format,
        })
    }

    builder_set!(width, u32);
    builder_set!(height, u32);
    builder_set!(input_pixel_format, PixelFormat);
    builder_set!(output_pixel_format, PixelFormat);
    builder_set!(scaling_flags, u32);
}

impl Default for ScalerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel format conversion through swscale, for frames of one fixed size.
pub struct Scaler {
    sws_context: SwsContext,
    width: u32,
    height: u32,
    input_pixel_format: PixelFormat,
    output_pixel_format: PixelFormat,
}

impl Scaler {
    pub fn builder() -> ScalerBuilder {
        ScalerBuilder::new()
    }

    pub fn scale(&mut self, input_frame: &FrameBuffer) -> Result<FrameBuffer> {
        if input_frame.pixel_format() != self.input_pixel_format {
            return Err(Error::UnsupportedFormat(input_frame.pixel_format()));
        }
        if (input_frame.width(), input_frame.height()) != (self.width, self.height) {
            return Err(Error::InvalidDimensions {
                width: input_frame.width(),
                height: input_frame.height(),
            });
        }

        trace!(
            "Scaling {}x{} {:?} frame to {:?}",
            self.width,
            self.height,
            self.input_pixel_format,
            self.output_pixel_format
        );

        let input_avframe = write_frame_to_avframe(input_frame)?;
        let mut output_avframe = new_avframe(self.output_pixel_format, self.width, self.height)?;

        self.sws_context
            .scale_frame(&input_avframe, 0, input_avframe.height, &mut output_avframe)?;

        read_avframe(&output_avframe)
    }
}
