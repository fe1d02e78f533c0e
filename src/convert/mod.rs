//! Colorspace conversion from the decoders' planar formats to packed RGB(A).
//!
//! Every conversion allocates its destination through the layout planner, so
//! the returned frame never shares storage with its source.

use log::trace;

use crate::{
    error::{Error, Result},
    frame::{check_dimensions, FrameBuffer, PixelFormat, PlaneView},
    layout::plan_aligned_layout,
};

pub mod yuv2rgba;

use yuv2rgba::raster;

/// Which YUV value range the source uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorRange {
    /// Studio swing: luma in 16..=235, chroma in 16..=240.
    #[default]
    Limited,
    /// Full swing: every channel in 0..=255.
    Full,
}

pub struct ConverterBuilder {
    color_range: Option<ColorRange>,
    stride_alignment: Option<u32>,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self {
            color_range: None,
            stride_alignment: None,
        }
    }

    pub fn build(self) -> Result<Converter> {
        let stride_alignment = self.stride_alignment.unwrap_or(1);
        if !stride_alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment(stride_alignment));
        }

        Ok(Converter {
            color_range: self.color_range.unwrap_or_default(),
            stride_alignment,
        })
    }

    builder_set!(color_range, ColorRange);
    builder_set!(stride_alignment, u32);
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts frames to packed RGB(A). The default converter reads limited
/// range BT.601 and writes tightly packed rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converter {
    color_range: ColorRange,
    stride_alignment: u32,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            color_range: ColorRange::Limited,
            stride_alignment: 1,
        }
    }
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn color_range(&self) -> ColorRange {
        self.color_range
    }

    pub fn stride_alignment(&self) -> u32 {
        self.stride_alignment
    }

    /// Converts a [PixelFormat::Yuv420p] frame into a new
    /// [PixelFormat::Rgba] frame of the same dimensions.
    pub fn convert(&self, src: &FrameBuffer) -> Result<FrameBuffer> {
        if src.pixel_format() != PixelFormat::Yuv420p {
            return Err(Error::UnsupportedFormat(src.pixel_format()));
        }

        let [y, u, v] = planes::<3>(src)?;
        self.fill_packed(src, PixelFormat::Rgba, |packed, stride| {
            raster::yuv420_to_rgba(y, u, v, self.color_range, packed, stride)
        })
    }

    /// Converts a frame of any format into a new [PixelFormat::Rgba] frame.
    pub fn to_rgba(&self, src: &FrameBuffer) -> Result<FrameBuffer> {
        match src.pixel_format() {
            PixelFormat::Yuv420p => self.convert(src),
            PixelFormat::Yuva420p => {
                let [y, u, v, a] = planes::<4>(src)?;
                self.fill_packed(src, PixelFormat::Rgba, |packed, stride| {
                    raster::yuva420_to_rgba(y, u, v, a, self.color_range, packed, stride)
                })
            }
            PixelFormat::Rgb => {
                let [rgb] = planes::<1>(src)?;
                self.fill_packed(src, PixelFormat::Rgba, |packed, stride| {
                    raster::rgb_to_rgba(rgb, packed, stride)
                })
            }
            PixelFormat::Rgba => {
                let [rgba] = planes::<1>(src)?;
                self.fill_packed(src, PixelFormat::Rgba, |packed, stride| {
                    copy_rows(rgba, packed, stride)
                })
            }
        }
    }

    /// Converts a frame into a new [PixelFormat::Rgb] frame. Formats carrying
    /// premultiplied alpha are refused, since dropping the alpha channel would
    /// leave colors darkened.
    pub fn to_rgb(&self, src: &FrameBuffer) -> Result<FrameBuffer> {
        match src.pixel_format() {
            PixelFormat::Yuv420p => {
                let [y, u, v] = planes::<3>(src)?;
                self.fill_packed(src, PixelFormat::Rgb, |packed, stride| {
                    raster::yuv420_to_rgb(y, u, v, self.color_range, packed, stride)
                })
            }
            PixelFormat::Rgb => {
                let [rgb] = planes::<1>(src)?;
                self.fill_packed(src, PixelFormat::Rgb, |packed, stride| {
                    copy_rows(rgb, packed, stride)
                })
            }
            format @ (PixelFormat::Rgba | PixelFormat::Yuva420p) => {
                Err(Error::UnsupportedFormat(format))
            }
        }
    }

    fn fill_packed<F>(&self, src: &FrameBuffer, format: PixelFormat, fill: F) -> Result<FrameBuffer>
    where
        F: FnOnce(&mut [u8], usize),
    {
        check_dimensions(src.width(), src.height())?;

        trace!(
            "Converting {}x{} {:?} frame to {:?}",
            src.width(),
            src.height(),
            src.pixel_format(),
            format
        );

        let mut output = plan_aligned_layout(src.width(), src.height(), format, self.stride_alignment)?;
        if let Some(plane) = output.plane_mut(0) {
            let stride = plane.stride() as usize;
            fill(plane.data_mut(), stride);
        }

        Ok(output)
    }
}

/// Converts a [PixelFormat::Yuv420p] frame to [PixelFormat::Rgba] with the
/// default [Converter].
pub fn convert(src: &FrameBuffer) -> Result<FrameBuffer> {
    Converter::default().convert(src)
}

pub fn to_rgba(src: &FrameBuffer) -> Result<FrameBuffer> {
    Converter::default().to_rgba(src)
}

pub fn to_rgb(src: &FrameBuffer) -> Result<FrameBuffer> {
    Converter::default().to_rgb(src)
}

fn planes<const N: usize>(src: &FrameBuffer) -> Result<[PlaneView<'_>; N]> {
    let planes: Vec<_> = src.planes().collect();
    let actual = planes.len();

    planes.try_into().map_err(|_| Error::PlaneCountMismatch {
        format: src.pixel_format(),
        expected: N,
        actual,
    })
}

fn copy_rows(source: PlaneView<'_>, target: &mut [u8], target_stride: usize) {
    if target_stride == 0 {
        return;
    }

    for (source_row, target_row) in source.rows().zip(target.chunks_mut(target_stride)) {
        target_row[..source_row.len()].copy_from_slice(source_row);
    }
}
