//! Buffer sizes, strides and plane offsets for a pixel format at given
//! dimensions, and allocation of zeroed frames that follow them.

use log::trace;

use crate::{
    error::{Error, Result},
    frame::{check_dimensions, FrameBuffer, PixelFormat, Plane},
};

/// Where one plane lives if the frame were stored as a single buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Width in samples.
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows.
    pub stride: u32,
    pub offset: usize,
    pub len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    width: u32,
    height: u32,
    format: PixelFormat,
    planes: Vec<PlaneLayout>,
    total_size: usize,
}

impl FrameLayout {
    /// Tight layout: every stride is exactly `width * bytes_per_sample`.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Self::aligned(width, height, format, 1)
    }

    /// Like [Self::new], but every stride is rounded up to a multiple of
    /// `align` bytes. `align` has to be a non-zero power of two.
    pub fn aligned(width: u32, height: u32, format: PixelFormat, align: u32) -> Result<Self> {
        if !align.is_power_of_two() {
            return Err(Error::InvalidAlignment(align));
        }
        check_dimensions(width, height)?;

        let align = align as u128;
        let mut planes = Vec::with_capacity(format.plane_count());
        let mut offset: u128 = 0;

        for index in 0..format.plane_count() {
            let (plane_width, plane_height) = format.plane_dimensions(index, width, height);
            let row_bytes = plane_width as u128 * format.bytes_per_sample(index) as u128;
            let stride = row_bytes.div_ceil(align) * align;
            let len = stride * plane_height as u128;

            planes.push(PlaneLayout {
                width: plane_width,
                height: plane_height,
                stride: u32::try_from(stride).map_err(|_| Error::AllocationFailure { bytes: len })?,
                offset: to_usize(offset)?,
                len: to_usize(len)?,
            });

            offset += len;
        }

        Ok(Self {
            width,
            height,
            format,
            planes,
            total_size: to_usize(offset)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    pub fn planes(&self) -> &[PlaneLayout] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> Option<&PlaneLayout> {
        self.planes.get(index)
    }

    /// Sum of all plane lengths.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Allocates a zero-filled frame following this layout. Every plane gets
    /// its own allocation.
    pub fn allocate(&self) -> Result<FrameBuffer> {
        trace!(
            "Allocating {}x{} {:?} frame ({} bytes)",
            self.width,
            self.height,
            self.format,
            self.total_size
        );

        let planes = self
            .planes
            .iter()
            .enumerate()
            .map(|(index, layout)| {
                let mut data = Vec::new();
                data.try_reserve_exact(layout.len)
                    .map_err(|_| Error::AllocationFailure {
                        bytes: layout.len as u128,
                    })?;
                data.resize(layout.len, 0);

                Ok(Plane::with_layout(
                    data,
                    layout.stride,
                    layout.width,
                    layout.height,
                    self.format.bytes_per_sample(index),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FrameBuffer::from_planned_parts(
            self.width,
            self.height,
            self.format,
            planes,
        ))
    }
}

/// Allocates a zeroed frame sized exactly for `format` at `width`x`height`,
/// with tight strides.
pub fn plan_layout(width: u32, height: u32, format: PixelFormat) -> Result<FrameBuffer> {
    FrameLayout::new(width, height, format)?.allocate()
}

/// Allocates a zeroed frame whose strides are padded to multiples of `align`.
pub fn plan_aligned_layout(
    width: u32,
    height: u32,
    format: PixelFormat,
    align: u32,
) -> Result<FrameBuffer> {
    FrameLayout::aligned(width, height, format, align)?.allocate()
}

fn to_usize(bytes: u128) -> Result<usize> {
    usize::try_from(bytes).map_err(|_| Error::AllocationFailure { bytes })
}
