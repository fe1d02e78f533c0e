//! The [FrameBuffer] type, the [Plane]s it owns and the borrowed
//! [PlaneView]s it hands out.
//!
//! A [FrameBuffer] can only be obtained fully formed: from the layout
//! planner, from a decoder, from a conversion, or through one of the
//! validating constructors below. Its planes are never shared with any other
//! frame.

use std::fmt::{self, Debug, Formatter};

use crate::{
    error::{Error, Result},
    layout::{plan_layout, FrameLayout},
};

mod format;

pub use format::*;

/// One plane of pixel data: `height` rows of `width` samples each, with
/// consecutive rows `stride` bytes apart.
#[derive(Clone, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    stride: u32,
    width: u32,
    height: u32,
    bytes_per_sample: u32,
}

impl Plane {
    /// Raw plane data with its stride, to be handed to
    /// [FrameBuffer::from_planes]. A plane has no dimensions of its own: they
    /// are derived from the frame's format when the frame is built, and read
    /// back through [FrameBuffer::plane].
    pub fn new(data: Vec<u8>, stride: u32) -> Self {
        Self {
            data,
            stride,
            width: 0,
            height: 0,
            bytes_per_sample: 0,
        }
    }

    pub(crate) fn with_layout(
        data: Vec<u8>,
        stride: u32,
        width: u32,
        height: u32,
        bytes_per_sample: u32,
    ) -> Self {
        Self {
            data,
            stride,
            width,
            height,
            bytes_per_sample,
        }
    }

    pub(crate) fn view(&self) -> PlaneView<'_> {
        PlaneView {
            // CONTRACT: `data.len() >= stride * height`, checked on construction.
            data: &self.data[..self.stride as usize * self.height as usize],
            stride: self.stride,
            width: self.width,
            height: self.height,
            bytes_per_sample: self.bytes_per_sample,
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub(crate) fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_sample as usize
    }

    /// Mutable rows of the plane, each trimmed to its visible samples.
    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        let row_bytes = self.row_bytes();
        let used = self.stride as usize * self.height as usize;
        self.data[..used]
            .chunks_mut(self.stride as usize)
            .map(move |row| &mut row[..row_bytes])
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Debug for Plane {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plane")
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .field("stride", &self.stride)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A borrowed, bounds-checked window onto one [Plane] of a [FrameBuffer].
///
/// This is the safe stand-in for handing out a `(pointer, linesize)` pair:
/// the slice can't outlive the frame and never reaches past the last row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneView<'a> {
    data: &'a [u8],
    stride: u32,
    width: u32,
    height: u32,
    bytes_per_sample: u32,
}

impl<'a> PlaneView<'a> {
    /// All bytes of the plane, row padding included. Exactly
    /// `stride * height` bytes long.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_sample(&self) -> u32 {
        self.bytes_per_sample
    }

    /// Number of meaningful bytes in each row (`width * bytes_per_sample`).
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_sample as usize
    }

    /// Row `y` without its padding, or [None] past the last row.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }

        let start = y as usize * self.stride as usize;
        self.data.get(start..start + self.row_bytes())
    }

    /// Iterates over every row without its padding.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let row_bytes = self.row_bytes();
        self.data
            .chunks(self.stride as usize)
            .map(move |row| &row[..row_bytes])
    }
}

/// An owned video frame: dimensions, [PixelFormat] and one [Plane] per
/// channel group of that format.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    planes: Vec<Plane>,
}

impl FrameBuffer {
    /// Builds a frame out of planes produced elsewhere (usually a decoder),
    /// checking each plane against the dimensions `format` requires of it.
    pub fn from_planes(
        width: u32,
        height: u32,
        format: PixelFormat,
        planes: Vec<Plane>,
    ) -> Result<Self> {
        check_dimensions(width, height)?;

        if planes.len() != format.plane_count() {
            return Err(Error::PlaneCountMismatch {
                format,
                expected: format.plane_count(),
                actual: planes.len(),
            });
        }

        let planes = planes
            .into_iter()
            .enumerate()
            .map(|(index, plane)| {
                let (plane_width, plane_height) = format.plane_dimensions(index, width, height);
                let bytes_per_sample = format.bytes_per_sample(index);

                let row_bytes = plane_width as u64 * bytes_per_sample as u64;
                let required = plane.stride as u64 * plane_height as u64;

                if (plane.stride as u64) < row_bytes || (plane.data.len() as u64) < required {
                    return Err(Error::InvalidPlane {
                        index,
                        stride: plane.stride,
                        len: plane.data.len(),
                    });
                }

                Ok(Plane::with_layout(
                    plane.data,
                    plane.stride,
                    plane_width,
                    plane_height,
                    bytes_per_sample,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            width,
            height,
            format,
            planes,
        })
    }

    /// Splits one tightly packed buffer (planes stored back to back, no row
    /// padding) into a frame. The buffer must be exactly
    /// [PixelFormat::length_for_size] bytes long.
    pub fn from_packed_data(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut data: Vec<u8>,
    ) -> Result<Self> {
        // Sizes that overflow fail here with AllocationFailure.
        let layout = FrameLayout::new(width, height, format)?;

        let expected = layout.total_size();
        if data.len() != expected {
            return Err(Error::InvalidDataLength {
                format,
                expected,
                actual: data.len(),
            });
        }

        let mut planes = Vec::with_capacity(format.plane_count());
        for plane in layout.planes() {
            let plane_data = if format.plane_count() == 1 {
                std::mem::take(&mut data)
            } else {
                data[plane.offset..plane.offset + plane.len].to_vec()
            };

            planes.push(Plane::new(plane_data, plane.stride));
        }

        Self::from_planes(width, height, format, planes)
    }

    /// Assembles a frame from planes the layout planner already sized.
    pub(crate) fn from_planned_parts(
        width: u32,
        height: u32,
        format: PixelFormat,
        planes: Vec<Plane>,
    ) -> Self {
        debug_assert_eq!(planes.len(), format.plane_count());
        Self {
            width,
            height,
            format,
            planes,
        }
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

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn plane(&self, index: usize) -> Option<PlaneView<'_>> {
        self.planes.get(index).map(Plane::view)
    }

    pub fn planes(&self) -> impl Iterator<Item = PlaneView<'_>> {
        self.planes.iter().map(Plane::view)
    }

    /// The bytes of plane `index`, padding included.
    pub fn data(&self, index: usize) -> Option<&[u8]> {
        self.plane(index).map(|plane| plane.data())
    }

    /// The stride of plane `index` in bytes.
    pub fn linesize(&self, index: usize) -> Option<u32> {
        self.planes.get(index).map(Plane::stride)
    }

    pub(crate) fn plane_mut(&mut self, index: usize) -> Option<&mut Plane> {
        self.planes.get_mut(index)
    }

    /// Consumes the frame, returning its pixels tightly packed: planes back
    /// to back, rows without padding.
    pub fn into_packed_data(mut self) -> Vec<u8> {
        let packed_len: usize = self
            .planes
            .iter()
            .map(|plane| plane.row_bytes() * plane.height as usize)
            .sum();

        let tight_single_plane = matches!(
            self.planes.as_slice(),
            [plane] if plane.stride as usize == plane.row_bytes()
        );
        if tight_single_plane {
            let mut data = self.planes.swap_remove(0).into_data();
            data.truncate(packed_len);
            return data;
        }

        let mut packed = Vec::with_capacity(packed_len);
        for plane in self.planes() {
            for row in plane.rows() {
                packed.extend_from_slice(row);
            }
        }
        packed
    }

    /// Copies the top-left `width`x`height` region into a new frame of the
    /// same format. Used to drop the macroblock padding decoders leave on the
    /// right and bottom edges.
    pub fn crop(&self, width: u32, height: u32) -> Result<Self> {
        if width > self.width || height > self.height {
            return Err(Error::InvalidDimensions { width, height });
        }

        let mut cropped = plan_layout(width, height, self.format)?;
        for (source, target) in self.planes.iter().zip(cropped.planes.iter_mut()) {
            let row_bytes = target.row_bytes();
            for (source_row, target_row) in source.view().rows().zip(target.rows_mut()) {
                target_row.copy_from_slice(&source_row[..row_bytes]);
            }
        }

        Ok(cropped)
    }
}

impl Debug for FrameBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("planes", &self.planes)
            .finish()
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        Err(Error::InvalidDimensions { width, height })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameBuffer, PixelFormat, Plane};
    use crate::error::Error;

    fn strided_plane(value: u8, size: usize, stride: usize, rows: usize) -> Vec<u8> {
        let mut data = vec![0; stride * rows];
        for row in data.chunks_mut(stride) {
            row[..size].fill(value);
        }
        data
    }

    fn strided_yuv(width: usize, height: usize, y_stride: usize, uv_stride: usize) -> FrameBuffer {
        let chroma_width = width.div_ceil(2);
        let chroma_height = height.div_ceil(2);

        FrameBuffer::from_planes(
            width as u32,
            height as u32,
            PixelFormat::Yuv420p,
            vec![
                Plane::new(strided_plane(1, width, y_stride, height), y_stride as u32),
                Plane::new(
                    strided_plane(2, chroma_width, uv_stride, chroma_height),
                    uv_stride as u32,
                ),
                Plane::new(
                    strided_plane(3, chroma_width, uv_stride, chroma_height),
                    uv_stride as u32,
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn accessors_report_planes() {
        let frame = strided_yuv(5, 3, 8, 4);

        assert_eq!(frame.width(), 5);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.pixel_format(), PixelFormat::Yuv420p);
        assert_eq!(frame.plane_count(), 3);
        assert_eq!(frame.linesize(0), Some(8));
        assert_eq!(frame.linesize(1), Some(4));
        assert_eq!(frame.linesize(3), None);
        assert_eq!(frame.data(0).map(<[u8]>::len), Some(24));
        assert!(frame.plane(3).is_none());

        let chroma = frame.plane(1).unwrap();
        assert_eq!((chroma.width(), chroma.height()), (3, 2));
        assert_eq!(chroma.row(1), Some(&[2, 2, 2][..]));
        assert_eq!(chroma.row(2), None);
    }

    #[test]
    fn plane_dimensions_come_from_the_format() {
        let frame = FrameBuffer::from_planes(
            5,
            3,
            PixelFormat::Yuva420p,
            vec![
                Plane::new(vec![0; 15], 5),
                Plane::new(vec![0; 6], 3),
                Plane::new(vec![0; 6], 3),
                Plane::new(vec![0; 15], 5),
            ],
        )
        .unwrap();

        let dimensions: Vec<_> = frame
            .planes()
            .map(|plane| (plane.width(), plane.height(), plane.bytes_per_sample()))
            .collect();
        assert_eq!(dimensions, vec![(5, 3, 1), (3, 2, 1), (3, 2, 1), (5, 3, 1)]);
    }

    #[test]
    fn rows_skip_padding() {
        let frame = strided_yuv(3, 2, 7, 4);
        let rows: Vec<&[u8]> = frame.plane(0).unwrap().rows().collect();
        assert_eq!(rows, vec![&[1, 1, 1][..], &[1, 1, 1][..]]);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let result = FrameBuffer::from_packed_data(0, 4, PixelFormat::Rgba, vec![]);
        assert!(matches!(
            result,
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn short_planes_are_rejected() {
        let result = FrameBuffer::from_planes(
            4,
            4,
            PixelFormat::Yuv420p,
            vec![
                Plane::new(vec![0; 16], 4),
                Plane::new(vec![0; 3], 2),
                Plane::new(vec![0; 4], 2),
            ],
        );
        assert!(matches!(result, Err(Error::InvalidPlane { index: 1, .. })));

        let result = FrameBuffer::from_planes(4, 1, PixelFormat::Rgba, vec![Plane::new(vec![0; 16], 8)]);
        assert!(matches!(result, Err(Error::InvalidPlane { index: 0, .. })));
    }

    #[test]
    fn wrong_plane_count_is_rejected() {
        let result = FrameBuffer::from_planes(2, 2, PixelFormat::Yuv420p, vec![Plane::new(vec![0; 4], 2)]);
        assert!(matches!(
            result,
            Err(Error::PlaneCountMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn packed_data_must_match_format_length() {
        let result = FrameBuffer::from_packed_data(2, 2, PixelFormat::Yuv420p, vec![0; 5]);
        assert!(matches!(
            result,
            Err(Error::InvalidDataLength {
                expected: 6,
                actual: 5,
                ..
            })
        ));
    }

    #[test]
    fn oversized_packed_frames_fail_to_allocate() {
        for format in [PixelFormat::Rgba, PixelFormat::Yuv420p] {
            let result = FrameBuffer::from_packed_data(u32::MAX, u32::MAX, format, vec![]);
            assert!(matches!(result, Err(Error::AllocationFailure { .. })));
        }
    }

    #[test]
    fn packed_data_splits_into_planes() {
        let data: Vec<u8> = (0..6).collect();
        let frame = FrameBuffer::from_packed_data(2, 2, PixelFormat::Yuv420p, data.clone()).unwrap();

        assert_eq!(frame.data(0), Some(&[0, 1, 2, 3][..]));
        assert_eq!(frame.data(1), Some(&[4][..]));
        assert_eq!(frame.data(2), Some(&[5][..]));
        assert_eq!(frame.into_packed_data(), data);
    }

    #[test]
    fn packing_drops_row_padding() {
        let frame = strided_yuv(3, 3, 8, 8);
        let packed = frame.into_packed_data();

        assert_eq!(Some(packed.len()), PixelFormat::Yuv420p.length_for_size(3, 3));
        assert_eq!(&packed[..9], &[1; 9]);
        assert_eq!(&packed[9..13], &[2; 4]);
        assert_eq!(&packed[13..], &[3; 4]);
    }

    #[test]
    fn crop_keeps_top_left_region() {
        let data: Vec<u8> = (0..4 * 3 * 4).map(|i| i as u8).collect();
        let frame = FrameBuffer::from_packed_data(4, 3, PixelFormat::Rgba, data).unwrap();

        let cropped = frame.crop(2, 2).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
        assert_eq!(
            cropped.into_packed_data(),
            vec![0, 1, 2, 3, 4, 5, 6, 7, 16, 17, 18, 19, 20, 21, 22, 23]
        );
    }

    #[test]
    fn crop_handles_strided_chroma() {
        let frame = strided_yuv(6, 5, 8, 4);
        let cropped = frame.crop(3, 3).unwrap();

        assert_eq!(cropped.plane(1).unwrap().width(), 2);
        assert_eq!(cropped.plane(1).unwrap().height(), 2);
        assert_eq!(
            cropped.into_packed_data(),
            [vec![1; 9], vec![2; 4], vec![3; 4]].concat()
        );
    }

    #[test]
    fn crop_cannot_grow() {
        let frame = strided_yuv(4, 4, 4, 2);
        assert!(matches!(
            frame.crop(5, 4),
            Err(Error::InvalidDimensions { width: 5, height: 4 })
        ));
    }
}
