use std::os::raw::c_int;

use log::trace;
use rsmpeg::avutil::AVFrame;

use crate::{
    error::{Error, Result},
    ffi,
    frame::{check_dimensions, FrameBuffer, PixelFormat, Plane},
};

pub(crate) fn av_pixel_format(format: PixelFormat) -> ffi::AVPixelFormat {
    match format {
        PixelFormat::Yuv420p => ffi::AVPixelFormat_AV_PIX_FMT_YUV420P,
        PixelFormat::Yuva420p => ffi::AVPixelFormat_AV_PIX_FMT_YUVA420P,
        PixelFormat::Rgb => ffi::AVPixelFormat_AV_PIX_FMT_RGB24,
        PixelFormat::Rgba => ffi::AVPixelFormat_AV_PIX_FMT_RGBA,
    }
}

pub(crate) fn pixel_format(av_format: ffi::AVPixelFormat) -> Option<PixelFormat> {
    match av_format {
        ffi::AVPixelFormat_AV_PIX_FMT_YUV420P => Some(PixelFormat::Yuv420p),
        ffi::AVPixelFormat_AV_PIX_FMT_YUVA420P => Some(PixelFormat::Yuva420p),
        ffi::AVPixelFormat_AV_PIX_FMT_RGB24 => Some(PixelFormat::Rgb),
        ffi::AVPixelFormat_AV_PIX_FMT_RGBA => Some(PixelFormat::Rgba),
        _ => None,
    }
}

fn to_c_int(width: u32, height: u32) -> Result<(c_int, c_int)> {
    match (c_int::try_from(width), c_int::try_from(height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(Error::InvalidDimensions { width, height }),
    }
}

/// Allocates an AVFrame with buffers for `format` at `width`x`height`.
pub(crate) fn new_avframe(format: PixelFormat, width: u32, height: u32) -> Result<AVFrame> {
    check_dimensions(width, height)?;
    let (av_width, av_height) = to_c_int(width, height)?;

    let mut avframe = AVFrame::new();
    avframe.set_format(av_pixel_format(format));
    avframe.set_width(av_width);
    avframe.set_height(av_height);
    avframe.alloc_buffer()?;

    Ok(avframe)
}

/// Copies a frame into a newly allocated AVFrame of the same format, row by
/// row, since FFmpeg picks its own line sizes.
pub(crate) fn write_frame_to_avframe(frame: &FrameBuffer) -> Result<AVFrame> {
    let mut avframe = new_avframe(frame.pixel_format(), frame.width(), frame.height())?;

    for (index, plane) in frame.planes().enumerate() {
        let linesize = avframe.linesize[index] as usize;
        let rows = plane.height() as usize;

        // SAFETY: `alloc_buffer` gave every plane `linesize` bytes for each
        // of its rows, and `avframe` is not otherwise borrowed.
        let data = unsafe { std::slice::from_raw_parts_mut(avframe.data[index], linesize * rows) };

        for (source_row, target_row) in plane.rows().zip(data.chunks_mut(linesize)) {
            target_row[..source_row.len()].copy_from_slice(source_row);
        }
    }

    Ok(avframe)
}

/// Copies the planes of an AVFrame into an owned [FrameBuffer], keeping the
/// AVFrame's line sizes as strides.
pub(crate) fn read_avframe(avframe: &AVFrame) -> Result<FrameBuffer> {
    let format = pixel_format(avframe.format)
        .ok_or_else(|| Error::decode(format!("unsupported FFmpeg pixel format {}", avframe.format)))?;

    let (width, height) = match (u32::try_from(avframe.width), u32::try_from(avframe.height)) {
        (Ok(width), Ok(height)) => (width, height),
        _ => {
            return Err(Error::decode(format!(
                "invalid FFmpeg frame size {}x{}",
                avframe.width, avframe.height
            )))
        }
    };
    check_dimensions(width, height)?;

    trace!(
        "Reading {}x{} {:?} AVFrame (linesizes {:?})",
        width,
        height,
        format,
        &avframe.linesize[..format.plane_count()]
    );

    let planes = (0..format.plane_count())
        .map(|index| {
            let linesize = avframe.linesize[index];
            let pointer = avframe.data[index];

            let stride = u32::try_from(linesize)
                .ok()
                .filter(|_| !pointer.is_null())
                .ok_or_else(|| {
                    Error::decode(format!("plane {index} has no data (linesize {linesize})"))
                })?;

            let (_, rows) = format.plane_dimensions(index, width, height);
            let len = stride as usize * rows as usize;

            // SAFETY: FFmpeg backs each plane of a frame it hands out with at
            // least `linesize` bytes per row of that plane.
            let data = unsafe { std::slice::from_raw_parts(pointer, len) };
            Ok(Plane::new(data.to_vec(), stride))
        })
        .collect::<Result<Vec<_>>>()?;

    FrameBuffer::from_planes(width, height, format, planes)
}
