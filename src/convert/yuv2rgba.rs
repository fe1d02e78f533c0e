pub mod pixel {
    use crate::convert::ColorRange;

    fn clip(value: i32) -> u8 {
        value.clamp(0, 255) as u8
    }

    /// BT.601 YUV to RGB with 8-bit fixed point coefficients.
    pub fn yuv_to_rgb(y: u8, u: u8, v: u8, range: ColorRange) -> [u8; 3] {
        let d = u as i32 - 128;
        let e = v as i32 - 128;

        match range {
            ColorRange::Limited => {
                let c = 298 * (y as i32 - 16);
                [
                    clip((c + 409 * e + 128) >> 8),
                    clip((c - 100 * d - 208 * e + 128) >> 8),
                    clip((c + 516 * d + 128) >> 8),
                ]
            }
            ColorRange::Full => {
                let c = 256 * y as i32;
                [
                    clip((c + 359 * e + 128) >> 8),
                    clip((c - 88 * d - 183 * e + 128) >> 8),
                    clip((c + 454 * d + 128) >> 8),
                ]
            }
        }
    }
}

pub mod raster {
    use super::pixel;
    use crate::{convert::ColorRange, frame::PlaneView};

    /// Converts 4:2:0 planes into packed pixels of `CHANNELS` bytes each,
    /// handing every written pixel to `finish` along with its column and
    /// row.
    fn yuv420_to_packed<const CHANNELS: usize>(
        y_plane: PlaneView<'_>,
        u_plane: PlaneView<'_>,
        v_plane: PlaneView<'_>,
        range: ColorRange,
        packed: &mut [u8],
        packed_stride: usize,
        mut finish: impl FnMut(&mut [u8], usize, usize),
    ) {
        if packed_stride == 0 {
            return;
        }

        // Each chroma row covers two luma rows.
        let chroma_rows = u_plane
            .rows()
            .zip(v_plane.rows())
            .flat_map(|rows| [rows, rows]);

        let rows = y_plane
            .rows()
            .zip(chroma_rows)
            .zip(packed.chunks_mut(packed_stride));

        for (row, ((y_row, (u_row, v_row)), packed_row)) in rows.enumerate() {
            for (column, (pixel_bytes, &y)) in packed_row
                .chunks_exact_mut(CHANNELS)
                .zip(y_row)
                .enumerate()
            {
                let chroma_column = column / 2;
                let (Some(&u), Some(&v)) = (u_row.get(chroma_column), v_row.get(chroma_column))
                else {
                    break;
                };

                let [r, g, b] = pixel::yuv_to_rgb(y, u, v, range);
                pixel_bytes[0] = r;
                pixel_bytes[1] = g;
                pixel_bytes[2] = b;

                finish(pixel_bytes, column, row);
            }
        }
    }

    /// Planar YUV 4:2:0 to packed RGBA with an opaque alpha channel.
    pub fn yuv420_to_rgba(
        y_plane: PlaneView<'_>,
        u_plane: PlaneView<'_>,
        v_plane: PlaneView<'_>,
        range: ColorRange,
        rgba: &mut [u8],
        rgba_stride: usize,
    ) {
        yuv420_to_packed::<4>(
            y_plane,
            u_plane,
            v_plane,
            range,
            rgba,
            rgba_stride,
            |pixel_bytes, _, _| pixel_bytes[3] = 255,
        );
    }

    /// Planar YUV 4:2:0 to packed RGB.
    pub fn yuv420_to_rgb(
        y_plane: PlaneView<'_>,
        u_plane: PlaneView<'_>,
        v_plane: PlaneView<'_>,
        range: ColorRange,
        rgb: &mut [u8],
        rgb_stride: usize,
    ) {
        yuv420_to_packed::<3>(y_plane, u_plane, v_plane, range, rgb, rgb_stride, |_, _, _| {});
    }

    /// Planar YUVA 4:2:0 to packed RGBA. The source color is premultiplied,
    /// so every color channel is clamped to the pixel's alpha.
    pub fn yuva420_to_rgba(
        y_plane: PlaneView<'_>,
        u_plane: PlaneView<'_>,
        v_plane: PlaneView<'_>,
        a_plane: PlaneView<'_>,
        range: ColorRange,
        rgba: &mut [u8],
        rgba_stride: usize,
    ) {
        yuv420_to_packed::<4>(
            y_plane,
            u_plane,
            v_plane,
            range,
            rgba,
            rgba_stride,
            |pixel_bytes, column, row| {
                let alpha = a_plane
                    .row(row as u32)
                    .and_then(|alpha_row| alpha_row.get(column))
                    .copied()
                    .unwrap_or(255);

                for channel in &mut pixel_bytes[..3] {
                    *channel = (*channel).min(alpha);
                }
                pixel_bytes[3] = alpha;
            },
        );
    }

    /// Packed RGB to packed RGBA with an opaque alpha channel.
    pub fn rgb_to_rgba(rgb_plane: PlaneView<'_>, rgba: &mut [u8], rgba_stride: usize) {
        if rgba_stride == 0 {
            return;
        }

        for (rgb_row, rgba_row) in rgb_plane.rows().zip(rgba.chunks_mut(rgba_stride)) {
            for (rgb, rgba) in rgb_row.chunks_exact(3).zip(rgba_row.chunks_exact_mut(4)) {
                rgba[..3].copy_from_slice(rgb);
                rgba[3] = 255;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{pixel, raster};
    use crate::{
        convert::ColorRange,
        frame::{FrameBuffer, PixelFormat, Plane},
    };

    fn strided_row(value: u8, size: usize, stride: usize) -> Vec<u8> {
        let mut row = vec![0; stride];
        row[..size].fill(value);
        row
    }

    #[allow(clippy::too_many_arguments)]
    fn yuv_data_strided(
        y: u8,
        u: u8,
        v: u8,
        width: usize,
        height: usize,
        y_stride: usize,
        u_stride: usize,
        v_stride: usize,
    ) -> FrameBuffer {
        let chroma_width = (width + 1) / 2;
        let chroma_height = (height + 1) / 2;

        let y_data = strided_row(y, width, y_stride).repeat(height);
        let u_data = strided_row(u, chroma_width, u_stride).repeat(chroma_height);
        let v_data = strided_row(v, chroma_width, v_stride).repeat(chroma_height);

        FrameBuffer::from_planes(
            width as u32,
            height as u32,
            PixelFormat::Yuv420p,
            vec![
                Plane::new(y_data, y_stride as u32),
                Plane::new(u_data, u_stride as u32),
                Plane::new(v_data, v_stride as u32),
            ],
        )
        .unwrap()
    }

    fn rgba_data(r: u8, g: u8, b: u8, a: u8, width: usize, height: usize) -> Vec<u8> {
        [r, g, b, a].repeat(width * height)
    }

    fn convert_strided(frame: &FrameBuffer, range: ColorRange) -> Vec<u8> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let mut output = vec![0; width * height * 4];

        raster::yuv420_to_rgba(
            frame.plane(0).unwrap(),
            frame.plane(1).unwrap(),
            frame.plane(2).unwrap(),
            range,
            &mut output,
            width * 4,
        );

        output
    }

    #[test]
    fn limited_range_reference_colors() {
        let limited = ColorRange::Limited;
        assert_eq!(pixel::yuv_to_rgb(16, 128, 128, limited), [0, 0, 0]);
        assert_eq!(pixel::yuv_to_rgb(235, 128, 128, limited), [255, 255, 255]);
        assert_eq!(pixel::yuv_to_rgb(128, 128, 128, limited), [130, 130, 130]);
        assert_eq!(pixel::yuv_to_rgb(81, 90, 240, limited), [255, 0, 0]);
    }

    #[test]
    fn full_range_reference_colors() {
        let full = ColorRange::Full;
        assert_eq!(pixel::yuv_to_rgb(0, 128, 128, full), [0, 0, 0]);
        assert_eq!(pixel::yuv_to_rgb(255, 128, 128, full), [255, 255, 255]);
        assert_eq!(pixel::yuv_to_rgb(128, 128, 128, full), [128, 128, 128]);
        assert_eq!(pixel::yuv_to_rgb(100, 15, 10, full), [0, 223, 0]);
    }

    fn yuv_to_rgba_fixed_strided_test(
        width: usize,
        height: usize,
        y_stride: usize,
        u_stride: usize,
        v_stride: usize,
    ) {
        let frame = yuv_data_strided(100, 15, 10, width, height, y_stride, u_stride, v_stride);
        let output = convert_strided(&frame, ColorRange::Full);
        assert_eq!(output, rgba_data(0, 223, 0, 255, width, height));
    }

    #[test]
    fn yuv_to_rgba_4x3_strided_test() {
        yuv_to_rgba_fixed_strided_test(4, 3, 6, 3, 3);
    }

    #[test]
    fn yuv_to_rgba_4x4_strided_test() {
        yuv_to_rgba_fixed_strided_test(4, 4, 6, 3, 3);
    }

    #[test]
    fn yuv_to_rgba_12x7_strided_test() {
        yuv_to_rgba_fixed_strided_test(12, 7, 15, 16, 16);
    }

    #[test]
    fn yuv_to_rgba_128x72_strided_test() {
        yuv_to_rgba_fixed_strided_test(128, 72, 192, 96, 96);
    }

    #[test]
    fn yuv_to_rgba_1280x720_strided_1344_672_test() {
        yuv_to_rgba_fixed_strided_test(1280, 720, 1344, 672, 672);
    }

    #[test]
    fn chroma_is_sampled_per_2x2_block() {
        // 3x3 luma, 2x2 chroma: the right column and bottom row share the
        // edge chroma samples.
        let frame = FrameBuffer::from_planes(
            3,
            3,
            PixelFormat::Yuv420p,
            vec![
                Plane::new(vec![128; 9], 3),
                Plane::new(vec![128, 255, 128, 0], 2),
                Plane::new(vec![128; 4], 2),
            ],
        )
        .unwrap();

        let output = convert_strided(&frame, ColorRange::Full);
        let blue = |x: usize, y: usize| output[(y * 3 + x) * 4 + 2];

        assert_eq!(blue(0, 0), 128);
        assert_eq!(blue(1, 1), 128);
        assert_eq!(blue(2, 0), 255);
        assert_eq!(blue(2, 1), 255);
        assert_eq!(blue(2, 2), 0);
        assert_eq!(blue(0, 2), 128);
    }

    #[test]
    fn yuva_clamps_color_to_alpha() {
        let frame = FrameBuffer::from_planes(
            2,
            2,
            PixelFormat::Yuva420p,
            vec![
                Plane::new(vec![235; 4], 2),
                Plane::new(vec![128], 1),
                Plane::new(vec![128], 1),
                Plane::new(vec![255, 100, 0, 180], 2),
            ],
        )
        .unwrap();

        let mut output = vec![0; 16];
        raster::yuva420_to_rgba(
            frame.plane(0).unwrap(),
            frame.plane(1).unwrap(),
            frame.plane(2).unwrap(),
            frame.plane(3).unwrap(),
            ColorRange::Limited,
            &mut output,
            8,
        );

        assert_eq!(
            output,
            vec![255, 255, 255, 255, 100, 100, 100, 100, 0, 0, 0, 0, 180, 180, 180, 180]
        );
    }

    #[test]
    fn rgb_gains_opaque_alpha() {
        let frame = FrameBuffer::from_packed_data(2, 1, PixelFormat::Rgb, vec![1, 2, 3, 4, 5, 6])
            .unwrap();

        let mut output = vec![0; 8];
        raster::rgb_to_rgba(frame.plane(0).unwrap(), &mut output, 8);
        assert_eq!(output, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
