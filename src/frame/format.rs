/// The pixel format of a [FrameBuffer](super::FrameBuffer).
///
/// The format alone decides how many planes a frame has and how each of them
/// is subsampled relative to the frame's dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0: a full resolution luma plane followed by two chroma
    /// planes at half width and half height (rounded up).
    Yuv420p,

    /// Planar YUV 4:2:0 with a full resolution alpha plane after the chroma
    /// planes. Color is premultiplied with alpha.
    Yuva420p,

    /// Packed 24-bit RGB.
    Rgb,

    /// Packed 32-bit RGBA, in R, G, B, A byte order.
    Rgba,
}

impl PixelFormat {
    pub const fn plane_count(self) -> usize {
        match self {
            Self::Yuv420p => 3,
            Self::Yuva420p => 4,
            Self::Rgb | Self::Rgba => 1,
        }
    }

    pub const fn is_planar(self) -> bool {
        matches!(self, Self::Yuv420p | Self::Yuva420p)
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Yuva420p | Self::Rgba)
    }

    /// Bytes taken up by one sample of the given plane.
    pub const fn bytes_per_sample(self, plane: usize) -> u32 {
        debug_assert!(plane < self.plane_count());
        match self {
            Self::Yuv420p | Self::Yuva420p => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Horizontal and vertical subsampling of the given plane, as right shifts
    /// applied to the frame's width and height.
    pub const fn subsampling(self, plane: usize) -> (u32, u32) {
        match (self, plane) {
            (Self::Yuv420p | Self::Yuva420p, 1 | 2) => (1, 1),
            _ => (0, 0),
        }
    }

    /// Width and height (in samples) of the given plane for a frame of
    /// `width`x`height` pixels. Subsampled dimensions are rounded up so that an
    /// odd edge still gets a chroma sample.
    pub const fn plane_dimensions(self, plane: usize, width: u32, height: u32) -> (u32, u32) {
        let (shift_x, shift_y) = self.subsampling(plane);
        (
            width.div_ceil(1 << shift_x),
            height.div_ceil(1 << shift_y),
        )
    }

    /// Size in bytes of a tightly packed frame of this format, with every
    /// plane stored back to back and no row padding. [None] if the size does
    /// not fit in a `usize`.
    pub fn length_for_size(self, width: usize, height: usize) -> Option<usize> {
        let luma = width.checked_mul(height)?;
        let chroma = width
            .div_ceil(2)
            .checked_mul(height.div_ceil(2))?
            .checked_mul(2)?;

        match self {
            Self::Rgb => luma.checked_mul(3),
            Self::Rgba => luma.checked_mul(4),
            Self::Yuv420p => luma.checked_add(chroma),
            Self::Yuva420p => luma.checked_mul(2)?.checked_add(chroma),
        }
    }
}
