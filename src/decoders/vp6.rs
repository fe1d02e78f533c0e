//! VP6 frame header probing.

use super::FrameDependency;

/// Size of the big-endian alpha plane offset that prefixes every
/// `Vp6WithAlpha` frame.
const ALPHA_OFFSET_LEN: usize = 3;

/// Reads the inter-frame flag, the top bit of the first header byte. A clear
/// bit marks a keyframe.
///
/// Frames too short to carry a header are treated as depending on the past,
/// so they are never chosen as a seek target.
pub fn frame_dependency(data: &[u8], with_alpha: bool) -> FrameDependency {
    let header_start = if with_alpha { ALPHA_OFFSET_LEN } else { 0 };

    match data.get(header_start) {
        Some(byte) if byte & 0x80 == 0 => FrameDependency::None,
        _ => FrameDependency::Past,
    }
}

#[cfg(test)]
mod tests {
    use super::frame_dependency;
    use crate::decoders::FrameDependency;

    #[test]
    fn keyframe_flag_is_the_top_bit() {
        assert_eq!(frame_dependency(&[0x00, 0xff], false), FrameDependency::None);
        assert_eq!(frame_dependency(&[0x7f], false), FrameDependency::None);
        assert_eq!(frame_dependency(&[0x80, 0x00], false), FrameDependency::Past);
        assert_eq!(frame_dependency(&[0xc6], false), FrameDependency::Past);
    }

    #[test]
    fn alpha_frames_skip_the_offset() {
        assert_eq!(
            frame_dependency(&[0x80, 0x80, 0x80, 0x00], true),
            FrameDependency::None
        );
        assert_eq!(
            frame_dependency(&[0x00, 0x00, 0x10, 0x80], true),
            FrameDependency::Past
        );
    }

    #[test]
    fn truncated_frames_depend_on_the_past() {
        assert_eq!(frame_dependency(&[], false), FrameDependency::Past);
        assert_eq!(frame_dependency(&[0x00, 0x00, 0x00], true), FrameDependency::Past);
    }
}
