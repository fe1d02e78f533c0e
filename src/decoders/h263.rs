//! Sorenson Spark (FLV H.263) picture header probing.

use crate::error::{Error, Result};

use super::FrameDependency;

const PICTURE_START_CODE: u32 = 1;

/// Picture sizes selected by the fixed size codes 2 through 6.
const FIXED_SIZES: [(u16, u16); 5] = [(352, 288), (176, 144), (128, 96), (320, 240), (160, 120)];

/// The fields of a Sorenson picture header up to and including the picture
/// type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PictureHeader {
    pub version: u8,
    pub temporal_reference: u8,
    pub width: u16,
    pub height: u16,
    pub dependency: FrameDependency,
}

/// Parses the picture header at the start of `data`.
pub fn parse_picture_header(data: &[u8]) -> Result<PictureHeader> {
    let mut reader = BitReader::new(data);

    let start_code = reader.read_bits(17)?;
    if start_code != PICTURE_START_CODE {
        return Err(Error::decode(format!(
            "invalid H.263 picture start code {start_code:#x}"
        )));
    }

    let version = reader.read_bits(5)? as u8;
    if version > 1 {
        return Err(Error::decode(format!("unknown Sorenson H.263 version {version}")));
    }

    let temporal_reference = reader.read_bits(8)? as u8;

    let (width, height) = match reader.read_bits(3)? {
        0 => (reader.read_bits(8)? as u16, reader.read_bits(8)? as u16),
        1 => (reader.read_bits(16)? as u16, reader.read_bits(16)? as u16),
        code @ 2..=6 => FIXED_SIZES[code as usize - 2],
        code => {
            return Err(Error::decode(format!("reserved H.263 picture size code {code}")));
        }
    };

    let dependency = match reader.read_bits(2)? {
        0 => FrameDependency::None,
        // P-frames and disposable P-frames
        1 | 2 => FrameDependency::Past,
        other => {
            return Err(Error::decode(format!("invalid H.263 picture type {other}")));
        }
    };

    Ok(PictureHeader {
        version,
        temporal_reference,
        width,
        height,
        dependency,
    })
}

/// Reports which frames a Sorenson H.263 picture depends on.
pub fn frame_dependency(data: &[u8]) -> Result<FrameDependency> {
    parse_picture_header(data).map(|header| header.dependency)
}

/// MSB-first bit reader over a byte slice.
struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn read_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);

        let mut value = 0u32;
        for _ in 0..count {
            let byte = self
                .data
                .get(self.position / 8)
                .ok_or_else(|| Error::decode("truncated H.263 picture header"))?;
            let bit = (byte >> (7 - self.position % 8)) & 1;

            value = (value << 1) | bit as u32;
            self.position += 1;
        }

        Ok(value)
    }
}
