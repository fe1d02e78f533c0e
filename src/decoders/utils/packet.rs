use std::os::raw::c_int;

use log::trace;
use rsmpeg::avcodec::AVPacket;

use crate::{
    error::{Error, Result},
    ffi,
};

/// Copies one encoded frame into a new packet. The packet's buffer carries
/// the zeroed input padding FFmpeg's bitstream readers expect.
pub(crate) fn encoded_packet(data: &[u8], pts: i64) -> Result<AVPacket> {
    let size = c_int::try_from(data.len())
        .map_err(|_| Error::decode(format!("encoded frame of {} bytes is too large", data.len())))?;

    let mut packet = AVPacket::new();

    // SAFETY: `packet` is a freshly allocated, unreferenced packet.
    let ret = unsafe { ffi::av_new_packet(packet.as_mut_ptr(), size) };
    if ret < 0 {
        return Err(Error::AllocationFailure {
            bytes: data.len() as u128 + ffi::AV_INPUT_BUFFER_PADDING_SIZE as u128,
        });
    }

    if !data.is_empty() {
        // SAFETY: `av_new_packet` succeeded, so `packet.data` points to at
        // least `size` writable bytes.
        let payload = unsafe { std::slice::from_raw_parts_mut(packet.data, data.len()) };
        payload.copy_from_slice(data);
    }

    packet.set_pts(pts);
    trace!("Built packet (pts: {}, size: {})", pts, packet.size);

    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::encoded_packet;

    #[test]
    fn packet_holds_a_copy() {
        let data = [1, 2, 3, 4, 5];
        let packet = encoded_packet(&data, 9).unwrap();

        assert_eq!(packet.size, 5);
        assert_eq!(packet.pts, 9);
        let payload = unsafe { std::slice::from_raw_parts(packet.data, 5) };
        assert_eq!(payload, data);
    }
}
