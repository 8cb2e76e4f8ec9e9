//! The 32-byte video extended header (§3).

use crate::error::{Error, Result};
use crate::types::{Codec, ColorSpace, FrameRate};

/// Size in bytes of the video extended header on the wire.
pub const HEADER_LEN: usize = 32;

const MIN_WIDTH: i32 = 1;
const MAX_WIDTH: i32 = 7680;
const MIN_HEIGHT: i32 = 1;
const MAX_HEIGHT: i32 = 4320;

/// A parsed video extended header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoHeader {
    pub codec: Codec,
    pub width: i32,
    pub height: i32,
    pub frame_rate: FrameRate,
    pub aspect_ratio: f32,
    pub interlaced: bool,
    pub color_space: ColorSpace,
}

impl VideoHeader {
    /// Builds the header this core's video producer/encoder emits for a
    /// progressive-scan frame of the given codec and dimensions.
    pub fn progressive(codec: Codec, width: i32, height: i32, frame_rate: FrameRate) -> Self {
        VideoHeader {
            codec,
            width,
            height,
            frame_rate,
            aspect_ratio: width as f32 / height.max(1) as f32,
            interlaced: false,
            color_space: ColorSpace::BT709,
        }
    }

    /// Validates `1 ≤ width ≤ 7680, 1 ≤ height ≤ 4320` (§4.7).
    pub fn validate_dimensions(&self) -> Result<()> {
        if (MIN_WIDTH..=MAX_WIDTH).contains(&self.width)
            && (MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height)
        {
            Ok(())
        } else {
            Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Encodes this header to its 32-byte wire representation.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.codec.fourcc().to_le_bytes());
        buf[4..8].copy_from_slice(&self.width.to_le_bytes());
        buf[8..12].copy_from_slice(&self.height.to_le_bytes());
        buf[12..16].copy_from_slice(&self.frame_rate.numerator().to_le_bytes());
        buf[16..20].copy_from_slice(&self.frame_rate.denominator().to_le_bytes());
        buf[20..24].copy_from_slice(&self.aspect_ratio.to_le_bytes());
        buf[24..28].copy_from_slice(&(self.interlaced as i32).to_le_bytes());
        buf[28..32].copy_from_slice(&self.color_space.to_wire().to_le_bytes());
        buf
    }

    /// Parses a 32-byte video extended header. Returns `None` if `bytes` is
    /// shorter than [`HEADER_LEN`]; callers treat this as a framing violation.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let codec = Codec::from_fourcc(u32::from_le_bytes(bytes[0..4].try_into().unwrap()));
        let width = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let height = i32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let frame_rate_num = i32::from_le_bytes(bytes[12..16].try_into().unwrap());
        let frame_rate_den = i32::from_le_bytes(bytes[16..20].try_into().unwrap());
        // A peer carrying a non-positive numerator/denominator is a framing
        // anomaly, not grounds to reject the whole video frame; fall back to
        // 30 fps rather than propagating an invalid `FrameRate`.
        let frame_rate = FrameRate::new(frame_rate_num, frame_rate_den).unwrap_or_else(|_| FrameRate::fps_30());
        let aspect_ratio = f32::from_le_bytes(bytes[20..24].try_into().unwrap());
        let interlaced = i32::from_le_bytes(bytes[24..28].try_into().unwrap()) != 0;
        let color_space = ColorSpace::from_wire(i32::from_le_bytes(bytes[28..32].try_into().unwrap()));

        Some(VideoHeader {
            codec,
            width,
            height,
            frame_rate,
            aspect_ratio,
            interlaced,
            color_space,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips() {
        let header = VideoHeader::progressive(Codec::NV12, 1920, 1080, FrameRate::fps_30());
        let decoded = VideoHeader::decode(&header.encode()).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn decode_rejects_short_buffers() {
        assert!(VideoHeader::decode(&[0u8; 31]).is_none());
    }

    #[test]
    fn validate_dimensions_accepts_bounds() {
        let header = VideoHeader::progressive(Codec::NV12, 7680, 4320, FrameRate::fps_30());
        assert!(header.validate_dimensions().is_ok());
        let header = VideoHeader::progressive(Codec::NV12, 1, 1, FrameRate::fps_30());
        assert!(header.validate_dimensions().is_ok());
    }

    #[test]
    fn validate_dimensions_rejects_out_of_range() {
        let header = VideoHeader::progressive(Codec::NV12, 0, 1080, FrameRate::fps_30());
        assert!(header.validate_dimensions().is_err());
        let header = VideoHeader::progressive(Codec::NV12, 1920, 4321, FrameRate::fps_30());
        assert!(header.validate_dimensions().is_err());
    }

    #[test]
    fn unknown_codec_fourcc_is_preserved_through_decode() {
        let header = VideoHeader::progressive(Codec::Unknown(0x1122_3344), 640, 480, FrameRate::new(25, 1).unwrap());
        let decoded = VideoHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded.codec, Codec::Unknown(0x1122_3344));
    }
}
