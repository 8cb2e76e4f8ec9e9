//! The 24-byte audio extended header (§3) and its two on-wire layouts.
//!
//! Two distinct layouts exist:
//! - *Legacy / "camera" layout*: `codec, sample_rate, channels, bits_per_sample, samples_per_channel, reserved`.
//! - *vMix layout*: `codec, sample_rate, samples_per_channel, channels, active_channels_bitfield, reserved`.
//!
//! A receiver disambiguates on decode (§3): if the u32 at byte offset 8 lies
//! in `1..=8` it is `channels` (legacy layout); otherwise offset 8 is
//! `samples_per_channel` and offset 12 is `channels` (vMix layout). This
//! core always *emits* vMix layout (§4.6).

use crate::error::{Error, Result};
use crate::types::{ActiveChannels, Codec};

/// Size in bytes of the audio extended header on the wire.
pub const HEADER_LEN: usize = 24;

const MIN_SAMPLE_RATE: i32 = 4000;
const MAX_SAMPLE_RATE: i32 = 192_000;
const MIN_CHANNELS: i32 = 1;
const MAX_CHANNELS: i32 = 8;
const MIN_BITS_PER_SAMPLE: i32 = 8;
const MAX_BITS_PER_SAMPLE: i32 = 64;

/// A parsed, layout-normalized audio extended header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioHeader {
    pub codec: Codec,
    pub sample_rate: i32,
    pub channels: i32,
    pub samples_per_channel: i32,
    pub bits_per_sample: i32,
    pub active_channels: ActiveChannels,
}

impl AudioHeader {
    /// Builds the header this core's audio capture emitter sends: vMix
    /// layout, `FPA1`, stereo, with the active-channels bitfield set (§4.6).
    pub fn fpa1_stereo(sample_rate: i32, samples_per_channel: i32) -> Self {
        AudioHeader {
            codec: Codec::FPA1,
            sample_rate,
            channels: 2,
            samples_per_channel,
            bits_per_sample: 32,
            active_channels: ActiveChannels::stereo(),
        }
    }

    /// Validates the ranges required by §4.7:
    /// `4000 ≤ sample_rate ≤ 192000 ∧ 1 ≤ channels ≤ 8 ∧ 8 ≤ bits_per_sample ≤ 64 ∧ samples_per_channel > 0`.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(Error::InvalidAudioHeader {
                detail: format!("sample_rate {} out of range", self.sample_rate),
            });
        }
        if !(MIN_CHANNELS..=MAX_CHANNELS).contains(&self.channels) {
            return Err(Error::InvalidAudioHeader {
                detail: format!("channels {} out of range", self.channels),
            });
        }
        if !(MIN_BITS_PER_SAMPLE..=MAX_BITS_PER_SAMPLE).contains(&self.bits_per_sample) {
            return Err(Error::InvalidAudioHeader {
                detail: format!("bits_per_sample {} out of range", self.bits_per_sample),
            });
        }
        if self.samples_per_channel <= 0 {
            return Err(Error::InvalidAudioHeader {
                detail: format!("samples_per_channel {} is not positive", self.samples_per_channel),
            });
        }
        Ok(())
    }

    /// Encodes this header in vMix layout, the only layout this core writes.
    pub fn encode_vmix(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.codec.fourcc().to_le_bytes());
        buf[4..8].copy_from_slice(&self.sample_rate.to_le_bytes());
        buf[8..12].copy_from_slice(&self.samples_per_channel.to_le_bytes());
        buf[12..16].copy_from_slice(&self.channels.to_le_bytes());
        buf[16..20].copy_from_slice(&self.active_channels.bits().to_le_bytes());
        buf[20..24].copy_from_slice(&0u32.to_le_bytes());
        buf
    }

    /// Parses a 24-byte audio extended header, applying the legacy/vMix
    /// disambiguation heuristic. Returns `None` if `bytes` is shorter than
    /// [`HEADER_LEN`].
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let codec = Codec::from_fourcc(u32::from_le_bytes(bytes[0..4].try_into().unwrap()));
        let sample_rate = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let field_at_8 = i32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let field_at_12 = i32::from_le_bytes(bytes[12..16].try_into().unwrap());
        let field_at_16 = u32::from_le_bytes(bytes[16..20].try_into().unwrap());

        let header = if (1..=8).contains(&field_at_8) {
            // Legacy layout: channels, bits_per_sample, samples_per_channel.
            AudioHeader {
                codec,
                sample_rate,
                channels: field_at_8,
                bits_per_sample: field_at_12,
                samples_per_channel: field_at_16 as i32,
                active_channels: ActiveChannels::from_bits_truncate(channel_mask(field_at_8 as u32)),
            }
        } else {
            // vMix layout: samples_per_channel, channels, active_channels_bitfield.
            let bits_per_sample = if codec == Codec::FPA1 { 32 } else { 16 };
            AudioHeader {
                codec,
                sample_rate,
                channels: field_at_12,
                bits_per_sample,
                samples_per_channel: field_at_8,
                active_channels: ActiveChannels::from_bits_truncate(field_at_16),
            }
        };

        Some(header)
    }
}

fn channel_mask(channels: u32) -> u32 {
    if channels >= 32 {
        u32::MAX
    } else {
        (1u32 << channels) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_vmix_layout() {
        let header = AudioHeader::fpa1_stereo(48_000, 960);
        let decoded = AudioHeader::decode(&header.encode_vmix()).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn disambiguates_legacy_layout_from_channels_at_offset_8() {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&Codec::FPA1.fourcc().to_le_bytes());
        buf[4..8].copy_from_slice(&48_000i32.to_le_bytes());
        buf[8..12].copy_from_slice(&2i32.to_le_bytes()); // channels
        buf[12..16].copy_from_slice(&32i32.to_le_bytes()); // bits_per_sample
        buf[16..20].copy_from_slice(&960i32.to_le_bytes()); // samples_per_channel

        let header = AudioHeader::decode(&buf).unwrap();
        assert_eq!(header.channels, 2);
        assert_eq!(header.samples_per_channel, 960);
        assert_eq!(header.bits_per_sample, 32);
    }

    #[test]
    fn disambiguates_vmix_layout_from_samples_per_channel_at_offset_8() {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&Codec::FPA1.fourcc().to_le_bytes());
        buf[4..8].copy_from_slice(&48_000i32.to_le_bytes());
        buf[8..12].copy_from_slice(&960i32.to_le_bytes()); // samples_per_channel
        buf[12..16].copy_from_slice(&2i32.to_le_bytes()); // channels
        buf[16..20].copy_from_slice(&0x03u32.to_le_bytes()); // active_channels

        let header = AudioHeader::decode(&buf).unwrap();
        assert_eq!(header.channels, 2);
        assert_eq!(header.samples_per_channel, 960);
        assert_eq!(header.active_channels.bits(), 0x03);
    }

    #[test]
    fn validate_rejects_zero_channels() {
        let mut header = AudioHeader::fpa1_stereo(48_000, 960);
        header.channels = 0;
        assert!(header.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_sample_rate() {
        let mut header = AudioHeader::fpa1_stereo(48_000, 960);
        header.sample_rate = 300_000;
        assert!(header.validate().is_err());
        header.sample_rate = 100;
        assert!(header.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_samples_per_channel() {
        let mut header = AudioHeader::fpa1_stereo(48_000, 960);
        header.samples_per_channel = 0;
        assert!(header.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_header() {
        let header = AudioHeader::fpa1_stereo(48_000, 960);
        assert!(header.validate().is_ok());
    }
}
