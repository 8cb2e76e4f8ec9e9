//! Active-channel bitfield for vMix-layout audio extended headers.

use bitflags::bitflags;

bitflags! {
    /// Which of up to 8 audio channels carry live samples.
    ///
    /// Carried as the `active_channels_bitfield` field of a vMix-layout audio
    /// extended header (see [`crate::frame::audio`]). A sender emitting stereo
    /// sets `LEFT | RIGHT` (`0x03`).
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct ActiveChannels: u32 {
        const LEFT    = 0b0000_0001;
        const RIGHT   = 0b0000_0010;
        const CHANNEL_3 = 0b0000_0100;
        const CHANNEL_4 = 0b0000_1000;
        const CHANNEL_5 = 0b0001_0000;
        const CHANNEL_6 = 0b0010_0000;
        const CHANNEL_7 = 0b0100_0000;
        const CHANNEL_8 = 0b1000_0000;
    }
}

impl ActiveChannels {
    /// The bitfield this crate's audio capture emitter sends for stereo L+R.
    pub fn stereo() -> Self {
        ActiveChannels::LEFT | ActiveChannels::RIGHT
    }
}
