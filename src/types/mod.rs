//! High-level types for Open Media Transport (OMT).
//!
//! ## Timestamps
//! Uses the OMT timebase: 10,000,000 ticks per second. Both peers treat the
//! value as an opaque 100-nanosecond counter with no defined epoch (§9); it
//! is never interpreted as wall-clock time.
//!
//! ## Metadata
//! Metadata frames are UTF-8 XML-shaped fragments, parsed by substring match
//! rather than a full XML parser (§3).
//!
//! See: <https://github.com/openmediatransport>

use std::time::Duration;

mod active_channels;
pub use active_channels::ActiveChannels;

mod address;
pub use address::Address;

mod codec;
pub use codec::Codec;

mod color_space;
pub use color_space::ColorSpace;

mod frame_rate;
pub use frame_rate::{FrameRate, FrameRateError};

mod frame_type;
pub use frame_type::FrameType;

mod name;
pub use name::Name;

mod quality;
pub use quality::Quality;

mod sender_info;
pub use sender_info::SenderInfo;

mod statistics;
pub use statistics::Statistics;

mod tally;
pub use tally::Tally;

/// Standard timeout type used by the socket-facing API.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timeout(Duration);

impl Timeout {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl From<Duration> for Timeout {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl From<Timeout> for Duration {
    fn from(value: Timeout) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_from_millis_round_trips() {
        let timeout = Timeout::from_millis(500);
        assert_eq!(timeout.as_duration(), Duration::from_millis(500));
    }

    #[test]
    fn timeout_from_duration_trait() {
        let duration = Duration::from_millis(750);
        let timeout: Timeout = duration.into();
        assert_eq!(timeout.as_duration(), Duration::from_millis(750));
    }
}
