//! Frame type enumeration for Open Media Transport.
//!
//! Identifies which of the three frame kinds a base header's `type` byte selects,
//! which in turn determines the shape of the extended header that follows.

/// The `type` byte of the 16-byte base header.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrameType {
    /// A metadata (XML-fragment) frame.
    Metadata,
    /// A video frame, with a 32-byte extended header.
    Video,
    /// An audio frame, with a 24-byte extended header.
    Audio,
}

impl FrameType {
    /// The byte value carried on the wire.
    pub fn to_wire(self) -> u8 {
        match self {
            FrameType::Metadata => 1,
            FrameType::Video => 2,
            FrameType::Audio => 4,
        }
    }

    /// Parses the wire byte, returning `None` for any value other than 1, 2, or 4.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(FrameType::Metadata),
            2 => Some(FrameType::Video),
            4 => Some(FrameType::Audio),
            _ => None,
        }
    }
}
