//! The 16-byte base header shared by every OMT frame, and the framing codec
//! (`read_frame`/`write_frame`) that reads and writes it plus the per-type
//! extended header and payload that follow.

use std::io::{self, Read, Write};

use crate::error::{is_disconnect, Error, Result};
use crate::types::FrameType;

const PROTOCOL_VERSION: u8 = 1;
const BASE_HEADER_LEN: usize = 16;

/// Upper bound on `payload_length` for a video frame (§3).
pub const MAX_VIDEO_PAYLOAD: u32 = 16 * 1024 * 1024;
/// Upper bound on `payload_length` for a metadata frame (§3).
pub const MAX_METADATA_PAYLOAD: u32 = 1024 * 1024;
/// Upper bound on `payload_length` for an audio frame.
///
/// Not stated numerically in §3; the largest real audio frame this core ever
/// emits or accepts is a few tens of kilobytes (960 samples/channel, up to 8
/// channels, 4 bytes/sample plus the 24-byte header), so the metadata-tier
/// cap is reused rather than inventing a distinct one.
pub const MAX_AUDIO_PAYLOAD: u32 = MAX_METADATA_PAYLOAD;

/// The resync skip ceiling applied after a framing violation (§4.1/§7).
const RESYNC_SKIP_CEILING: usize = 64 * 1024;

fn max_payload_for(frame_type: FrameType) -> u32 {
    match frame_type {
        FrameType::Video => MAX_VIDEO_PAYLOAD,
        FrameType::Metadata => MAX_METADATA_PAYLOAD,
        FrameType::Audio => MAX_AUDIO_PAYLOAD,
    }
}

/// Reads one frame: the base header, then exactly `payload_length` further
/// bytes (the type's extended header followed by its payload, concatenated).
///
/// On a version or length violation the reader skips up to
/// `min(payload_length, 64 KiB)` bytes and resynchronizes on the next base
/// header rather than giving up (§4.1); if the stream ends during that skip
/// the violation surfaces as [`Error::Disconnected`], matching §3's
/// "violations terminate the connection" for the unrecoverable case.
pub fn read_frame(stream: &mut impl Read) -> Result<(FrameType, i64, Vec<u8>)> {
    loop {
        let mut header = [0u8; BASE_HEADER_LEN];
        read_exact_classified(stream, &mut header)?;

        let version = header[0];
        let raw_type = header[1];
        let timestamp = i64::from_le_bytes(header[2..10].try_into().unwrap());
        // header[10..12] is the reserved u16.
        let payload_length = u32::from_le_bytes(header[12..16].try_into().unwrap());

        let frame_type = match (version, FrameType::from_wire(raw_type)) {
            (PROTOCOL_VERSION, Some(ft)) if payload_length <= max_payload_for(ft) => ft,
            _ => {
                resync(stream, payload_length as usize)?;
                continue;
            }
        };

        let mut payload = vec![0u8; payload_length as usize];
        read_exact_classified(stream, &mut payload)?;
        return Ok((frame_type, timestamp, payload));
    }
}

fn resync(stream: &mut impl Read, claimed_length: usize) -> Result<()> {
    let to_skip = claimed_length.min(RESYNC_SKIP_CEILING);
    let mut remaining = to_skip;
    let mut scratch = [0u8; 4096];
    while remaining > 0 {
        let n = remaining.min(scratch.len());
        read_exact_classified(stream, &mut scratch[..n])?;
        remaining -= n;
    }
    Ok(())
}

fn read_exact_classified(stream: &mut impl Read, buf: &mut [u8]) -> Result<()> {
    match stream.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if is_disconnect(&e) || e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(Error::Disconnected)
        }
        Err(e) => Err(Error::Io(e)),
    }
}

/// Writes one complete frame: the base header (with `payload_length`
/// computed from `extended_header` and `payload`), the extended header, then
/// the payload, in that order. Callers are responsible for flushing.
pub fn write_frame(
    stream: &mut impl Write,
    frame_type: FrameType,
    timestamp: i64,
    extended_header: &[u8],
    payload: &[u8],
) -> Result<()> {
    let payload_length = (extended_header.len() + payload.len()) as u32;

    let mut header = [0u8; BASE_HEADER_LEN];
    header[0] = PROTOCOL_VERSION;
    header[1] = frame_type.to_wire();
    header[2..10].copy_from_slice(&timestamp.to_le_bytes());
    header[10..12].copy_from_slice(&0u16.to_le_bytes());
    header[12..16].copy_from_slice(&payload_length.to_le_bytes());

    stream.write_all(&header)?;
    stream.write_all(extended_header)?;
    stream.write_all(payload)?;
    Ok(())
}
