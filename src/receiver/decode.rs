//! Audio de-planarization (§4.7/§4.8): turns the wire's channel-contiguous
//! planar `FPA1` payload, or a legacy interleaved 16-bit PCM payload, back
//! into interleaved `f32` samples for playback.

use crate::frame::AudioHeader;
use crate::types::Codec;

/// Converts a planar `FPA1` audio payload into interleaved `f32` samples
/// (`[c0s0, c1s0, …, c0s1, c1s1, …]`), or a legacy 16-bit PCM payload
/// (already interleaved on the wire) into interleaved `f32` samples scaled
/// to `[-1.0, 1.0]` (§4.7: "for 16-bit PCM, reads and writes little-endian
/// shorts"). Returns `None` for any other codec/bit-depth combination this
/// core does not decode.
pub fn deplanarize(header: &AudioHeader, payload: &[u8]) -> Option<Vec<f32>> {
    match (header.codec, header.bits_per_sample) {
        (Codec::FPA1, 32) => deplanarize_float(header, payload),
        (_, 16) => interleave_pcm16(header, payload),
        _ => None,
    }
}

fn deplanarize_float(header: &AudioHeader, payload: &[u8]) -> Option<Vec<f32>> {
    let channels = header.channels as usize;
    let samples_per_channel = header.samples_per_channel as usize;
    let plane_bytes = samples_per_channel * 4;
    if payload.len() < channels * plane_bytes {
        return None;
    }

    let mut out = vec![0f32; channels * samples_per_channel];
    for (ch, plane) in payload.chunks_exact(plane_bytes).take(channels).enumerate() {
        for (sample_idx, bytes) in plane.chunks_exact(4).enumerate() {
            out[sample_idx * channels + ch] = f32::from_le_bytes(bytes.try_into().unwrap());
        }
    }
    Some(out)
}

/// Reads little-endian `i16` samples, already interleaved on the wire
/// (the legacy PCM layout predates the planar `FPA1` format), and scales
/// each to `[-1.0, 1.0]` so downstream playback sees the same sample range
/// as the `FPA1` path regardless of which layout arrived.
fn interleave_pcm16(header: &AudioHeader, payload: &[u8]) -> Option<Vec<f32>> {
    let channels = header.channels as usize;
    let samples_per_channel = header.samples_per_channel as usize;
    let total_samples = channels * samples_per_channel;
    if payload.len() < total_samples * 2 {
        return None;
    }

    let mut out = vec![0f32; total_samples];
    for (dst, bytes) in out.iter_mut().zip(payload.chunks_exact(2)) {
        let raw = i16::from_le_bytes(bytes.try_into().unwrap());
        *dst = raw as f32 / i16::MAX as f32;
    }
    Some(out)
}
