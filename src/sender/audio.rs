//! Audio capture emitter (§4.6): a fixed-cadence capture adapter that reads
//! interleaved stereo float samples and de-planarizes them for the wire.
//!
//! Capture itself is out of scope (§1 Non-goals: microphone capture); an
//! embedding application supplies the samples through an [`AudioSource`]
//! implementation constructed around its own device API.

/// Sample rate this core's audio path always emits at (§4.6).
pub const SAMPLE_RATE: i32 = 48_000;
/// Channel count this core's audio path always emits (stereo).
pub const CHANNELS: usize = 2;
/// Samples per channel per packet — 20 ms at 48 kHz.
pub const SAMPLES_PER_CHANNEL: usize = 960;

/// A source of interleaved stereo float audio, supplied by the embedding
/// application.
pub trait AudioSource: Send {
    /// Fills `out` with exactly `out.len()` interleaved samples
    /// (`[L0, R0, L1, R1, …]`). Returns `false` to signal the source is
    /// exhausted, stopping the capture thread.
    fn read_interleaved(&mut self, out: &mut [f32]) -> bool;
}

/// De-interleaves `[L0,R0,L1,R1,…]` into separate `left`/`right` slices of
/// length `interleaved.len() / 2` each.
pub fn deinterleave_stereo(interleaved: &[f32], left: &mut [f32], right: &mut [f32]) {
    for (i, pair) in interleaved.chunks_exact(2).enumerate() {
        left[i] = pair[0];
        right[i] = pair[1];
    }
}

/// Serializes planar `left`/`right` float samples into the wire's
/// channel-contiguous planar-float payload (§4.6, §3 `FPA1`): `left` bytes
/// first, then `right` bytes, each little-endian IEEE-754 `f32`.
pub fn write_planar_bytes(left: &[f32], right: &[f32], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(left.len() * 4 + right.len() * 4);
    for sample in left {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    for sample in right {
        out.extend_from_slice(&sample.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deinterleave_splits_pairs_in_order() {
        let interleaved = [1.0f32, 10.0, 2.0, 20.0, 3.0, 30.0];
        let mut left = vec![0.0; 3];
        let mut right = vec![0.0; 3];
        deinterleave_stereo(&interleaved, &mut left, &mut right);
        assert_eq!(left, vec![1.0, 2.0, 3.0]);
        assert_eq!(right, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn write_planar_bytes_places_left_plane_before_right_plane() {
        let left = [1.0f32, 2.0];
        let right = [3.0f32, 4.0];
        let mut out = Vec::new();
        write_planar_bytes(&left, &right, &mut out);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&out[4..8], &2.0f32.to_le_bytes());
        assert_eq!(&out[8..12], &3.0f32.to_le_bytes());
        assert_eq!(&out[12..16], &4.0f32.to_le_bytes());
    }

    struct FixedSource {
        value: f32,
    }

    impl AudioSource for FixedSource {
        fn read_interleaved(&mut self, out: &mut [f32]) -> bool {
            out.fill(self.value);
            true
        }
    }

    #[test]
    fn audio_source_trait_object_is_usable() {
        let mut source: Box<dyn AudioSource> = Box::new(FixedSource { value: 0.5 });
        let mut buf = vec![0.0f32; 4];
        assert!(source.read_interleaved(&mut buf));
        assert_eq!(buf, vec![0.5; 4]);
    }
}
