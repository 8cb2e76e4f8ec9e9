//! Transport and codec statistics for audio or video streams.

/// Transport and codec statistics for one stream direction (video or audio).
///
/// Retrieved via [`crate::Sender::video_statistics`]/`audio_statistics` or
/// [`crate::Receiver::video_statistics`]/`audio_statistics`. Tracks both
/// cumulative totals and deltas since the last query, matching the §4.4/§4.9
/// FPS-accounting requirement.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    /// Total bytes transferred (cumulative).
    pub bytes_total: u64,
    /// Bytes transferred since the last query.
    pub bytes_since_last: u64,
    /// Total number of frames (cumulative).
    pub frames_total: u64,
    /// Number of frames since the last query.
    pub frames_since_last: u64,
    /// Total number of frames dropped (cumulative).
    pub frames_dropped: u64,
    /// Time in milliseconds spent encoding/decoding (cumulative).
    pub codec_millis_total: u64,
    /// Time in milliseconds spent encoding/decoding since the last query.
    pub codec_millis_since_last: u64,
}

impl Statistics {
    /// Frames per second implied by `frames_since_last` over `period_secs`.
    ///
    /// Returns `0.0` if `period_secs` is not positive.
    pub fn fps(&self, period_secs: f64) -> f64 {
        if period_secs <= 0.0 {
            0.0
        } else {
            self.frames_since_last as f64 / period_secs
        }
    }

    /// Average codec milliseconds per frame since the last query.
    ///
    /// Returns `0.0` if no frames were processed in the period.
    pub fn average_codec_millis(&self) -> f64 {
        if self.frames_since_last == 0 {
            0.0
        } else {
            self.codec_millis_since_last as f64 / self.frames_since_last as f64
        }
    }

    /// Rolls a period's worth of new activity into the running totals and
    /// resets the "since last" counters to the new period's values.
    pub fn record_period(&mut self, frames: u64, bytes: u64, dropped: u64, codec_millis: u64) {
        self.frames_total += frames;
        self.bytes_total += bytes;
        self.frames_dropped += dropped;
        self.codec_millis_total += codec_millis;
        self.frames_since_last = frames;
        self.bytes_since_last = bytes;
        self.codec_millis_since_last = codec_millis;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_divides_frames_by_period() {
        let mut stats = Statistics::default();
        stats.record_period(90, 1_000_000, 0, 450);
        assert_eq!(stats.fps(3.0), 30.0);
    }

    #[test]
    fn fps_is_zero_for_non_positive_period() {
        let stats = Statistics::default();
        assert_eq!(stats.fps(0.0), 0.0);
        assert_eq!(stats.fps(-1.0), 0.0);
    }

    #[test]
    fn average_codec_millis_handles_zero_frames() {
        let stats = Statistics::default();
        assert_eq!(stats.average_codec_millis(), 0.0);
    }

    #[test]
    fn record_period_accumulates_totals_and_resets_deltas() {
        let mut stats = Statistics::default();
        stats.record_period(10, 100, 1, 50);
        stats.record_period(20, 200, 0, 80);
        assert_eq!(stats.frames_total, 30);
        assert_eq!(stats.bytes_total, 300);
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.codec_millis_total, 130);
        assert_eq!(stats.frames_since_last, 20);
        assert_eq!(stats.bytes_since_last, 200);
        assert_eq!(stats.codec_millis_since_last, 80);
    }
}
