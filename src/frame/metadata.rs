//! Metadata payload helpers (§3): subscription requests and settings
//! announcements exchanged as UTF-8, substring-matched XML fragments rather
//! than parsed with a full XML parser.

/// `<OMTSubscribe Video="true" />`
pub const SUBSCRIBE_VIDEO: &str = "<OMTSubscribe Video=\"true\" />";
/// `<OMTSubscribe Audio="true" />`
pub const SUBSCRIBE_AUDIO: &str = "<OMTSubscribe Audio=\"true\" />";
/// `<OMTSubscribe Metadata="true" />`
pub const SUBSCRIBE_METADATA: &str = "<OMTSubscribe Metadata=\"true\" />";

/// Renders `<OMTSettings Quality="…" />` for the given quality name.
pub fn settings_quality_xml(quality_name: &str) -> String {
    format!("<OMTSettings Quality=\"{}\" />", quality_name)
}

/// True if `payload` asks to subscribe to the video sub-stream (§4.3).
pub fn requests_video(payload: &str) -> bool {
    payload.contains("Subscribe") && payload.contains("Video")
}

/// True if `payload` asks to subscribe to the audio sub-stream (§4.3).
pub fn requests_audio(payload: &str) -> bool {
    payload.contains("Subscribe") && payload.contains("Audio")
}

/// True if `payload` asks to subscribe to the metadata sub-stream.
pub fn requests_metadata(payload: &str) -> bool {
    payload.contains("Subscribe") && payload.contains("Metadata")
}

/// True if `payload` carries a tally update (§4.7 dispatch: "reports
/// substring `Tally` as a status change").
pub fn is_tally(payload: &str) -> bool {
    payload.contains("Tally")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_subscribe_requests() {
        assert!(requests_video(SUBSCRIBE_VIDEO));
        assert!(requests_audio(SUBSCRIBE_AUDIO));
        assert!(requests_metadata(SUBSCRIBE_METADATA));
    }

    #[test]
    fn video_request_does_not_match_audio_check() {
        assert!(!requests_audio(SUBSCRIBE_VIDEO));
        assert!(!requests_video(SUBSCRIBE_AUDIO));
    }

    #[test]
    fn settings_quality_xml_embeds_name() {
        assert_eq!(
            settings_quality_xml("Default"),
            "<OMTSettings Quality=\"Default\" />"
        );
    }

    #[test]
    fn is_tally_matches_tally_payload() {
        assert!(is_tally("<OMTTally Preview=\"true\" Program=\"false\" />"));
        assert!(!is_tally(SUBSCRIBE_VIDEO));
    }
}
