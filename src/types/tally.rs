//! Tally state for Open Media Transport (OMT).
//!
//! Tally information travels bidirectionally as `<OMTTally Preview="…"
//! Program="…" />` metadata frames: a sender announces its own tally state on
//! accept and as an idle keepalive (§4.4), and a receiver may echo its tally
//! state back upstream.

/// On-air tally state, where `false` = off, `true` = on.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Preview tally state.
    pub preview: bool,
    /// Program (on-air) tally state.
    pub program: bool,
}

impl Tally {
    /// Renders the `<OMTTally .../>` metadata payload for this state.
    pub fn to_xml(self) -> String {
        format!(
            "<OMTTally Preview=\"{}\" Program=\"{}\" />",
            self.preview, self.program
        )
    }

    /// Parses `Preview="…"`/`Program="…"` attributes out of a tally payload.
    ///
    /// Substring-based, matching the wire protocol's non-XML parsing rule
    /// (§3): any payload containing `Tally` is scanned for these attributes,
    /// with either or both absent leaving the corresponding field `false`.
    pub fn from_xml(payload: &str) -> Option<Self> {
        if !payload.contains("Tally") {
            return None;
        }
        Some(Tally {
            preview: attr_bool(payload, "Preview"),
            program: attr_bool(payload, "Program"),
        })
    }
}

fn attr_bool(payload: &str, attr: &str) -> bool {
    let needle = format!("{}=\"true\"", attr);
    payload
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_xml_renders_both_attributes() {
        let tally = Tally {
            preview: true,
            program: false,
        };
        assert_eq!(tally.to_xml(), "<OMTTally Preview=\"true\" Program=\"false\" />");
    }

    #[test]
    fn from_xml_parses_both_true() {
        let parsed = Tally::from_xml("<OMTTally Preview=\"true\" Program=\"true\" />").unwrap();
        assert_eq!(parsed, Tally { preview: true, program: true });
    }

    #[test]
    fn from_xml_missing_attribute_defaults_false() {
        let parsed = Tally::from_xml("<OMTTally Program=\"true\" />").unwrap();
        assert_eq!(parsed, Tally { preview: false, program: true });
    }

    #[test]
    fn from_xml_none_for_unrelated_payload() {
        assert_eq!(Tally::from_xml("<OMTSubscribe Video=\"true\" />"), None);
    }

    #[test]
    fn round_trips_through_to_xml_and_from_xml() {
        let tally = Tally { preview: true, program: true };
        assert_eq!(Tally::from_xml(&tally.to_xml()), Some(tally));
    }
}
