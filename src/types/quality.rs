//! Quality settings for video encoding in Open Media Transport.
//!
//! Carried in `<OMTSettings Quality="…" />` metadata frames exchanged between a
//! receiver and a sender.

/// Compression quality setting for video encoding.
///
/// If set to `Default`, the sender allows suggestions from all receivers and
/// selects the highest suggestion amongst them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Quality {
    /// Defers to other receivers' suggestions.
    Default,
    /// Minimal compression overhead.
    Low,
    /// Balanced compression.
    Medium,
    /// Maximum quality, higher compression overhead.
    High,
}

impl Quality {
    /// The integer value used in the `<OMTSettings Quality="…" />` attribute.
    pub fn to_wire(self) -> i32 {
        match self {
            Quality::Default => 0,
            Quality::Low => 1,
            Quality::Medium => 50,
            Quality::High => 100,
        }
    }

    /// Parses the attribute's name (`"Default"`, `"Low"`, `"Medium"`, `"High"`),
    /// case-insensitively, defaulting to `Default` for anything else.
    pub fn from_attr(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "low" => Quality::Low,
            "medium" => Quality::Medium,
            "high" => Quality::High,
            _ => Quality::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_protocol_constants() {
        assert_eq!(Quality::Default.to_wire(), 0);
        assert_eq!(Quality::Low.to_wire(), 1);
        assert_eq!(Quality::Medium.to_wire(), 50);
        assert_eq!(Quality::High.to_wire(), 100);
    }

    #[test]
    fn from_attr_is_case_insensitive() {
        assert_eq!(Quality::from_attr("HIGH"), Quality::High);
        assert_eq!(Quality::from_attr("Medium"), Quality::Medium);
        assert_eq!(Quality::from_attr("bogus"), Quality::Default);
    }
}
