//! Name type for OMT senders.
//!
//! A `Name` identifies an OMT sender for DNS-SD advertisement and discovery.
//! Discovered senders appear as `"HOSTNAME (NAME)"`; the name itself should
//! not contain hostname or port information.
//!
//! # Examples
//!
//! ```rust
//! use omt_core::types::Name;
//!
//! let name = Name::from("Camera 1");
//! let name = Name::new(format!("sender-{}", std::process::id()));
//! ```

use std::fmt;

/// A sender name used for DNS-SD advertisement (service type `_omt._tcp.`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Name(String);

impl Name {
    /// Creates a new `Name` from any type that converts to `String`.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the sender name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the `Name`, returning the underlying `String`.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Formats the DNS-SD service instance name for this sender name on `host`.
    ///
    /// If `self` already contains parentheses it is used verbatim, matching
    /// the wire-protocol rule that a pre-formatted name is not re-wrapped.
    pub fn instance_name(&self, host: &str) -> String {
        if self.0.contains('(') && self.0.contains(')') {
            self.0.clone()
        } else {
            format!("{} ({})", host, self.0)
        }
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_name_wraps_plain_name_in_parens() {
        let name = Name::from("Studio A");
        assert_eq!(name.instance_name("host1"), "host1 (Studio A)");
    }

    #[test]
    fn instance_name_is_used_verbatim_when_already_parenthesized() {
        let name = Name::from("host1 (Studio A)");
        assert_eq!(name.instance_name("host1"), "host1 (Studio A)");
    }
}
