//! OMT sender address type for connecting receivers to senders.
//!
//! Represents a network address that identifies an OMT sender. Addresses are
//! typically discovered via DNS-SD and take one of two shapes:
//!
//! 1. **Discovery name**: `"HOSTNAME (STREAM_NAME)"`, the format produced by
//!    [`crate::Discovery`], where `HOSTNAME` is the network host and
//!    `STREAM_NAME` is the human-readable stream identifier.
//! 2. **Direct URL**: `"omt://hostname:port"`, a direct connection target.
//!
//! This newtype wrapper distinguishes sender addresses from other strings in
//! the API and provides type safety when passing addresses to receiver
//! construction.
//!
//! # Examples
//!
//! ```rust
//! use omt_core::types::Address;
//!
//! let address = Address::from("workstation-01 (Live Studio Feed)");
//! let address = Address::new("omt://localhost:6500");
//! ```

/// An OMT sender address for connecting receivers to senders.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new `Address` from any type that can be converted to `String`.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the `Address` and returns the underlying `String`.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Splits a `"host:port"` direct address into its parts.
    ///
    /// Returns `None` for discovery-name addresses (`"HOST (Name)"`) or any
    /// value whose port segment does not parse as `u16`; callers that need to
    /// resolve a discovery name should go through [`crate::Discovery`] instead.
    pub fn host_port(&self) -> Option<(&str, u16)> {
        let s = self.0.strip_prefix("omt://").unwrap_or(&self.0);
        let (host, port) = s.rsplit_once(':')?;
        let port: u16 = port.parse().ok()?;
        Some((host, port))
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_port_parses_direct_url() {
        let addr = Address::new("omt://192.168.1.10:6500");
        assert_eq!(addr.host_port(), Some(("192.168.1.10", 6500)));
    }

    #[test]
    fn host_port_parses_bare_host_colon_port() {
        let addr = Address::new("camera1:6500");
        assert_eq!(addr.host_port(), Some(("camera1", 6500)));
    }

    #[test]
    fn host_port_none_for_discovery_name() {
        let addr = Address::new("workstation-01 (Live Studio Feed)");
        assert_eq!(addr.host_port(), None);
    }

    #[test]
    fn display_and_as_ref_round_trip() {
        let addr = Address::from("omt://localhost:6500");
        assert_eq!(format!("{}", addr), "omt://localhost:6500");
        assert_eq!(addr.as_ref(), "omt://localhost:6500");
    }
}
