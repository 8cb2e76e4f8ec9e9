//! Sender information metadata for Open Media Transport (OMT).
//!
//! Optional metadata describing the sender device/software, announced to
//! every accepted client via an `<OMTInfo .../>` metadata frame.

/// Optional metadata describing the sender device/software.
///
/// Set on a [`crate::Sender`] via `set_sender_info` before accepting clients;
/// defaults to this crate's own package name and version when unset.
#[derive(Clone, Debug)]
pub struct SenderInfo {
    /// Product name of the sender device/software.
    pub product_name: String,
    /// Manufacturer of the sender device/software.
    pub manufacturer: String,
    /// Version string of the sender software.
    pub version: String,
}

impl Default for SenderInfo {
    /// Defaults `product_name`/`version` to this crate's own package name and
    /// version (`manufacturer` has no crate-level equivalent, so it stays
    /// empty until set).
    fn default() -> Self {
        SenderInfo {
            product_name: env!("CARGO_PKG_NAME").to_string(),
            manufacturer: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl SenderInfo {
    /// Creates a new `SenderInfo` defaulted to this crate's own package name
    /// and version (§4.11).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the product name.
    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = product_name.into();
        self
    }

    /// Sets the manufacturer.
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// Sets the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Renders the `<OMTInfo .../>` metadata payload for this info.
    pub fn to_xml(&self) -> String {
        format!(
            "<OMTInfo ProductName=\"{}\" Manufacturer=\"{}\" Version=\"{}\" />",
            xml_escape(&self.product_name),
            xml_escape(&self.manufacturer),
            xml_escape(&self.version),
        )
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
