//! Process-local configuration for Open Media Transport (OMT).
//!
//! A small in-process `OnceLock<RwLock<Settings>>` store: settings changed
//! here persist only for the currently running process, with no on-disk
//! file backing them.
//!
//! See: <https://github.com/openmediatransport>

use std::sync::{OnceLock, RwLock};

const DEFAULT_PORT_START: i32 = 6400;
const DEFAULT_PORT_END: i32 = 6600;

#[derive(Clone, Debug)]
struct Settings {
    network_port_start: i32,
    network_port_end: i32,
    discovery_server: Option<String>,
    logging_filename: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            network_port_start: DEFAULT_PORT_START,
            network_port_end: DEFAULT_PORT_END,
            discovery_server: None,
            logging_filename: None,
        }
    }
}

fn store() -> &'static RwLock<Settings> {
    static STORE: OnceLock<RwLock<Settings>> = OnceLock::new();
    STORE.get_or_init(|| RwLock::new(Settings::default()))
}

/// Returns the first port the sender will try when binding (default 6400).
pub fn get_network_port_start() -> i32 {
    store().read().unwrap().network_port_start
}

/// Sets the first port the sender will try when binding.
pub fn set_network_port_start(port: i32) {
    store().write().unwrap().network_port_start = port;
}

/// Returns the last port the sender will try when binding (default 6600).
pub fn get_network_port_end() -> i32 {
    store().read().unwrap().network_port_end
}

/// Sets the last port the sender will try when binding.
pub fn set_network_port_end(port: i32) {
    store().write().unwrap().network_port_end = port;
}

/// Returns `(start, end)` of the dynamic port range used for sender binds.
pub fn get_network_port_range() -> (i32, i32) {
    let settings = store().read().unwrap();
    (settings.network_port_start, settings.network_port_end)
}

/// Sets both ends of the dynamic port range in one call.
pub fn set_network_port_range(start: i32, end: i32) {
    let mut settings = store().write().unwrap();
    settings.network_port_start = start;
    settings.network_port_end = end;
}

/// Returns the `omt://host:port` discovery server override, if set.
///
/// When set, receivers SHOULD use this address instead of DNS-SD browsing
/// (§6.2).
pub fn get_discovery_server() -> Option<String> {
    store().read().unwrap().discovery_server.clone()
}

/// Sets the `omt://host:port` discovery server override. Pass an empty
/// string to clear it and fall back to DNS-SD browsing.
pub fn set_discovery_server(server: &str) {
    let mut settings = store().write().unwrap();
    settings.discovery_server = if server.is_empty() {
        None
    } else {
        Some(server.to_string())
    };
}

/// Returns the configured log file path, if any.
pub fn get_logging_filename() -> Option<String> {
    store().read().unwrap().logging_filename.clone()
}

/// Sets (or clears, with `None`) the log file path an embedder's
/// `log`-compatible file sink should write to.
///
/// This crate does not install a logger itself (§0.2); it only records the
/// preference here for an embedder's `env_logger`/`fern`-style setup to
/// consult.
pub fn set_logging_filename(path: Option<&str>) {
    store().write().unwrap().logging_filename = path.map(|p| p.to_string());
}
