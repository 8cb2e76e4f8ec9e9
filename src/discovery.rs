//! DNS-SD advertisement and browsing for Open Media Transport (OMT) sources
//! (§6.2).
//!
//! The wire-level interface is collaborator-only: a sender advertises
//! `(port, IPv4 address)` under service type `_omt._tcp.` once its listener
//! is bound, using an instance name of `"<HOST> (<SourceName>)"`
//! ([`crate::types::Name::instance_name`]); a receiver enumerates services of
//! that type and resolves each to `(name, host, port)`. Built on `mdns-sd`, a
//! pure-Rust mDNS/DNS-SD implementation with no native dependency — this core
//! no longer wraps a native library that already provided discovery.
//!
//! Advertisement and browsing each run on their own background thread, owned
//! by `Discovery` and joined on drop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};

use crate::error::{Error, Result};
use crate::types::{Address, Name};

/// DNS-SD service type for OMT sources, within the `.local.` mDNS domain
/// (§6.2: `_omt._tcp.`, trailing dot required for vMix/OMT Viewer
/// compatibility).
const SERVICE_TYPE: &str = "_omt._tcp.local.";

/// Best-effort local hostname lookup for building the instance name; there is
/// no OS-agnostic `std` API for this, so common environment variables are
/// tried before falling back to a fixed placeholder.
fn local_hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

enum Role {
    /// Advertising one local source; torn down by unregistering on drop.
    Advertise { fullname: String },
    /// Browsing for sources; the background thread exits once the daemon's
    /// event channel is dropped by `stop_browse`.
    Browse {
        addresses: Arc<Mutex<Vec<Address>>>,
        resolved: Arc<Mutex<HashMap<String, (String, u16)>>>,
        thread: Option<JoinHandle<()>>,
    },
}

/// A DNS-SD advertisement or browse session for OMT sources.
pub struct Discovery {
    daemon: ServiceDaemon,
    role: Role,
}

impl Discovery {
    /// Advertises a local source named `source_name` on `port`, formatted as
    /// `"<HOST> (<source_name>)"` (§6.2). The advertisement is withdrawn when
    /// the returned `Discovery` is dropped.
    pub fn advertise(source_name: &Name, port: u16) -> Result<Self> {
        let daemon = ServiceDaemon::new()
            .map_err(|e| Error::FramingInvalid { detail: format!("mdns daemon: {e}") })?;

        let host = local_hostname();
        let instance_name = source_name.instance_name(&host);
        let host_fqdn = format!("{host}.local.");

        let service = ServiceInfo::new(SERVICE_TYPE, &instance_name, &host_fqdn, "", port, None)
            .map_err(|e| Error::FramingInvalid { detail: format!("mdns service info: {e}") })?
            .enable_addr_auto();

        let fullname = service.get_fullname().to_string();
        daemon
            .register(service)
            .map_err(|e| Error::FramingInvalid { detail: format!("mdns register: {e}") })?;

        debug!("advertising OMT source {instance_name} on port {port}");
        Ok(Discovery { daemon, role: Role::Advertise { fullname } })
    }

    /// Starts browsing for OMT sources on the local network. Results
    /// accumulate in the background and are read via
    /// [`get_addresses`](Self::get_addresses).
    pub fn browse() -> Result<Self> {
        let daemon = ServiceDaemon::new()
            .map_err(|e| Error::FramingInvalid { detail: format!("mdns daemon: {e}") })?;
        let receiver = daemon
            .browse(SERVICE_TYPE)
            .map_err(|e| Error::FramingInvalid { detail: format!("mdns browse: {e}") })?;

        let addresses = Arc::new(Mutex::new(Vec::new()));
        let resolved = Arc::new(Mutex::new(HashMap::<String, (String, u16)>::new()));
        // mDNS fullname -> the display name `resolved`/`addresses` are keyed
        // by, so a later `ServiceRemoved(fullname)` can find what to drop.
        let fullnames = Arc::new(Mutex::new(HashMap::<String, String>::new()));
        let thread_addresses = addresses.clone();
        let thread_resolved = resolved.clone();
        let thread_fullnames = fullnames.clone();
        let thread = thread::spawn(move || {
            while let Ok(event) = receiver.recv() {
                match event {
                    ServiceEvent::ServiceResolved(info) => {
                        let host = info
                            .get_hostname()
                            .trim_end_matches(".local.")
                            .trim_end_matches('.')
                            .to_string();
                        let port = info.get_port();
                        let fullname = info.get_fullname().to_string();
                        let display_name = info
                            .get_property_val_str("name")
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| fullname.clone());
                        // Keyed by display name (§6.2 resolves to `(name, host,
                        // port)`), not the mDNS fullname, so `resolve` can be
                        // driven directly from the `Address` a caller obtained
                        // from `get_addresses`.
                        thread_resolved.lock().unwrap().insert(display_name.clone(), (host, port));
                        thread_fullnames.lock().unwrap().insert(fullname, display_name.clone());
                        let mut addrs = thread_addresses.lock().unwrap();
                        if !addrs.iter().any(|a: &Address| a.as_str() == display_name) {
                            addrs.push(Address::new(display_name));
                        }
                    }
                    ServiceEvent::ServiceRemoved(_ty, fullname) => {
                        if let Some(name) = thread_fullnames.lock().unwrap().remove(&fullname) {
                            thread_resolved.lock().unwrap().remove(&name);
                            thread_addresses.lock().unwrap().retain(|a| a.as_str() != name);
                        }
                    }
                    _ => {}
                }
            }
        });

        Ok(Discovery {
            daemon,
            role: Role::Browse { addresses, resolved, thread: Some(thread) },
        })
    }

    /// Returns a snapshot of the discovery-name addresses observed so far.
    ///
    /// Discovery runs in the background, so the first call typically returns
    /// an empty or incomplete list while resolution is still in progress;
    /// [`get_addresses_with_options`](Self::get_addresses_with_options) and
    /// [`get_addresses_with_backoff`](Self::get_addresses_with_backoff) give
    /// discovery time to settle before returning.
    pub fn get_addresses(&self) -> Vec<Address> {
        match &self.role {
            Role::Browse { addresses, .. } => addresses.lock().unwrap().clone(),
            Role::Advertise { .. } => Vec::new(),
        }
    }

    /// Resolves a discovery-name `address` (one returned by
    /// [`get_addresses`](Self::get_addresses)) to the `(host, port)` a
    /// receiver can connect to (§6.2: "Receivers enumerate services of the
    /// same type and resolve each to `(name, host, port)`"). Returns `None`
    /// if `address` was never observed by this browse session.
    pub fn resolve(&self, address: &Address) -> Option<(String, u16)> {
        match &self.role {
            Role::Browse { resolved, .. } => resolved.lock().unwrap().get(address.as_str()).cloned(),
            Role::Advertise { .. } => None,
        }
    }

    /// Polls [`get_addresses`](Self::get_addresses) up to `attempts` times,
    /// sleeping `delay` between attempts, stopping early once the list is
    /// non-empty.
    pub fn get_addresses_with_options(&self, attempts: u32, delay: Duration) -> Vec<Address> {
        for attempt in 0..attempts.max(1) {
            let addresses = self.get_addresses();
            if !addresses.is_empty() || attempt + 1 == attempts {
                return addresses;
            }
            thread::sleep(delay);
        }
        Vec::new()
    }

    /// Like [`get_addresses_with_options`](Self::get_addresses_with_options)
    /// but multiplies the delay by `factor` after each empty attempt, up to
    /// `max_delay`.
    pub fn get_addresses_with_backoff(
        &self,
        attempts: u32,
        start_delay: Duration,
        max_delay: Duration,
        factor: f64,
    ) -> Vec<Address> {
        let mut delay = start_delay;
        for attempt in 0..attempts.max(1) {
            let addresses = self.get_addresses();
            if !addresses.is_empty() || attempt + 1 == attempts {
                return addresses;
            }
            thread::sleep(delay);
            let next_millis = (delay.as_millis() as f64 * factor) as u64;
            delay = Duration::from_millis(next_millis).min(max_delay);
        }
        Vec::new()
    }
}

impl Drop for Discovery {
    fn drop(&mut self) {
        match &mut self.role {
            Role::Advertise { fullname } => {
                if let Err(e) = self.daemon.unregister(fullname) {
                    warn!("failed to unregister mdns service {fullname}: {e}");
                }
            }
            Role::Browse { thread, .. } => {
                if let Err(e) = self.daemon.stop_browse(SERVICE_TYPE) {
                    warn!("failed to stop mdns browse: {e}");
                }
                if let Some(handle) = thread.take() {
                    let _ = handle.join();
                }
            }
        }
        let _ = self.daemon.shutdown();
    }
}
