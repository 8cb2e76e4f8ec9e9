//! A pure-Rust implementation of the Open Media Transport (OMT) wire
//! protocol core: frame codec, sender (source) pipeline, and receiver
//! (client) pipeline.
//!
//! See: <https://github.com/openmediatransport>

pub mod codec;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod helpers;
pub mod pool;
pub mod receiver;
pub mod sender;
pub mod settings;
mod session;
mod timestamp;
pub mod types;

pub use discovery::Discovery;
pub use error::Error;
pub use receiver::{Receiver, ReceiverCallbacks};
pub use sender::{ErrorKind, Sender, SenderCallbacks};
pub use settings::{
    get_discovery_server, get_logging_filename, get_network_port_end, get_network_port_range,
    get_network_port_start, set_discovery_server, set_logging_filename, set_network_port_end,
    set_network_port_range, set_network_port_start,
};
pub use types::{
    ActiveChannels, Address, Codec, ColorSpace, FrameRate, FrameRateError, FrameType, Name,
    Quality, SenderInfo, Statistics, Tally, Timeout,
};
