//! Per-client session state on the sender side (§4.3): accept-time setup,
//! the blocking reader loop that tracks subscriptions, and the write lock
//! that keeps one socket's frames from interleaving.

use std::io::{BufWriter, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, warn};
use uuid::Uuid;

use crate::error::{is_disconnect, Error, Result};
use crate::frame::{base, metadata};
use crate::types::{FrameType, SenderInfo, Tally};

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const SEND_BUFFER_BYTES: usize = 512 * 1024;
const OUTPUT_BUFFER_BYTES: usize = 256 * 1024;

/// True if `addr` is a loopback address — the sender's own self-connectivity
/// probe (§4.3/§4.4), rejected rather than tracked as a client.
pub fn is_loopback(addr: &SocketAddr) -> bool {
    match addr.ip() {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

/// Per-client state: subscriptions, send lock, read loop, lifecycle (§3/§4.3).
pub struct Session {
    id: Uuid,
    peer_addr: SocketAddr,
    output: Mutex<BufWriter<TcpStream>>,
    reader: Mutex<TcpStream>,
    subscribed_video: AtomicBool,
    subscribed_audio: AtomicBool,
    connected: AtomicBool,
    tally: Mutex<Tally>,
}

impl Session {
    /// Accepts `stream`, applying the socket options and initial metadata
    /// handshake of §4.3. Returns `Ok(None)` for a loopback peer, which is
    /// closed immediately rather than tracked.
    pub fn accept(stream: TcpStream, sender_info: &SenderInfo, tally: Tally) -> Result<Option<Self>> {
        let peer_addr = stream.peer_addr()?;
        if is_loopback(&peer_addr) {
            debug!("rejecting loopback self-probe connection from {peer_addr}");
            return Ok(None);
        }

        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        // Without this a stalled peer blocks `write_all` in `send_frame`
        // forever, stalling the single encoder/fan-out thread for every
        // other subscribed session instead of erroring into eviction (§7
        // Send-disconnect).
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;

        // `try_clone` duplicates the OS handle, so the `Socket` below owns
        // an independent descriptor and closes only that one on drop.
        let socket = socket2::Socket::from(stream.try_clone()?);
        socket.set_send_buffer_size(SEND_BUFFER_BYTES)?;

        let reader = stream.try_clone()?;
        let output = BufWriter::with_capacity(OUTPUT_BUFFER_BYTES, stream);

        let session = Session {
            id: Uuid::now_v7(),
            peer_addr,
            output: Mutex::new(output),
            reader: Mutex::new(reader),
            subscribed_video: AtomicBool::new(false),
            subscribed_audio: AtomicBool::new(false),
            connected: AtomicBool::new(true),
            tally: Mutex::new(tally),
        };

        session.send_metadata(&sender_info.to_xml())?;
        session.send_metadata(&tally.to_xml())?;

        debug!("session {} accepted from {peer_addr}", session.id);
        Ok(Some(session))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn is_subscribed_video(&self) -> bool {
        self.subscribed_video.load(Ordering::Acquire)
    }

    pub fn is_subscribed_audio(&self) -> bool {
        self.subscribed_audio.load(Ordering::Acquire)
    }

    pub fn tally(&self) -> Tally {
        *self.tally.lock().unwrap()
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Writes one complete frame under the session's write lock (§4.3/§4.4,
    /// §8 session-write atomicity): video/audio fan-out and metadata
    /// heartbeats never interleave mid-frame on one socket.
    pub fn send_frame(
        &self,
        frame_type: FrameType,
        timestamp: i64,
        extended_header: &[u8],
        payload: &[u8],
    ) -> Result<()> {
        let mut output = self.output.lock().unwrap();
        let result = base::write_frame(&mut *output, frame_type, timestamp, extended_header, payload)
            .and_then(|()| output.flush().map_err(Error::Io));
        if let Err(Error::Io(ref e)) = result {
            if is_disconnect(e) {
                self.mark_disconnected();
            }
        }
        result
    }

    fn send_metadata(&self, payload: &str) -> Result<()> {
        self.send_frame(FrameType::Metadata, 0, &[], payload.as_bytes())
    }

    /// Sends a fresh `<OMTTally …/>` frame, required immediately after a
    /// client subscribes to audio so the peer does not treat the newly
    /// active subchannel as idle (§4.3).
    pub fn send_tally_refresh(&self) -> Result<()> {
        let tally = self.tally();
        self.send_metadata(&tally.to_xml())
    }

    /// Blocking reader loop: tracks subscription metadata until the peer
    /// disconnects or a read times out repeatedly (timeouts are not errors,
    /// §4.3). Returns once the session should be evicted.
    pub fn run_reader_loop(&self) {
        let mut reader = self.reader.lock().unwrap();
        loop {
            if !self.is_connected() {
                return;
            }
            match base::read_frame(&mut *reader) {
                Ok((FrameType::Metadata, _ts, payload)) => {
                    let Ok(text) = std::str::from_utf8(&payload) else {
                        continue;
                    };
                    let text = text.trim_end_matches('\0');
                    if metadata::requests_video(text) {
                        self.subscribed_video.store(true, Ordering::Release);
                    }
                    if metadata::requests_audio(text) {
                        self.subscribed_audio.store(true, Ordering::Release);
                        if let Err(e) = self.send_tally_refresh() {
                            warn!("session {} tally refresh failed: {e}", self.id);
                        }
                    }
                    if let Some(new_tally) = crate::types::Tally::from_xml(text) {
                        *self.tally.lock().unwrap() = new_tally;
                    }
                }
                Ok((_, _, _)) => {
                    // A client session only ever sends metadata upstream;
                    // any other frame type is ignored rather than treated as
                    // an error.
                }
                Err(Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(_) => {
                    self.mark_disconnected();
                    debug!("session {} disconnected", self.id);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpListener};

    fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn is_loopback_recognizes_127_addresses() {
        let addr: SocketAddr = "127.0.0.1:6500".parse().unwrap();
        assert!(is_loopback(&addr));
        let addr: SocketAddr = "192.168.1.5:6500".parse().unwrap();
        assert!(!is_loopback(&addr));
    }

    #[test]
    fn accept_sends_info_and_tally_frames() {
        let (client, server) = connected_pair();
        let info = SenderInfo::new().with_product_name("Test Sender");
        let session = Session::accept(server, &info, Tally::default())
            .unwrap()
            .expect("non-loopback accept");
        assert!(!session.is_subscribed_video());
        assert!(!session.is_subscribed_audio());

        let mut reader = client;
        let (ft, _ts, payload) = base::read_frame(&mut reader).unwrap();
        assert_eq!(ft, FrameType::Metadata);
        assert!(std::str::from_utf8(&payload).unwrap().contains("OMTInfo"));

        let (ft, _ts, payload) = base::read_frame(&mut reader).unwrap();
        assert_eq!(ft, FrameType::Metadata);
        assert!(std::str::from_utf8(&payload).unwrap().contains("OMTTally"));
    }

    #[test]
    fn subscribe_video_metadata_sets_flag() {
        let (mut client, server) = connected_pair();
        let session = Session::accept(server, &SenderInfo::new(), Tally::default())
            .unwrap()
            .unwrap();

        // Drain the two accept-time frames the peer wrote to `client`.
        base::read_frame(&mut client).unwrap();
        base::read_frame(&mut client).unwrap();

        base::write_frame(
            &mut client,
            FrameType::Metadata,
            0,
            &[],
            metadata::SUBSCRIBE_VIDEO.as_bytes(),
        )
        .unwrap();
        drop(client);

        session.run_reader_loop();
        assert!(session.is_subscribed_video());
    }
}
