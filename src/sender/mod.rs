//! Sender server (§4.4): owns the listening socket, the session set, the
//! video encoder loop (§4.5), and the audio capture emitter (§4.6), tied
//! together by the single atomic `running` flag and RAII shutdown on drop
//! (§5 ADDED).

mod audio;
mod producer;

pub use audio::{AudioSource, CHANNELS, SAMPLES_PER_CHANNEL, SAMPLE_RATE};

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::codec;
use crate::discovery::Discovery;
use crate::error::{is_disconnect, Error, Result};
use crate::frame::{AudioHeader, VideoHeader};
use crate::session::Session;
use crate::settings;
use crate::timestamp::Clock100Ns;
use crate::types::{Codec, FrameRate, FrameType, Name, SenderInfo, Statistics, Tally};

use producer::FrameSlot;

const STATS_PERIOD: Duration = Duration::from_secs(3);
const IDLE_KEEPALIVE_PERIOD: Duration = Duration::from_secs(3);
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const ENCODER_THREADS: i32 = 4;
const SELF_PROBE_DELAY: Duration = Duration::from_millis(50);

/// Classification for [`SenderCallbacks::on_error`] (§7): the error kinds
/// that are surfaced to the embedding application rather than handled
/// silently (disconnection-class errors are not reported here — they just
/// evict the session).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    BindInUse,
    SendOther,
    CodecFailure,
}

type ConnectedCallback = dyn Fn(SocketAddr) + Send + Sync;
type DisconnectedCallback = dyn Fn() + Send + Sync;
type ErrorCallback = dyn Fn(ErrorKind, String) + Send + Sync;
type ListeningCallback = dyn Fn(u16) + Send + Sync;

/// Status callbacks an embedding application may supply (§6.3). Handlers are
/// invoked from whichever background thread observed the event.
#[derive(Default)]
pub struct SenderCallbacks {
    pub on_listening: Option<Box<ListeningCallback>>,
    pub on_client_connected: Option<Box<ConnectedCallback>>,
    pub on_client_disconnected: Option<Box<DisconnectedCallback>>,
    pub on_error: Option<Box<ErrorCallback>>,
}

fn report_error(callback: &Option<Arc<ErrorCallback>>, kind: ErrorKind, detail: String) {
    error!("{kind:?}: {detail}");
    if let Some(cb) = callback {
        cb(kind, detail);
    }
}

/// An OMT source: a listening socket fanning video/audio/metadata out to
/// subscribed clients (§4.4).
pub struct Sender {
    running: Arc<AtomicBool>,
    port: u16,
    sessions: Arc<RwLock<Vec<Arc<Session>>>>,
    frame_slot: Arc<FrameSlot>,
    audio_enabled: Arc<AtomicBool>,
    sender_info: Arc<Mutex<SenderInfo>>,
    tally: Arc<Mutex<Tally>>,
    video_stats: Arc<Mutex<Statistics>>,
    audio_stats: Arc<Mutex<Statistics>>,
    discovery: Option<Discovery>,
    accept_thread: Option<JoinHandle<()>>,
    probe_thread: Option<JoinHandle<()>>,
    encoder_thread: Option<JoinHandle<()>>,
    audio_thread: Option<JoinHandle<()>>,
}

impl Sender {
    /// Publishes a source named `source_name` on `port`: binds the listener,
    /// advertises over DNS-SD, and starts the accept, encoder, and (if
    /// `audio_source` is given) audio threads (§4.4/§6.3 `start_source`).
    ///
    /// `codec_availability_hint` is advisory only — the encoder loop always
    /// decides for itself via [`codec::available`] — and is logged so an
    /// operator can see whether the caller's expectation matched reality.
    pub fn start_source(
        port: u16,
        source_name: Name,
        codec_availability_hint: bool,
        audio_source: Option<Box<dyn AudioSource>>,
        callbacks: SenderCallbacks,
    ) -> Result<Self> {
        let (listener, bound_port) = bind_dynamic_port(port)?;

        info!(
            "OMT source '{source_name}' listening on port {bound_port} (codec available: {}, hint was: {codec_availability_hint})",
            codec::available()
        );

        let running = Arc::new(AtomicBool::new(true));
        let sessions: Arc<RwLock<Vec<Arc<Session>>>> = Arc::new(RwLock::new(Vec::new()));
        let frame_slot = Arc::new(FrameSlot::new());
        let audio_enabled = Arc::new(AtomicBool::new(audio_source.is_some()));
        let sender_info = Arc::new(Mutex::new(SenderInfo::new()));
        let tally = Arc::new(Mutex::new(Tally::default()));
        let video_stats = Arc::new(Mutex::new(Statistics::default()));
        let audio_stats = Arc::new(Mutex::new(Statistics::default()));

        let on_connected: Option<Arc<ConnectedCallback>> = callbacks.on_client_connected.map(Arc::from);
        let on_disconnected: Option<Arc<DisconnectedCallback>> =
            callbacks.on_client_disconnected.map(Arc::from);
        let on_error: Option<Arc<ErrorCallback>> = callbacks.on_error.map(Arc::from);

        if let Some(on_listening) = callbacks.on_listening {
            on_listening(bound_port);
        }

        let discovery = match Discovery::advertise(&source_name, bound_port) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("DNS-SD advertisement failed, continuing without discovery: {e}");
                None
            }
        };

        let probe_thread = Some(thread::spawn(move || {
            thread::sleep(SELF_PROBE_DELAY);
            let _ = TcpStream::connect(("127.0.0.1", bound_port));
        }));

        let accept_thread = Some(thread::spawn({
            let running = running.clone();
            let sessions = sessions.clone();
            let sender_info = sender_info.clone();
            let tally = tally.clone();
            let on_connected = on_connected.clone();
            let on_disconnected = on_disconnected.clone();
            move || {
                accept_loop(
                    listener,
                    running,
                    sessions,
                    sender_info,
                    tally,
                    on_connected,
                    on_disconnected,
                )
            }
        }));

        let encoder_thread = Some(thread::spawn({
            let running = running.clone();
            let frame_slot = frame_slot.clone();
            let sessions = sessions.clone();
            let video_stats = video_stats.clone();
            let on_error = on_error.clone();
            move || encoder_loop(running, frame_slot, sessions, video_stats, on_error)
        }));

        let audio_thread = audio_source.map(|source| {
            thread::spawn({
                let running = running.clone();
                let audio_enabled = audio_enabled.clone();
                let sessions = sessions.clone();
                let audio_stats = audio_stats.clone();
                let on_error = on_error.clone();
                move || audio_loop(running, audio_enabled, source, sessions, audio_stats, on_error)
            })
        });

        Ok(Sender {
            running,
            port: bound_port,
            sessions,
            frame_slot,
            audio_enabled,
            sender_info,
            tally,
            video_stats,
            audio_stats,
            discovery,
            accept_thread,
            probe_thread,
            encoder_thread,
            audio_thread,
        })
    }

    /// The bound listening port, which may differ from the requested port
    /// only if the OS assigned one (`port == 0` was requested).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Submits one NV12 camera frame to the video producer/encoder pipeline
    /// (§4.5 producer role). See [`producer::FrameSlot::submit_frame`] for
    /// the plane-layout contract.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_video_frame(
        &self,
        y_plane: &[u8],
        y_row_stride: usize,
        u_plane: &[u8],
        u_pixel_stride: usize,
        u_row_stride: usize,
        v_plane: &[u8],
        v_pixel_stride: usize,
        v_row_stride: usize,
        width: i32,
        height: i32,
    ) {
        self.frame_slot.submit_frame(
            y_plane,
            y_row_stride,
            u_plane,
            u_pixel_stride,
            u_row_stride,
            v_plane,
            v_pixel_stride,
            v_row_stride,
            width,
            height,
        );
    }

    /// Enables or disables the audio capture emitter (§6.3 `set_audio_enabled`).
    /// Has no effect if no `audio_source` was supplied to
    /// [`start_source`](Self::start_source).
    pub fn set_audio_enabled(&self, enabled: bool) {
        self.audio_enabled.store(enabled, Ordering::Release);
    }

    /// Sets the sender-identity metadata announced to newly accepted clients
    /// (§4.11). Takes effect for connections accepted after this call.
    pub fn set_sender_info(&self, info: SenderInfo) {
        *self.sender_info.lock().unwrap() = info;
    }

    /// Sets this sender's own tally state, broadcast as the idle-keepalive
    /// `<OMTTally …/>` frame (§4.4/§4.10).
    pub fn set_tally(&self, tally: Tally) {
        *self.tally.lock().unwrap() = tally;
    }

    /// Aggregates the most recently observed tally across connected sessions
    /// (§4.10): a receiver may echo tally state back upstream, and this
    /// reports it as "on" if any connected session reports it on.
    pub fn tally(&self) -> Tally {
        let sessions = self.sessions.read().unwrap();
        sessions.iter().fold(Tally::default(), |acc, session| {
            let t = session.tally();
            Tally { preview: acc.preview || t.preview, program: acc.program || t.program }
        })
    }

    /// Number of currently connected client sessions.
    pub fn connections(&self) -> usize {
        self.sessions.read().unwrap().iter().filter(|s| s.is_connected()).count()
    }

    /// Snapshot of video stream statistics (§4.9).
    pub fn video_statistics(&self) -> Statistics {
        self.video_stats.lock().unwrap().clone()
    }

    /// Snapshot of audio stream statistics (§4.9).
    pub fn audio_statistics(&self) -> Statistics {
        self.audio_stats.lock().unwrap().clone()
    }

    /// Stops every background thread and closes all sessions (§5 stop
    /// procedure, §6.3 `stop_source`). Idempotent; also run by `Drop`.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.frame_slot.stop();
        if let Some(t) = self.accept_thread.take() {
            let _ = t.join();
        }
        if let Some(t) = self.probe_thread.take() {
            let _ = t.join();
        }
        if let Some(t) = self.encoder_thread.take() {
            let _ = t.join();
        }
        if let Some(t) = self.audio_thread.take() {
            let _ = t.join();
        }
        self.sessions.write().unwrap().clear();
        self.discovery = None;
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Binds `port`, falling back to a scan of the configured dynamic port range
/// (§6.1: "port space 6400–6600 for dynamic selection by the sender") if the
/// requested port is already in use. Requesting port 0 lets the OS assign one
/// outside that range entirely, same as a direct `TcpListener::bind`.
fn bind_dynamic_port(port: u16) -> Result<(TcpListener, u16)> {
    match TcpListener::bind(("0.0.0.0", port)) {
        Ok(listener) => {
            let bound = listener.local_addr()?.port();
            Ok((listener, bound))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse && port != 0 => {
            warn!("port {port} already in use, scanning dynamic port range");
            let (start, end) = settings::get_network_port_range();
            for candidate in start..=end {
                let candidate = candidate as u16;
                if candidate == port {
                    continue;
                }
                if let Ok(listener) = TcpListener::bind(("0.0.0.0", candidate)) {
                    return Ok((listener, candidate));
                }
            }
            Err(Error::Io(e))
        }
        Err(e) => Err(Error::Io(e)),
    }
}

fn accept_loop(
    listener: TcpListener,
    running: Arc<AtomicBool>,
    sessions: Arc<RwLock<Vec<Arc<Session>>>>,
    sender_info: Arc<Mutex<SenderInfo>>,
    tally: Arc<Mutex<Tally>>,
    on_connected: Option<Arc<ConnectedCallback>>,
    on_disconnected: Option<Arc<DisconnectedCallback>>,
) {
    if let Err(e) = listener.set_nonblocking(true) {
        warn!("failed to set listener non-blocking, accept loop exiting: {e}");
        return;
    }

    while running.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, _peer)) => {
                let info_snapshot = sender_info.lock().unwrap().clone();
                let tally_snapshot = *tally.lock().unwrap();
                match Session::accept(stream, &info_snapshot, tally_snapshot) {
                    Ok(Some(session)) => {
                        let peer = session.peer_addr();
                        let session = Arc::new(session);
                        sessions.write().unwrap().push(session.clone());
                        info!("client connected from {peer}");
                        if let Some(cb) = &on_connected {
                            cb(peer);
                        }

                        let reader_session = session.clone();
                        let sessions_for_cleanup = sessions.clone();
                        let on_disconnected = on_disconnected.clone();
                        thread::spawn(move || {
                            reader_session.run_reader_loop();
                            sessions_for_cleanup
                                .write()
                                .unwrap()
                                .retain(|s| !Arc::ptr_eq(s, &reader_session));
                            if let Some(cb) = &on_disconnected {
                                cb();
                            }
                        });
                    }
                    Ok(None) => {
                        // Loopback self-connectivity probe; already closed.
                    }
                    Err(e) => warn!("failed to initialize accepted session: {e}"),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => {
                warn!("accept loop stopping after error: {e}");
                break;
            }
        }
    }
}

struct EncoderState {
    handle: Option<codec::Handle>,
}

fn encoder_loop(
    running: Arc<AtomicBool>,
    frame_slot: Arc<FrameSlot>,
    sessions: Arc<RwLock<Vec<Arc<Session>>>>,
    video_stats: Arc<Mutex<Statistics>>,
    on_error: Option<Arc<ErrorCallback>>,
) {
    let mut local_y: Vec<u8> = Vec::new();
    let mut local_uv: Vec<u8> = Vec::new();
    let mut compressed_out: Vec<u8> = Vec::new();
    let mut raw_payload: Vec<u8> = Vec::new();
    let mut encoder = EncoderState { handle: None };

    let mut last_stats_at = Instant::now();
    let mut last_idle_at = Instant::now();
    let mut period_frames = 0u64;
    let mut period_bytes = 0u64;
    let mut period_dropped = 0u64;
    let mut period_codec_millis = 0u64;
    let mut last_width = 0i32;
    let mut last_height = 0i32;
    let mut last_codec = Codec::NV12;

    while running.load(Ordering::Acquire) {
        let Some((width, height, timestamp)) = frame_slot.take(&mut local_y, &mut local_uv) else {
            break;
        };

        let encode_started = Instant::now();
        let (codec_kind, payload): (Codec, &[u8]) = if codec::available() {
            if encoder
                .handle
                .as_ref()
                .map(|h| h.width != width || h.height != height)
                .unwrap_or(true)
            {
                encoder.handle = codec::encoder(width, height, ENCODER_THREADS).ok();
            }
            match &encoder.handle {
                Some(handle) => {
                    let max_len = (width as usize) * (height as usize) * 2;
                    if compressed_out.len() < max_len {
                        compressed_out.resize(max_len, 0);
                    }
                    match codec::encode(handle, &local_y, width, &local_uv, width, &mut compressed_out) {
                        Ok(n) => (Codec::VMX1, &compressed_out[..n]),
                        Err(e) => {
                            warn!("codec failure, dropping frame: {e}");
                            period_dropped += 1;
                            report_error(&on_error, ErrorKind::CodecFailure, e.to_string());
                            continue;
                        }
                    }
                }
                None => {
                    raw_payload.clear();
                    raw_payload.extend_from_slice(&local_y);
                    raw_payload.extend_from_slice(&local_uv);
                    (Codec::NV12, raw_payload.as_slice())
                }
            }
        } else {
            raw_payload.clear();
            raw_payload.extend_from_slice(&local_y);
            raw_payload.extend_from_slice(&local_uv);
            (Codec::NV12, raw_payload.as_slice())
        };
        let encode_millis = encode_started.elapsed().as_millis() as u64;

        let header = VideoHeader::progressive(codec_kind, width, height, FrameRate::fps_30()).encode();
        last_width = width;
        last_height = height;
        last_codec = codec_kind;

        let targets: Vec<Arc<Session>> = sessions
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.is_connected() && s.is_subscribed_video())
            .cloned()
            .collect();

        let mut delivered = false;
        for session in &targets {
            match session.send_frame(FrameType::Video, timestamp, &header, payload) {
                Ok(()) => delivered = true,
                Err(Error::Io(ref e)) if is_disconnect(e) => {
                    // Session marks itself disconnected; the reader thread
                    // evicts it from the set.
                }
                Err(e) => report_error(&on_error, ErrorKind::SendOther, e.to_string()),
            }
        }

        if delivered {
            period_frames += 1;
            period_bytes += payload.len() as u64;
        }
        period_codec_millis += encode_millis;

        let now = Instant::now();
        if now.duration_since(last_idle_at) >= IDLE_KEEPALIVE_PERIOD {
            last_idle_at = now;
            let idle: Vec<Arc<Session>> = sessions
                .read()
                .unwrap()
                .iter()
                .filter(|s| s.is_connected() && !s.is_subscribed_video())
                .cloned()
                .collect();
            for session in idle {
                let _ = session.send_tally_refresh();
            }
        }

        if now.duration_since(last_stats_at) >= STATS_PERIOD {
            last_stats_at = now;
            let mut stats = video_stats.lock().unwrap();
            stats.record_period(period_frames, period_bytes, period_dropped, period_codec_millis);
            let fps = stats.fps(STATS_PERIOD.as_secs_f64());
            let avg_ms = stats.average_codec_millis();
            info!(
                "video: {fps:.1} fps, {last_width}x{last_height}, codec={last_codec:?}, avg encode {avg_ms:.1}ms, {} clients, {} frames total",
                sessions.read().unwrap().len(),
                stats.frames_total
            );
            period_frames = 0;
            period_bytes = 0;
            period_dropped = 0;
            period_codec_millis = 0;
        }
    }
}

fn audio_loop(
    running: Arc<AtomicBool>,
    audio_enabled: Arc<AtomicBool>,
    mut source: Box<dyn AudioSource>,
    sessions: Arc<RwLock<Vec<Arc<Session>>>>,
    audio_stats: Arc<Mutex<Statistics>>,
    on_error: Option<Arc<ErrorCallback>>,
) {
    let mut interleaved = vec![0f32; audio::SAMPLES_PER_CHANNEL * audio::CHANNELS];
    let mut left = vec![0f32; audio::SAMPLES_PER_CHANNEL];
    let mut right = vec![0f32; audio::SAMPLES_PER_CHANNEL];
    let mut payload: Vec<u8> = Vec::new();
    let header_bytes = AudioHeader::fpa1_stereo(audio::SAMPLE_RATE, audio::SAMPLES_PER_CHANNEL as i32).encode_vmix();
    let clock = Clock100Ns::new();

    let mut last_stats_at = Instant::now();
    let mut period_frames = 0u64;
    let mut period_bytes = 0u64;

    while running.load(Ordering::Acquire) {
        if !source.read_interleaved(&mut interleaved) {
            break;
        }
        if !audio_enabled.load(Ordering::Acquire) {
            continue;
        }

        audio::deinterleave_stereo(&interleaved, &mut left, &mut right);
        audio::write_planar_bytes(&left, &right, &mut payload);

        let targets: Vec<Arc<Session>> = sessions
            .read()
            .unwrap()
            .iter()
            .filter(|s| s.is_connected() && s.is_subscribed_audio())
            .cloned()
            .collect();

        let timestamp = clock.now();
        let mut delivered = false;
        for session in &targets {
            match session.send_frame(FrameType::Audio, timestamp, &header_bytes, &payload) {
                Ok(()) => delivered = true,
                Err(Error::Io(ref e)) if is_disconnect(e) => {}
                Err(e) => report_error(&on_error, ErrorKind::SendOther, e.to_string()),
            }
        }

        if delivered {
            period_frames += 1;
            period_bytes += payload.len() as u64;
        }

        let now = Instant::now();
        if now.duration_since(last_stats_at) >= STATS_PERIOD {
            last_stats_at = now;
            audio_stats.lock().unwrap().record_period(period_frames, period_bytes, 0, 0);
            period_frames = 0;
            period_bytes = 0;
        }
    }
}
