//! Receiver client (§4.7): connects to a source, sends the initial
//! subscription handshake, and runs a reader thread that demuxes video,
//! audio, and metadata frames, handing decoded video frames through the
//! triple-buffered [`crate::pool::FramePool`] to a separate render-consumer
//! thread (§4.8).

mod decode;

pub use decode::deplanarize;

use std::io::{BufWriter, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::codec;
use crate::error::{Error, Result};
use crate::frame::{base, metadata, AudioHeader, VideoHeader};
use crate::pool::{FramePool, RgbaBuffer};
use crate::types::{Codec, Statistics, Tally};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const RECV_BUFFER_BYTES: usize = 1024 * 1024;
const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(4);
const DECODER_THREADS: i32 = 2;
const STATS_PERIOD: Duration = Duration::from_secs(3);

type FrameCallback = dyn Fn(&RgbaBuffer) + Send + Sync;
type AudioCallback = dyn Fn(&AudioHeader, &[f32]) + Send + Sync;
type StatusCallback = dyn Fn(Tally) + Send + Sync;
type ErrorCallback = dyn Fn(String) + Send + Sync;

/// Callbacks an embedding application supplies to observe decoded media and
/// connection status (§6.3).
#[derive(Default)]
pub struct ReceiverCallbacks {
    pub on_frame: Option<Box<FrameCallback>>,
    pub on_audio: Option<Box<AudioCallback>>,
    pub on_status: Option<Box<StatusCallback>>,
    pub on_error: Option<Box<ErrorCallback>>,
}

/// A connection to one OMT source, decoding its video/audio into callbacks
/// (§4.7).
pub struct Receiver {
    running: Arc<AtomicBool>,
    shutdown_handle: TcpStream,
    output: Arc<Mutex<BufWriter<TcpStream>>>,
    video_stats: Arc<Mutex<Statistics>>,
    audio_stats: Arc<Mutex<Statistics>>,
    reader_thread: Option<JoinHandle<()>>,
    render_thread: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Connects to `host:port`, sends the four initial subscription frames
    /// (video, audio, metadata, default quality), and starts the reader and
    /// render threads (§4.7, §6.3 `start_receiver`).
    pub fn start_receiver(host: &str, port: u16, callbacks: ReceiverCallbacks) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::FramingInvalid { detail: format!("could not resolve {host}:{port}") })?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        let socket = socket2::Socket::from(stream.try_clone()?);
        socket.set_recv_buffer_size(RECV_BUFFER_BYTES)?;

        let shutdown_handle = stream.try_clone()?;
        let reader = stream.try_clone()?;
        let output = Arc::new(Mutex::new(BufWriter::new(stream)));

        send_initial_subscriptions(&output)?;
        info!("connected to OMT source at {host}:{port}");

        let running = Arc::new(AtomicBool::new(true));
        let pool = Arc::new(FramePool::new(1));
        let video_stats = Arc::new(Mutex::new(Statistics::default()));
        let audio_stats = Arc::new(Mutex::new(Statistics::default()));

        let on_audio = callbacks.on_audio.map(Arc::<AudioCallback>::from);
        let on_status = callbacks.on_status.map(Arc::<StatusCallback>::from);
        let on_error = callbacks.on_error.map(Arc::<ErrorCallback>::from);
        let on_frame = callbacks.on_frame.map(Arc::<FrameCallback>::from);

        let reader_thread = Some(thread::spawn({
            let running = running.clone();
            let pool = pool.clone();
            let video_stats = video_stats.clone();
            let audio_stats = audio_stats.clone();
            let on_audio = on_audio.clone();
            let on_status = on_status.clone();
            let on_error = on_error.clone();
            move || reader_loop(reader, running, pool, video_stats, audio_stats, on_audio, on_status, on_error)
        }));

        let render_thread = Some(thread::spawn({
            let running = running.clone();
            move || render_loop(running, pool, on_frame)
        }));

        Ok(Receiver {
            running,
            shutdown_handle,
            output,
            video_stats,
            audio_stats,
            reader_thread,
            render_thread,
        })
    }

    /// Snapshot of decoded video throughput (§4.9).
    pub fn video_statistics(&self) -> Statistics {
        self.video_stats.lock().unwrap().clone()
    }

    /// Snapshot of decoded audio throughput (§4.9).
    pub fn audio_statistics(&self) -> Statistics {
        self.audio_stats.lock().unwrap().clone()
    }

    /// Echoes a tally state upstream as a metadata frame, letting a source
    /// aggregate preview/program status across its receivers (§4.7/§4.10).
    pub fn send_tally(&self, tally: Tally) -> Result<()> {
        send_metadata(&self.output, &tally.to_xml())
    }

    /// Stops the reader and render threads and closes the connection.
    /// Idempotent; also run by `Drop`.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        let _ = self.shutdown_handle.shutdown(Shutdown::Both);
        if let Some(t) = self.reader_thread.take() {
            let _ = t.join();
        }
        if let Some(t) = self.render_thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn send_metadata(output: &Mutex<BufWriter<TcpStream>>, payload: &str) -> Result<()> {
    let mut output = output.lock().unwrap();
    base::write_frame(&mut *output, crate::types::FrameType::Metadata, 0, &[], payload.as_bytes())
        .and_then(|()| output.flush().map_err(Error::Io))
}

fn send_initial_subscriptions(output: &Mutex<BufWriter<TcpStream>>) -> Result<()> {
    send_metadata(output, metadata::SUBSCRIBE_VIDEO)?;
    send_metadata(output, metadata::SUBSCRIBE_AUDIO)?;
    send_metadata(output, metadata::SUBSCRIBE_METADATA)?;
    send_metadata(output, &metadata::settings_quality_xml("Default"))
}

struct DecoderState {
    handle: Option<codec::Handle>,
}

fn reader_loop(
    mut reader: TcpStream,
    running: Arc<AtomicBool>,
    pool: Arc<FramePool>,
    video_stats: Arc<Mutex<Statistics>>,
    audio_stats: Arc<Mutex<Statistics>>,
    on_audio: Option<Arc<AudioCallback>>,
    on_status: Option<Arc<StatusCallback>>,
    on_error: Option<Arc<ErrorCallback>>,
) {
    let mut decoder = DecoderState { handle: None };

    let mut last_stats_at = Instant::now();
    let mut video_period_frames = 0u64;
    let mut video_period_bytes = 0u64;
    let mut video_period_dropped = 0u64;
    let mut video_period_codec_millis = 0u64;
    let mut audio_period_frames = 0u64;
    let mut audio_period_bytes = 0u64;

    while running.load(Ordering::Acquire) {
        match base::read_frame(&mut reader) {
            Ok((crate::types::FrameType::Metadata, _ts, body)) => {
                let Ok(text) = std::str::from_utf8(&body) else { continue };
                let text = text.trim_end_matches('\0');
                if metadata::is_tally(text) {
                    if let Some(tally) = Tally::from_xml(text) {
                        if let Some(cb) = &on_status {
                            cb(tally);
                        }
                    }
                }
            }
            Ok((crate::types::FrameType::Video, _ts, body)) => {
                let outcome = dispatch_video(&body, &pool, &mut decoder, &on_error);
                if outcome.decoded {
                    video_period_frames += 1;
                    video_period_bytes += outcome.payload_len as u64;
                } else {
                    video_period_dropped += 1;
                }
                video_period_codec_millis += outcome.codec_millis;
            }
            Ok((crate::types::FrameType::Audio, _ts, body)) => {
                if let Some(payload_len) = dispatch_audio(&body, &on_audio) {
                    audio_period_frames += 1;
                    audio_period_bytes += payload_len as u64;
                }
            }
            Err(Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                debug!("receiver disconnected: {e}");
                if let Some(cb) = &on_error {
                    cb(e.to_string());
                }
                return;
            }
        }

        let now = Instant::now();
        if now.duration_since(last_stats_at) >= STATS_PERIOD {
            last_stats_at = now;
            video_stats.lock().unwrap().record_period(
                video_period_frames,
                video_period_bytes,
                video_period_dropped,
                video_period_codec_millis,
            );
            audio_stats.lock().unwrap().record_period(audio_period_frames, audio_period_bytes, 0, 0);
            video_period_frames = 0;
            video_period_bytes = 0;
            video_period_dropped = 0;
            video_period_codec_millis = 0;
            audio_period_frames = 0;
            audio_period_bytes = 0;
        }
    }
}

struct VideoDispatchOutcome {
    decoded: bool,
    payload_len: usize,
    codec_millis: u64,
}

fn dispatch_video(
    body: &[u8],
    pool: &FramePool,
    decoder: &mut DecoderState,
    on_error: &Option<Arc<ErrorCallback>>,
) -> VideoDispatchOutcome {
    let empty = VideoDispatchOutcome { decoded: false, payload_len: 0, codec_millis: 0 };

    let Some(header) = VideoHeader::decode(body) else {
        warn!("short video extended header, dropping frame");
        return empty;
    };
    if header.validate_dimensions().is_err() {
        warn!("video frame with out-of-range dimensions {}x{}, dropping", header.width, header.height);
        return empty;
    }
    let payload = &body[crate::frame::video::HEADER_LEN..];
    let payload_len = payload.len();
    let mut buffer = pool.acquire(header.width, header.height);

    let decode_started = Instant::now();
    let decoded = match header.codec {
        Codec::VMX1 => decode_vmx(header, payload, &mut buffer, decoder),
        Codec::NV12 => {
            let w = header.width as usize;
            let h = header.height as usize;
            if payload.len() < w * h + w * (h / 2) {
                Err("short NV12 payload".to_string())
            } else {
                let y = &payload[..w * h];
                let uv = &payload[w * h..];
                codec::nv12_to_rgba_with_colorspace(y, uv, &mut buffer.data, w, h, header.color_space);
                Ok(())
            }
        }
        other => Err(format!("unsupported video codec {other:?}")),
    };
    let codec_millis = decode_started.elapsed().as_millis() as u64;

    match decoded {
        Ok(()) => {
            if let Some(displaced) = pool.publish(buffer) {
                pool.release(displaced);
            }
            VideoDispatchOutcome { decoded: true, payload_len, codec_millis }
        }
        Err(detail) => {
            warn!("dropping {:?} video frame: {detail}", header.codec);
            if let Some(cb) = on_error {
                cb(detail);
            }
            pool.release(buffer);
            VideoDispatchOutcome { decoded: false, payload_len: 0, codec_millis }
        }
    }
}

fn decode_vmx(
    header: VideoHeader,
    payload: &[u8],
    buffer: &mut RgbaBuffer,
    decoder: &mut DecoderState,
) -> std::result::Result<(), String> {
    if !codec::available() {
        return Err("Cannot decode VMX1 (codec unavailable)".to_string());
    }
    if decoder
        .handle
        .as_ref()
        .map(|h| h.width != header.width || h.height != header.height)
        .unwrap_or(true)
    {
        decoder.handle = codec::decoder(header.width, header.height, DECODER_THREADS).ok();
    }
    let Some(handle) = &decoder.handle else {
        return Err("Cannot decode VMX1 (codec unavailable)".to_string());
    };
    codec::decode(handle, payload, &mut buffer.data).map_err(|e| format!("vmx decode failed: {e}"))
}

fn dispatch_audio(body: &[u8], on_audio: &Option<Arc<AudioCallback>>) -> Option<usize> {
    let Some(header) = AudioHeader::decode(body) else {
        warn!("short audio extended header, dropping frame");
        return None;
    };
    if header.validate().is_err() {
        warn!("audio header failed validation, dropping frame");
        return None;
    }
    let payload = &body[crate::frame::audio::HEADER_LEN..];
    match decode::deplanarize(&header, payload) {
        Some(samples) => {
            if let Some(cb) = on_audio {
                cb(&header, &samples);
            }
            Some(payload.len())
        }
        None => {
            warn!("unsupported audio sample format, dropping frame");
            None
        }
    }
}

fn render_loop(running: Arc<AtomicBool>, pool: Arc<FramePool>, on_frame: Option<Arc<FrameCallback>>) {
    while running.load(Ordering::Acquire) {
        if let Some(buffer) = pool.take() {
            if let Some(cb) = &on_frame {
                cb(&buffer);
            }
            pool.release(buffer);
        } else {
            thread::sleep(RENDER_POLL_INTERVAL);
        }
    }
}
