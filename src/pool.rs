//! Frame delivery buffers (§4.8): a small RGBA buffer pool plus one
//! atomic "pending" slot that decouples a receiver's decode thread from its
//! render thread.
//!
//! Steady state holds exactly three buffers: one owned by the producer
//! (decode thread), one sitting in the pending slot, and one owned by the
//! consumer (render thread) — the "triple-buffered" pool of §2/§4.7/§4.8.
//! No buffer is ever reachable from two of `{producer, pending, consumer}`
//! at once (§3 receiver frame pool invariant, §8 frame-pool safety).

use std::sync::Mutex;

/// An owned RGBA8 pixel buffer sized to one video frame.
#[derive(Debug)]
pub struct RgbaBuffer {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
}

impl RgbaBuffer {
    fn new(width: i32, height: i32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        RgbaBuffer {
            width,
            height,
            data: vec![0u8; len],
        }
    }

    fn matches(&self, width: i32, height: i32) -> bool {
        self.width == width && self.height == height
    }
}

/// A bounded pool of RGBA buffers plus the single pending-delivery slot
/// (§4.8).
pub struct FramePool {
    free: Mutex<Vec<RgbaBuffer>>,
    pending: Mutex<Option<RgbaBuffer>>,
    max_free: usize,
}

impl FramePool {
    /// Builds a pool that recycles at most `max_free` idle buffers; this
    /// core always uses 1 (one producer-side spare), keeping the invariant
    /// "producer owns 1, consumer owns 1, pending slot owns 1" exactly.
    pub fn new(max_free: usize) -> Self {
        FramePool {
            free: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            max_free,
        }
    }

    /// Returns a buffer matching `(width, height)`, recycling a free buffer
    /// of the wrong size rather than keeping it, or allocating a fresh one.
    pub fn acquire(&self, width: i32, height: i32) -> RgbaBuffer {
        let mut free = self.free.lock().unwrap();
        while let Some(buf) = free.pop() {
            if buf.matches(width, height) {
                return buf;
            }
            // Dimension change: drop the mismatched buffer and keep looking.
        }
        RgbaBuffer::new(width, height)
    }

    /// Publishes `buffer` as the newest decoded frame, returning whatever
    /// buffer was previously pending (if any) so the caller can return it to
    /// the pool via [`release`](Self::release).
    pub fn publish(&self, buffer: RgbaBuffer) -> Option<RgbaBuffer> {
        self.pending.lock().unwrap().replace(buffer)
    }

    /// Atomically takes the pending buffer, if any.
    pub fn take(&self) -> Option<RgbaBuffer> {
        self.pending.lock().unwrap().take()
    }

    /// Returns a buffer to the free list for reuse, dropping it if the pool
    /// is already at capacity.
    pub fn release(&self, buffer: RgbaBuffer) {
        let mut free = self.free.lock().unwrap();
        if free.len() < self.max_free {
            free.push(buffer);
        }
    }
}
