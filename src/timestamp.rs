//! Monotonic 100-nanosecond tick counter (§3, §9: "100-nanosecond ticks are
//! a raw counter with no defined epoch"). Used to stamp outgoing video and
//! audio frames; never interpreted as wall-clock time.

use std::time::Instant;

pub(crate) struct Clock100Ns {
    start: Instant,
}

impl Clock100Ns {
    pub(crate) fn new() -> Self {
        Clock100Ns { start: Instant::now() }
    }

    pub(crate) fn now(&self) -> i64 {
        (self.start.elapsed().as_nanos() / 100) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonically_non_decreasing() {
        let clock = Clock100Ns::new();
        let a = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = clock.now();
        assert!(b >= a);
    }
}
