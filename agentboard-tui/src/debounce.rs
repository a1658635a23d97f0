//! Trailing-edge debouncer.
//!
//! Each `trigger` replaces any pending value and restarts the delay; `poll`
//! hands out the latest value once the delay has elapsed without a newer
//! trigger. Time is passed in so the event loop and tests share one clock.

use std::time::{Duration, Instant};

/// Resize events settle after this long.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `value`, cancelling anything still pending.
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// The pending value, once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay() {
        let start = Instant::now();
        let mut d = Debouncer::new(RESIZE_DEBOUNCE);
        d.trigger((80, 24), start);
        assert_eq!(d.poll(start + Duration::from_millis(50)), None);
        assert_eq!(d.poll(start + Duration::from_millis(100)), Some((80, 24)));
        assert!(!d.is_pending());
        assert_eq!(d.poll(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn newer_trigger_supersedes() {
        let start = Instant::now();
        let mut d = Debouncer::new(RESIZE_DEBOUNCE);
        d.trigger(1, start);
        d.trigger(2, start + Duration::from_millis(80));
        // Original deadline passed but it was superseded.
        assert_eq!(d.poll(start + Duration::from_millis(120)), None);
        assert_eq!(d.poll(start + Duration::from_millis(180)), Some(2));
    }

    #[test]
    fn cancel_drops_pending() {
        let start = Instant::now();
        let mut d = Debouncer::new(RESIZE_DEBOUNCE);
        d.trigger(1, start);
        d.cancel();
        assert_eq!(d.poll(start + Duration::from_secs(1)), None);
    }
}
