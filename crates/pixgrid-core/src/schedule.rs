#![forbid(unsafe_code)]

//! Host-agnostic scheduling primitives.
//!
//! The interaction controller never calls a runtime's timer or
//! animation-frame API directly. Instead it keeps its pending work in these
//! small state holders and tells the host (through commands) when a frame or
//! timer callback is needed. The host calls back in when it fires.
//!
//! - [`FrameSlot`]: "next frame" coalescing, latest sample wins.
//! - [`DelayedCallback`]: one-shot debounce timer, re-arming replaces.
//! - [`Cooldown`]: at most one firing per window.
//!
//! # Usage
//!
//! ```
//! use pixgrid_core::schedule::FrameSlot;
//!
//! let mut slot = FrameSlot::new();
//! assert!(slot.submit(1));  // first sample: host must request a frame
//! assert!(!slot.submit(2)); // frame already requested, sample replaced
//! assert_eq!(slot.take(), Some(2));
//! assert_eq!(slot.take(), None);
//! ```

use web_time::{Duration, Instant};

/// Latest-wins slot drained once per animation frame.
///
/// Intermediate samples submitted within one frame are dropped, not queued.
#[derive(Debug, Clone)]
pub struct FrameSlot<T> {
    pending: Option<T>,
    requested: bool,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self {
            pending: None,
            requested: false,
        }
    }
}

impl<T> FrameSlot<T> {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a sample for the next frame.
    ///
    /// Returns `true` if no frame was outstanding, meaning the caller must
    /// ask the host for one.
    pub fn submit(&mut self, sample: T) -> bool {
        self.pending = Some(sample);
        let needs_request = !self.requested;
        self.requested = true;
        needs_request
    }

    /// The frame fired: take the latest sample.
    pub fn take(&mut self) -> Option<T> {
        self.requested = false;
        self.pending.take()
    }

    /// Drop any pending sample.
    ///
    /// Returns `true` if a frame request was outstanding and should be
    /// cancelled with the host.
    pub fn cancel(&mut self) -> bool {
        self.pending = None;
        std::mem::replace(&mut self.requested, false)
    }

    /// Whether a frame request is outstanding.
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested
    }
}

/// One-shot delayed callback carrying a value.
///
/// Arming while already armed replaces both the value and the deadline.
#[derive(Debug, Clone)]
pub struct DelayedCallback<T> {
    delay: Duration,
    armed: Option<(T, Instant)>,
}

impl<T> DelayedCallback<T> {
    /// Create a disarmed callback with the given delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, armed: None }
    }

    /// (Re)arm with `value`, firing `delay` after `now`.
    pub fn arm(&mut self, value: T, now: Instant) {
        self.armed = Some((value, now + self.delay));
    }

    /// Fire if the deadline has passed. Fires at most once per arming.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.armed {
            Some((_, deadline)) if now >= *deadline => self.armed.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Disarm. Returns `true` if the callback was armed.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Whether the callback is armed.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Deadline of the armed callback.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Configured delay.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Rate limiter allowing one firing per window.
#[derive(Debug, Clone)]
pub struct Cooldown {
    period: Duration,
    last: Option<Instant>,
}

impl Cooldown {
    /// Create a cooldown with the given window.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Fire if the window since the last firing has elapsed.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        let ready = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.period);
        if ready {
            self.last = Some(now);
        }
        ready
    }

    /// Forget the last firing.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_200: Duration = Duration::from_millis(200);

    #[test]
    fn frame_slot_requests_once_per_frame() {
        let mut slot = FrameSlot::new();
        assert!(slot.submit((1, 1)));
        assert!(!slot.submit((2, 2)));
        assert!(!slot.submit((3, 3)));
        assert!(slot.is_requested());

        assert_eq!(slot.take(), Some((3, 3)));
        assert!(!slot.is_requested());

        // Next frame needs a new request.
        assert!(slot.submit((4, 4)));
    }

    #[test]
    fn frame_slot_cancel_reports_outstanding_request() {
        let mut slot = FrameSlot::new();
        assert!(!slot.cancel());
        slot.submit(7);
        assert!(slot.cancel());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn delayed_callback_fires_after_deadline() {
        let t = Instant::now();
        let mut cb = DelayedCallback::new(MS_100);
        cb.arm("a", t);
        assert_eq!(cb.deadline(), Some(t + MS_100));
        assert_eq!(cb.poll(t + Duration::from_millis(50)), None);
        assert_eq!(cb.poll(t + MS_100), Some("a"));
        assert_eq!(cb.poll(t + MS_200), None);
        assert!(!cb.is_armed());
    }

    #[test]
    fn delayed_callback_rearm_replaces() {
        let t = Instant::now();
        let mut cb = DelayedCallback::new(MS_100);
        cb.arm(1, t);
        cb.arm(2, t + Duration::from_millis(80));

        // The first deadline passed but was replaced.
        assert_eq!(cb.poll(t + MS_100), None);
        assert_eq!(cb.poll(t + Duration::from_millis(180)), Some(2));
    }

    #[test]
    fn delayed_callback_cancel() {
        let t = Instant::now();
        let mut cb = DelayedCallback::new(MS_100);
        assert!(!cb.cancel());
        cb.arm((), t);
        assert!(cb.cancel());
        assert_eq!(cb.poll(t + MS_200), None);
    }

    #[test]
    fn cooldown_limits_rate() {
        let t = Instant::now();
        let mut cd = Cooldown::new(MS_200);
        assert!(cd.try_fire(t));
        assert!(!cd.try_fire(t + MS_100));
        assert!(cd.try_fire(t + MS_200));
        assert!(!cd.try_fire(t + Duration::from_millis(250)));

        cd.reset();
        assert!(cd.try_fire(t + Duration::from_millis(260)));
    }
}
