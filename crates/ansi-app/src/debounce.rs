use std::time::{Duration, Instant};

/// Coalescing window for viewport notifications (about one frame).
pub const FIT_DEBOUNCE: Duration = Duration::from_millis(16);

/// Trailing-edge debouncer with injected time.
///
/// Every [`notify`](Self::notify) pushes the deadline out by the window;
/// [`fire`](Self::fire) reports true once, after the last notification
/// has been quiet for a full window.
///
/// # Example
/// ```
/// use std::time::{Duration, Instant};
/// use ansi_app::debounce::Debouncer;
///
/// let t0 = Instant::now();
/// let mut d = Debouncer::new(Duration::from_millis(16));
/// d.notify(t0);
/// d.notify(t0 + Duration::from_millis(10));
/// assert!(!d.fire(t0 + Duration::from_millis(20)));
/// assert!(d.fire(t0 + Duration::from_millis(26)));
/// assert!(!d.fire(t0 + Duration::from_millis(40)));
/// ```
#[derive(Clone, Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Debouncer with the given window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a notification at `now`, superseding any pending one.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// True exactly once when the pending deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending notification, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// When the pending notification fires.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True if a notification is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(FIT_DEBOUNCE)
    }
}
