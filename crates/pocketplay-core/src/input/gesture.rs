//! Double-tap recognition on a single button.

/// Default maximum gap between the two taps.
pub const DOUBLE_TAP_MS: u64 = 400;

/// Remembers the last qualifying tap and reports when a second one follows
/// within the threshold. A recognized pair clears the candidate, so a third
/// tap starts a new pair instead of completing another one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DoubleTap {
    threshold_ms: u64,
    candidate_ms: Option<u64>,
}

impl Default for DoubleTap {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_MS)
    }
}

impl DoubleTap {
    pub const fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            candidate_ms: None,
        }
    }

    pub const fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    pub const fn candidate_ms(&self) -> Option<u64> {
        self.candidate_ms
    }

    /// Feeds one tap at `now_ms`. Returns `true` when it completes a double tap.
    pub fn tap(&mut self, now_ms: u64) -> bool {
        match self.candidate_ms {
            Some(first) if now_ms.saturating_sub(first) <= self.threshold_ms => {
                self.candidate_ms = None;
                true
            }
            _ => {
                self.candidate_ms = Some(now_ms);
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.candidate_ms = None;
    }
}
