/// Debounced symbol-search buffer
///
/// Accumulates a query from raw key presses, independent of any focused
/// input. Every mutation re-arms a 10-second inactivity deadline; once it
/// lapses the whole buffer clears at once. The buffer only drives highlight
/// matching, never filtering or ordering.
use std::time::{Duration, Instant};

/// Inactivity window after which the buffer clears
pub const IDLE_CLEAR: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
pub struct SearchBuffer {
    buffer: String,
    deadline: Option<Instant>,
}

impl SearchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one character and re-arm the inactivity deadline
    ///
    /// The caller is responsible for feeding only plain printable key
    /// presses (single code point, no ctrl/alt/super modifier).
    pub fn push(&mut self, ch: char, now: Instant) {
        self.buffer.push(ch);
        self.arm(now);
    }

    /// Remove the trailing character; no-op on an empty buffer
    pub fn backspace(&mut self, now: Instant) {
        if self.buffer.pop().is_some() {
            self.arm(now);
        }
    }

    /// Clear the buffer if the inactivity deadline has lapsed
    ///
    /// Call this from the owner's poll loop; the clear is atomic, the buffer
    /// never shrinks gradually.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.buffer.clear();
                self.deadline = None;
            }
        }
    }

    /// Case-insensitive substring match; an empty buffer matches nothing
    pub fn matches(&self, symbol: &str) -> bool {
        !self.buffer.is_empty()
            && symbol
                .to_lowercase()
                .contains(&self.buffer.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn arm(&mut self, now: Instant) {
        // An empty buffer has nothing left to expire
        self.deadline = if self.buffer.is_empty() {
            None
        } else {
            Some(now + IDLE_CLEAR)
        };
    }
}
