//! Cooperative cancellation and progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag polled at the start of every event.
///
/// Clones share the same flag, so one can be handed to another thread and
/// cancelled from there.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Receives progress ticks.
pub trait ProgressMonitor {
    /// Called with the current progress value after each handled event.
    fn worked(&mut self, progress: u32);
}

/// The largest progress value before wrapping back to 1.
pub const PROGRESS_CEILING: u32 = 100;

/// Produces the wrapping progress sequence 1, 2, ..., 100, 1, 2, ...
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    current: u32,
}

impl ProgressTracker {
    /// Creates a tracker at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one step and returns the new value.
    pub fn advance(&mut self) -> u32 {
        self.current = if self.current >= PROGRESS_CEILING {
            1
        } else {
            self.current + 1
        };
        self.current
    }

    /// Returns the current value.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }
}

/// A monitor that remembers every tick, for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor {
    /// All reported values, in order.
    pub ticks: Vec<u32>,
}

impl ProgressMonitor for RecordingMonitor {
    fn worked(&mut self, progress: u32) {
        self.ticks.push(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_token_cancel_from_other_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap_or_default();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_progress_wraps_at_ceiling() {
        let mut tracker = ProgressTracker::new();
        let values: Vec<u32> = (0..102).map(|_| tracker.advance()).collect();
        assert_eq!(values[0], 1);
        assert_eq!(values[99], 100);
        assert_eq!(values[100], 1);
        assert_eq!(values[101], 2);
    }

    #[test]
    fn test_recording_monitor() {
        let mut monitor = RecordingMonitor::default();
        monitor.worked(3);
        monitor.worked(4);
        assert_eq!(monitor.ticks, vec![3, 4]);
    }
}
