//! Progress reporting types for long-running operations.
//!
//! Processing an archive reports push-based progress through a
//! [`ProgressCallback`]:
//! - once per source record during stitching (emitted and absorbed alike)
//! - once per completed file during transcription (from worker threads)
//! - once per message during the reply rewrite
//!
//! # Example
//!
//! ```rust
//! use chatstitch::progress::{Progress, ProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("{}: {:.1}%", progress.stage, pct);
//!     }
//! });
//!
//! for i in 0..10usize {
//!     callback(Progress::new(Stage::Stitching, i + 1).with_total(10));
//! }
//! ```

use std::sync::Arc;

/// Pipeline stage a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Stitching,
    Transcribing,
    Replies,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Stitching => write!(f, "Stitching messages"),
            Stage::Transcribing => write!(f, "Transcribing media"),
            Stage::Replies => write!(f, "Fixing replies"),
        }
    }
}

/// Progress information for one stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    /// Stage being reported.
    pub stage: Stage,

    /// Number of items processed so far.
    pub items_processed: usize,

    /// Total items to process, if known.
    pub total_items: Option<usize>,
}

impl Progress {
    /// Creates a new progress instance.
    pub fn new(stage: Stage, items_processed: usize) -> Self {
        Self {
            stage,
            items_processed,
            total_items: None,
        }
    }

    /// Creates a progress instance with total items.
    #[must_use]
    pub fn with_total(mut self, total_items: usize) -> Self {
        self.total_items = Some(total_items);
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// Returns `None` if the total is not known.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatstitch::progress::{Progress, Stage};
    ///
    /// let progress = Progress::new(Stage::Stitching, 50).with_total(100);
    /// assert_eq!(progress.percentage(), Some(50.0));
    ///
    /// let unknown = Progress::new(Stage::Stitching, 50);
    /// assert_eq!(unknown.percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_items.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.items_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether the stage is complete.
    pub fn is_complete(&self) -> bool {
        self.total_items
            .map(|total| self.items_processed >= total)
            .unwrap_or(false)
    }
}

/// Callback type for receiving progress updates.
///
/// Must be thread-safe: transcription workers call it from their own threads.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
///
/// Prints on completion of each stage and every 1000 items in between.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress| {
        if progress.is_complete() || progress.items_processed % 1000 == 0 {
            if let Some(pct) = progress.percentage() {
                eprintln!("{}: {:.1}%", progress.stage, pct);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = Progress::new(Stage::Stitching, 500).with_total(1000);
        assert_eq!(progress.percentage(), Some(50.0));
    }

    #[test]
    fn test_progress_percentage_zero_total() {
        let progress = Progress::new(Stage::Replies, 0).with_total(0);
        assert_eq!(progress.percentage(), Some(100.0));
        assert!(progress.is_complete());
    }

    #[test]
    fn test_progress_is_complete() {
        assert!(Progress::new(Stage::Transcribing, 3).with_total(3).is_complete());
        assert!(!Progress::new(Stage::Transcribing, 2).with_total(3).is_complete());
        assert!(!Progress::new(Stage::Transcribing, 2).is_complete());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Stitching.to_string(), "Stitching messages");
        assert_eq!(Stage::Replies.to_string(), "Fixing replies");
    }

    #[test]
    fn test_no_progress_callback() {
        let callback = no_progress();
        callback(Progress::default());
    }

    #[test]
    fn test_progress_callback_type() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let callback: ProgressCallback = Arc::new(move |progress| {
            counter_clone.store(progress.items_processed, Ordering::SeqCst);
        });

        callback(Progress::new(Stage::Stitching, 42));
        assert_eq!(counter.load(Ordering::SeqCst), 42);
    }
}
