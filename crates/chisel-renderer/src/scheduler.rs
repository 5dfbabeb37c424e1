//! Render Scheduler
//!
//! Coalesces redraw requests into at most one frame per display refresh.
//!
//! The pending flag is cleared when a frame *starts*, so a request made while
//! that frame executes (for example from a post-render hook) arms exactly one
//! more frame. Armed frames are never cancelled.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Result of a redraw request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A frame callback was armed by this request
    Scheduled,
    /// A frame was already pending; nothing new was armed
    AlreadyScheduled,
}

/// Platform hook that arranges one callback on the next display refresh
///
/// Any closure works, e.g. one calling a window's `request_redraw`.
pub trait FrameTicker: Send + Sync {
    fn arm(&self);
}

impl<F: Fn() + Send + Sync> FrameTicker for F {
    fn arm(&self) {
        self()
    }
}

/// Ticker for manually pumped sessions; counts how often it was armed
#[derive(Debug, Default)]
pub struct CountingTicker {
    armed: AtomicUsize,
}

impl CountingTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frame callbacks armed so far
    pub fn armed(&self) -> usize {
        self.armed.load(Ordering::Acquire)
    }
}

impl FrameTicker for CountingTicker {
    fn arm(&self) {
        self.armed.fetch_add(1, Ordering::AcqRel);
    }
}

/// Cloneable request side of the scheduler
///
/// Safe to hand to loaders on other threads: completion of a background load
/// only needs to call [`RedrawHandle::request_redraw`].
#[derive(Clone)]
pub struct RedrawHandle {
    pending: Arc<AtomicBool>,
    ticker: Arc<dyn FrameTicker>,
}

impl RedrawHandle {
    /// Request a frame; idempotent until the pending frame starts
    pub fn request_redraw(&self) -> ScheduleOutcome {
        if self.pending.swap(true, Ordering::AcqRel) {
            ScheduleOutcome::AlreadyScheduled
        } else {
            self.ticker.arm();
            ScheduleOutcome::Scheduled
        }
    }

    /// Whether a frame is armed and has not started yet
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl fmt::Debug for RedrawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedrawHandle")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

/// Frame-coalescing scheduler
#[derive(Debug)]
pub struct RenderScheduler {
    handle: RedrawHandle,
    frames_started: u64,
}

impl RenderScheduler {
    pub fn new(ticker: Arc<dyn FrameTicker>) -> Self {
        Self {
            handle: RedrawHandle {
                pending: Arc::new(AtomicBool::new(false)),
                ticker,
            },
            frames_started: 0,
        }
    }

    /// Request a frame
    pub fn request_redraw(&self) -> ScheduleOutcome {
        self.handle.request_redraw()
    }

    /// A handle sharing this scheduler's pending flag
    pub fn handle(&self) -> RedrawHandle {
        self.handle.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_pending()
    }

    /// Called on a frame tick. Clears the pending flag and reports whether a
    /// frame should execute now.
    pub fn begin_frame(&mut self) -> bool {
        let pending = self.handle.pending.swap(false, Ordering::AcqRel);
        if pending {
            self.frames_started += 1;
        }
        pending
    }

    /// Frames started since creation
    pub fn frames_started(&self) -> u64 {
        self.frames_started
    }
}
