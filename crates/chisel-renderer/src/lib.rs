//! # Chisel Renderer
//!
//! Render scheduling and the multi-pass draw pipeline of the sculpting core.
//!
//! ## Features
//! - Frame-coalesced redraw scheduling (at most one frame per refresh)
//! - Ordered passes: clear, opaque, preview/grid, wireframe, transparent
//! - Abstract graphics context with a recording implementation for headless use
//! - Camera contract with a basic orbiting perspective camera

pub mod camera;
pub mod context;
pub mod frame;
pub mod pipeline;
pub mod scheduler;

pub use camera::{Camera, ViewportCamera};
pub use context::{DrawCall, GraphicsCommand, GraphicsContext, RecordingContext};
pub use frame::{FrameRenderer, FrameScene, partition_draw_order};
pub use pipeline::{BlendState, CullMode, DrawPass, FillMode, PipelineState};
pub use scheduler::{CountingTicker, FrameTicker, RedrawHandle, RenderScheduler, ScheduleOutcome};

use thiserror::Error;

/// Renderer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    #[error("No graphics context available")]
    ContextUnavailable,

    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },
}

/// Result type for renderer operations
pub type RendererResult<T> = Result<T, RendererError>;

/// Renderer statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Frame these statistics belong to
    pub frame_number: u64,
    /// Draw calls this frame
    pub draw_calls: u32,
    /// Triangles submitted
    pub triangles: usize,
}

/// What happened to a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Passes were submitted to the context
    Rendered(RendererStats),
    /// No context; nothing was drawn
    Skipped,
}

impl FrameOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, FrameOutcome::Rendered(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome() {
        assert!(FrameOutcome::Rendered(RendererStats::default()).is_rendered());
        assert!(!FrameOutcome::Skipped.is_rendered());
    }

    #[test]
    fn test_error_messages() {
        let err = RendererError::InvalidViewport { width: 0, height: 4 };
        assert_eq!(err.to_string(), "Invalid viewport size 0x4");
    }
}
