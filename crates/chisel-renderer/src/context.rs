//! Graphics Context
//!
//! The capability set the frame renderer draws through, plus a recording
//! implementation for headless sessions.

use std::cell::RefCell;
use std::rc::Rc;

use chisel_core::MeshId;
use glam::Mat4;

use crate::pipeline::{BlendState, CullMode, DrawPass, PipelineState};

/// A single draw submission
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Registered mesh, `None` for the preview mesh and the grid
    pub mesh: Option<MeshId>,
    /// Pass the draw belongs to
    pub pass: DrawPass,
    /// Full pipeline state in effect
    pub state: PipelineState,
    /// Triangles submitted
    pub triangles: usize,
    /// Model-view-projection matrix
    pub mvp: Mat4,
}

/// Abstract graphics device: clears, state toggles, draws and viewport
pub trait GraphicsContext {
    fn clear(&mut self, color: [f32; 4], depth: f32);
    fn viewport(&mut self, width: u32, height: u32);
    fn set_depth_test(&mut self, enabled: bool);
    fn set_blend(&mut self, blend: BlendState);
    fn set_cull(&mut self, cull: CullMode);
    fn draw(&mut self, call: &DrawCall);
}

/// Command captured by [`RecordingContext`]
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCommand {
    Clear { color: [f32; 4], depth: f32 },
    Viewport { width: u32, height: u32 },
    SetDepthTest(bool),
    SetBlend(BlendState),
    SetCull(CullMode),
    Draw(DrawCall),
}

/// Context that records every command instead of touching a GPU
///
/// Clones share the same log, so a handle kept outside the renderer observes
/// what the renderer submitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    commands: Rc<RefCell<Vec<GraphicsCommand>>>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded commands
    pub fn commands(&self) -> Vec<GraphicsCommand> {
        self.commands.borrow().clone()
    }

    /// Recorded draw calls only
    pub fn draws(&self) -> Vec<DrawCall> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                GraphicsCommand::Draw(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        self.commands.borrow_mut().clear();
    }

    fn push(&self, command: GraphicsCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl GraphicsContext for RecordingContext {
    fn clear(&mut self, color: [f32; 4], depth: f32) {
        self.push(GraphicsCommand::Clear { color, depth });
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.push(GraphicsCommand::Viewport { width, height });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.push(GraphicsCommand::SetDepthTest(enabled));
    }

    fn set_blend(&mut self, blend: BlendState) {
        self.push(GraphicsCommand::SetBlend(blend));
    }

    fn set_cull(&mut self, cull: CullMode) {
        self.push(GraphicsCommand::SetCull(cull));
    }

    fn draw(&mut self, call: &DrawCall) {
        self.push(GraphicsCommand::Draw(call.clone()));
    }
}
