//! # Chisel Editor
//!
//! Scene orchestration for the Chisel sculpting application.
//!
//! ## Features
//! - Mesh registry with identity lookup and insertion-ordered iteration
//! - Selection with a primary mesh and multi-select toggling
//! - Undo, GUI and sculpt-tool collaborator contracts
//! - The [`Scene`] orchestrator tying meshes, camera and renderer together

pub mod collaborators;
pub mod registry;
pub mod scene;
pub mod selection;

pub use collaborators::{
    Gui, IdleTool, NullGui, NullUndo, RecordingGui, SculptTool, UndoEntry, UndoJournal, UndoLog,
};
pub use registry::{MeshRegistry, RemovedMesh};
pub use scene::{Scene, SceneCollaborators};
pub use selection::Selection;

use chisel_core::{MeshError, MeshId};
use chisel_renderer::RendererError;
use thiserror::Error;

/// Scene orchestration errors
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),

    #[error("Mesh {0} is already registered")]
    DuplicateMesh(MeshId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
