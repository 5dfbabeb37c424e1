//! # Chisel Core
//!
//! Geometry and scene data for the Chisel sculpting application.
//!
//! This crate provides the pieces the scene orchestrator is built from:
//! - **Math**: Axis-aligned bounds and the scene bounding-volume calculator
//! - **Mesh**: Stable mesh identities, display flags and world transforms
//! - **Multires**: The ladder of detail levels and the subdivision clamp
//! - **Subdivision**: Linear and smooth (Catmull-Clark) level generation
//! - **Primitives**: Cube, cylinder and ground grid builders

pub mod math;
pub mod mesh;
pub mod multires;
pub mod primitives;
pub mod subdivision;

pub use math::{Aabb, Drawable, bounding_volume, radius_from_bounds};
pub use mesh::{DisplayFlags, Face, Geometry, Mesh, MeshId};
pub use multires::{ClampOutcome, ClampParams, DetailLevel, MultiresMesh};
pub use subdivision::{CatmullClark, SubdivisionMode, Subdivider};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry and ladder errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Geometry has no vertices or no faces")]
    EmptyGeometry,

    #[error("Face {face} references vertex {index} but only {vertex_count} vertices exist")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Subdivision did not increase the face count ({faces} faces)")]
    SubdivisionStalled { faces: usize },

    #[error("Detail level {level} out of range ({count} levels)")]
    LevelOutOfRange { level: usize, count: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for geometry operations
pub type MeshResult<T> = Result<T, MeshError>;

/// Sculpting session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptConfig {
    /// Face count the subdivision clamp grows a new mesh to
    pub face_threshold: usize,
    /// Number of detail levels retained per mesh
    pub max_levels: usize,
    /// Framebuffer clear color (RGBA)
    pub clear_color: [f32; 4],
    /// Draw the ground grid
    pub show_grid: bool,
    /// Ground grid extent in world units
    pub grid_size: f32,
    /// Device pixel ratio applied to resize events
    pub pixel_ratio: f32,
    /// Diagonal length meshes are scaled to by normalize-and-center
    pub normalize_scale: f32,
}

impl SculptConfig {
    /// Check the configuration for values the orchestrator cannot work with
    pub fn validate(&self) -> MeshResult<()> {
        if self.face_threshold == 0 {
            return Err(MeshError::InvalidConfig("face_threshold must be positive".into()));
        }
        if self.max_levels == 0 {
            return Err(MeshError::InvalidConfig("max_levels must be at least 1".into()));
        }
        if !(self.pixel_ratio > 0.0) {
            return Err(MeshError::InvalidConfig(format!(
                "pixel_ratio must be positive, got {}",
                self.pixel_ratio
            )));
        }
        if !(self.grid_size > 0.0) {
            return Err(MeshError::InvalidConfig(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if !(self.normalize_scale > 0.0) {
            return Err(MeshError::InvalidConfig(format!(
                "normalize_scale must be positive, got {}",
                self.normalize_scale
            )));
        }
        Ok(())
    }
}

impl Default for SculptConfig {
    fn default() -> Self {
        Self {
            face_threshold: 50_000,
            max_levels: 4,
            clear_color: [0.13, 0.13, 0.15, 1.0],
            show_grid: true,
            grid_size: 20.0,
            pixel_ratio: 1.0,
            normalize_scale: 8.0,
        }
    }
}
