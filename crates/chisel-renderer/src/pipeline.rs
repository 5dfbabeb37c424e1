//! Render Pipeline
//!
//! Fixed-function state for each draw pass.

/// Draw passes of a frame, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    Opaque,
    Preview,
    Grid,
    Wireframe,
    Transparent,
}

/// Pipeline state
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    /// Blend state
    pub blend: BlendState,
    /// Depth state
    pub depth: DepthState,
    /// Rasterizer state
    pub rasterizer: RasterizerState,
}

impl PipelineState {
    /// Opaque geometry: depth tested, no blending, no culling
    pub fn opaque() -> Self {
        Self {
            blend: BlendState::Opaque,
            depth: DepthState::default(),
            rasterizer: RasterizerState {
                cull_mode: CullMode::None,
                ..RasterizerState::default()
            },
        }
    }

    /// Wireframe overlay drawn on top of shaded geometry
    pub fn wireframe() -> Self {
        Self {
            blend: BlendState::AlphaBlend,
            depth: DepthState {
                test: true,
                write: false,
                compare: CompareFunction::LessEqual,
            },
            rasterizer: RasterizerState {
                cull_mode: CullMode::None,
                fill_mode: FillMode::Wireframe,
                ..RasterizerState::default()
            },
        }
    }

    /// One half of the two-sided transparent submission
    pub fn transparent(cull_mode: CullMode) -> Self {
        Self {
            blend: BlendState::AlphaBlend,
            depth: DepthState {
                test: true,
                write: false,
                compare: CompareFunction::Less,
            },
            rasterizer: RasterizerState {
                cull_mode,
                ..RasterizerState::default()
            },
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            blend: BlendState::default(),
            depth: DepthState::default(),
            rasterizer: RasterizerState::default(),
        }
    }
}

/// Blend state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendState {
    #[default]
    Opaque,
    AlphaBlend,
}

/// Depth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub compare: CompareFunction,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: true,
            write: true,
            compare: CompareFunction::Less,
        }
    }
}

/// Compare function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareFunction {
    #[default]
    Less,
    LessEqual,
}

/// Rasterizer state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub fill_mode: FillMode,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            fill_mode: FillMode::Solid,
        }
    }
}

/// Cull mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

/// Fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_state_default() {
        let state = PipelineState::default();
        assert_eq!(state.blend, BlendState::Opaque);
        assert!(state.depth.test);
    }

    #[test]
    fn test_opaque_disables_culling() {
        let state = PipelineState::opaque();
        assert_eq!(state.rasterizer.cull_mode, CullMode::None);
        assert_eq!(state.blend, BlendState::Opaque);
    }

    #[test]
    fn test_transparent_blends_without_depth_write() {
        let state = PipelineState::transparent(CullMode::Front);
        assert_eq!(state.blend, BlendState::AlphaBlend);
        assert!(!state.depth.write);
        assert_eq!(state.rasterizer.cull_mode, CullMode::Front);
    }
}
