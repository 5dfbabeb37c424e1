//! Frame Renderer
//!
//! Executes the ordered draw pipeline for one frame:
//! clear, opaque meshes, preview and grid, wireframe overlays, transparent
//! meshes, then the tool's post-render hook.
//!
//! Transparent meshes are submitted twice, front faces culled first and back
//! faces second. This approximates two-sided blending without sorting
//! triangles by depth; overlapping transparent meshes can still blend in the
//! wrong order.

use chisel_core::{Aabb, Drawable, Mesh};
use smallvec::SmallVec;

use crate::camera::Camera;
use crate::context::{DrawCall, GraphicsContext};
use crate::pipeline::{CullMode, DrawPass, PipelineState};
use crate::{FrameOutcome, RendererError, RendererResult, RendererStats};

/// Everything a frame reads from the scene
pub struct FrameScene<'a> {
    /// Registered meshes in insertion order
    pub meshes: &'a mut [Mesh],
    /// Transient mesh shown during interactive creation
    pub preview: Option<&'a mut Mesh>,
    /// Ground grid
    pub grid: Option<&'a mut Mesh>,
    /// Scene bounds, computed before the camera is consulted
    pub bounds: Aabb,
    /// Framebuffer clear color
    pub clear_color: [f32; 4],
}

/// Indices of `meshes` with every opaque mesh before every transparent one
///
/// Relative order inside each group follows the slice order.
pub fn partition_draw_order(meshes: &[Mesh]) -> SmallVec<[usize; 32]> {
    let mut order: SmallVec<[usize; 32]> = (0..meshes.len()).collect();
    order.sort_by_key(|&index| meshes[index].is_transparent());
    order
}

/// Draws frames through an optional graphics context
///
/// Without a context every frame is skipped silently.
pub struct FrameRenderer {
    context: Option<Box<dyn GraphicsContext>>,
    state: Option<PipelineState>,
    stats: RendererStats,
    frame_number: u64,
}

impl FrameRenderer {
    /// Create a renderer; a missing context is reported once here
    pub fn new(context: Option<Box<dyn GraphicsContext>>) -> Self {
        if context.is_none() {
            log::warn!("no graphics context available, rendering is disabled");
        }
        Self {
            context,
            state: None,
            stats: RendererStats::default(),
            frame_number: 0,
        }
    }

    /// Whether draws reach a graphics context
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// The graphics context
    pub fn context_mut(&mut self) -> RendererResult<&mut (dyn GraphicsContext + 'static)> {
        self.context
            .as_deref_mut()
            .ok_or(RendererError::ContextUnavailable)
    }

    /// Statistics of the last rendered frame
    pub fn stats(&self) -> &RendererStats {
        &self.stats
    }

    /// Frames rendered so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Resize the drawable area
    pub fn set_viewport(&mut self, width: u32, height: u32) -> RendererResult<()> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidViewport { width, height });
        }
        if let Some(context) = self.context.as_deref_mut() {
            context.viewport(width, height);
        }
        Ok(())
    }

    /// Render one frame
    ///
    /// `post_render` runs after every pass with the context, so tools can add
    /// overlays outside the opaque/transparent ordering.
    pub fn render(
        &mut self,
        camera: &mut dyn Camera,
        scene: FrameScene<'_>,
        post_render: impl FnOnce(&mut dyn GraphicsContext),
    ) -> FrameOutcome {
        let Some(context) = self.context.as_deref_mut() else {
            return FrameOutcome::Skipped;
        };

        self.frame_number += 1;
        // Hooks may have touched the context since the last frame.
        self.state = None;
        let _span = tracing::debug_span!("frame", number = self.frame_number).entered();
        let mut stats = RendererStats {
            frame_number: self.frame_number,
            ..RendererStats::default()
        };

        let FrameScene {
            meshes,
            mut preview,
            mut grid,
            bounds,
            clear_color,
        } = scene;

        // Depth range first, then camera-dependent matrices.
        if !meshes.is_empty() && !bounds.is_empty() {
            camera.optimize_near_far(&bounds);
        }
        let view = camera.view();
        let projection = camera.projection();
        for mesh in meshes.iter_mut() {
            mesh.update_matrices(view, projection);
        }
        if let Some(preview) = preview.as_deref_mut() {
            preview.update_matrices(view, projection);
        }
        if let Some(grid) = grid.as_deref_mut() {
            grid.update_matrices(view, projection);
        }

        let order = partition_draw_order(meshes);
        let opaque_count = order
            .iter()
            .take_while(|&&index| !meshes[index].is_transparent())
            .count();
        let (opaque, transparent) = order.split_at(opaque_count);

        context.clear(clear_color, 1.0);

        let mut pass = Pass {
            context,
            state: &mut self.state,
            stats: &mut stats,
        };

        pass.apply(PipelineState::opaque());
        for &index in opaque {
            pass.draw_mesh(&meshes[index], Some(meshes[index].id()), DrawPass::Opaque);
        }
        if let Some(preview) = preview.as_deref() {
            pass.draw_mesh(preview, None, DrawPass::Preview);
        }
        if let Some(grid) = grid.as_deref() {
            pass.draw_mesh(grid, None, DrawPass::Grid);
        }

        if meshes.iter().any(|mesh| mesh.shows_wireframe() && mesh.is_visible()) {
            pass.apply(PipelineState::wireframe());
            for &index in order.iter() {
                if meshes[index].shows_wireframe() {
                    pass.draw_mesh(&meshes[index], Some(meshes[index].id()), DrawPass::Wireframe);
                }
            }
        }

        for &index in transparent {
            let mesh = &meshes[index];
            if !mesh.is_visible() {
                continue;
            }
            for cull in [CullMode::Front, CullMode::Back] {
                pass.apply(PipelineState::transparent(cull));
                pass.draw_mesh(mesh, Some(mesh.id()), DrawPass::Transparent);
            }
        }
        pass.apply(PipelineState::opaque());

        post_render(&mut *pass.context);

        tracing::debug!(
            draw_calls = stats.draw_calls,
            triangles = stats.triangles,
            "frame submitted"
        );
        self.stats = stats.clone();
        FrameOutcome::Rendered(stats)
    }
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("has_context", &self.has_context())
            .field("frame_number", &self.frame_number)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Per-frame submission helper that only emits state toggles that change
struct Pass<'a> {
    context: &'a mut dyn GraphicsContext,
    state: &'a mut Option<PipelineState>,
    stats: &'a mut RendererStats,
}

impl Pass<'_> {
    fn apply(&mut self, next: PipelineState) {
        let current = self.state.as_ref();
        if current.map(|s| s.depth.test) != Some(next.depth.test) {
            self.context.set_depth_test(next.depth.test);
        }
        if current.map(|s| s.blend) != Some(next.blend) {
            self.context.set_blend(next.blend);
        }
        if current.map(|s| s.rasterizer.cull_mode) != Some(next.rasterizer.cull_mode) {
            self.context.set_cull(next.rasterizer.cull_mode);
        }
        *self.state = Some(next);
    }

    fn draw_mesh(&mut self, mesh: &Mesh, id: Option<chisel_core::MeshId>, pass: DrawPass) {
        if !mesh.is_visible() {
            return;
        }
        let Some(state) = self.state.clone() else {
            return;
        };
        let call = DrawCall {
            mesh: id,
            pass,
            state,
            triangles: mesh.geometry().triangle_count(),
            mvp: mesh.mvp(),
        };
        self.context.draw(&call);
        self.stats.draw_calls += 1;
        self.stats.triangles += call.triangles;
    }
}
