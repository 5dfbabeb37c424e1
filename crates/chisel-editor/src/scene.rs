//! Scene Orchestrator
//!
//! Owns the mesh registry, the selection, the preview mesh and the ground
//! grid, and drives the camera, the renderer and the collaborators from one
//! synchronous API. Every mutation requests a redraw; requests coalesce until
//! the next frame tick.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chisel_core::{
    Aabb, CatmullClark, ClampOutcome, ClampParams, DisplayFlags, Mesh, MeshId, SculptConfig,
    Subdivider, SubdivisionMode, bounding_volume, primitives, radius_from_bounds,
};
use chisel_renderer::{
    Camera, CountingTicker, FrameOutcome, FrameRenderer, FrameScene, FrameTicker,
    GraphicsContext, RedrawHandle, RenderScheduler, RendererStats, ScheduleOutcome,
    ViewportCamera,
};
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use crate::collaborators::{Gui, IdleTool, NullGui, NullUndo, SculptTool, UndoLog};
use crate::registry::{MeshRegistry, RemovedMesh};
use crate::selection::Selection;
use crate::{SceneError, SceneResult};

const GRID_DIVISIONS: u32 = 20;
const CUBE_SCALE: f32 = 0.7;
const CYLINDER_SEGMENTS: u32 = 32;
/// Fraction of the fitted distance used when framing meshes
const FRAME_MARGIN: f32 = 0.8;

/// External collaborators driven by a [`Scene`]
pub struct SceneCollaborators {
    pub camera: Box<dyn Camera>,
    pub undo: Box<dyn UndoLog>,
    pub gui: Box<dyn Gui>,
    pub tool: Box<dyn SculptTool>,
    pub ticker: Arc<dyn FrameTicker>,
    pub subdivider: Box<dyn Subdivider>,
}

impl SceneCollaborators {
    pub fn with_camera(mut self, camera: impl Camera + 'static) -> Self {
        self.camera = Box::new(camera);
        self
    }

    pub fn with_undo(mut self, undo: impl UndoLog + 'static) -> Self {
        self.undo = Box::new(undo);
        self
    }

    pub fn with_gui(mut self, gui: impl Gui + 'static) -> Self {
        self.gui = Box::new(gui);
        self
    }

    pub fn with_tool(mut self, tool: impl SculptTool + 'static) -> Self {
        self.tool = Box::new(tool);
        self
    }

    pub fn with_ticker(mut self, ticker: Arc<dyn FrameTicker>) -> Self {
        self.ticker = ticker;
        self
    }

    pub fn with_subdivider(mut self, subdivider: impl Subdivider + 'static) -> Self {
        self.subdivider = Box::new(subdivider);
        self
    }
}

impl Default for SceneCollaborators {
    fn default() -> Self {
        Self {
            camera: Box::new(ViewportCamera::new()),
            undo: Box::new(NullUndo),
            gui: Box::new(NullGui),
            tool: Box::new(IdleTool),
            ticker: Arc::new(CountingTicker::new()),
            subdivider: Box::new(CatmullClark),
        }
    }
}

/// The scene orchestrator
pub struct Scene {
    config: SculptConfig,
    registry: MeshRegistry,
    selection: Selection,
    preview: Option<Mesh>,
    grid: Mesh,
    camera: Box<dyn Camera>,
    undo: Box<dyn UndoLog>,
    gui: Box<dyn Gui>,
    tool: Box<dyn SculptTool>,
    subdivider: Box<dyn Subdivider>,
    scheduler: RenderScheduler,
    renderer: FrameRenderer,
}

impl Scene {
    /// Create a scene; `None` for the context runs it headless
    pub fn new(
        config: SculptConfig,
        collaborators: SceneCollaborators,
        context: Option<Box<dyn GraphicsContext>>,
    ) -> SceneResult<Self> {
        config.validate()?;

        let SceneCollaborators {
            camera,
            undo,
            gui,
            tool,
            ticker,
            subdivider,
        } = collaborators;

        let mut grid = Mesh::from_geometry("grid", primitives::grid(config.grid_size, GRID_DIVISIONS));
        grid.set_flag(DisplayFlags::VISIBLE, config.show_grid);

        log::info!(
            "Scene created (face threshold {}, {} detail levels)",
            config.face_threshold,
            config.max_levels
        );

        Ok(Self {
            config,
            registry: MeshRegistry::new(),
            selection: Selection::new(),
            preview: None,
            grid,
            camera,
            undo,
            gui,
            tool,
            subdivider,
            scheduler: RenderScheduler::new(ticker),
            renderer: FrameRenderer::new(context),
        })
    }

    /// Scene with default collaborators and no graphics context
    pub fn headless(config: SculptConfig) -> SceneResult<Self> {
        Self::new(config, SceneCollaborators::default(), None)
    }

    /// Create a scene from a JSON configuration file
    pub fn from_config_file(
        path: impl AsRef<Path>,
        collaborators: SceneCollaborators,
        context: Option<Box<dyn GraphicsContext>>,
    ) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: SculptConfig = serde_json::from_str(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::new(config, collaborators, context)
    }

    pub fn config(&self) -> &SculptConfig {
        &self.config
    }

    /// Registered meshes in insertion order
    pub fn meshes(&self) -> &[Mesh] {
        self.registry.as_slice()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.registry.get(id)
    }

    pub fn mesh_count(&self) -> usize {
        self.registry.len()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The primary selected mesh
    pub fn primary_mesh(&self) -> Option<&Mesh> {
        self.selection.primary().and_then(|id| self.registry.get(id))
    }

    pub fn preview(&self) -> Option<&Mesh> {
        self.preview.as_ref()
    }

    pub fn grid(&self) -> &Mesh {
        &self.grid
    }

    pub fn camera(&self) -> &dyn Camera {
        &*self.camera
    }

    /// Statistics of the last rendered frame
    pub fn renderer_stats(&self) -> &RendererStats {
        self.renderer.stats()
    }

    pub fn has_context(&self) -> bool {
        self.renderer.has_context()
    }

    // Scheduling

    /// Ask for a frame on the next tick
    pub fn request_redraw(&self) -> ScheduleOutcome {
        self.scheduler.request_redraw()
    }

    /// Handle for requesting frames from loaders and other threads
    pub fn redraw_handle(&self) -> RedrawHandle {
        self.scheduler.handle()
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Frame tick from the platform
    ///
    /// Runs one frame if a redraw was requested since the last frame started,
    /// returns `None` otherwise.
    pub fn on_frame_tick(&mut self) -> Option<FrameOutcome> {
        if !self.scheduler.begin_frame() {
            return None;
        }
        Some(self.render_frame())
    }

    fn render_frame(&mut self) -> FrameOutcome {
        let bounds = self.compute_bounding_box_scene();
        let redraw = self.scheduler.handle();
        let tool = &mut self.tool;
        let scene = FrameScene {
            meshes: self.registry.as_mut_slice(),
            preview: self.preview.as_mut(),
            grid: Some(&mut self.grid),
            bounds,
            clear_color: self.config.clear_color,
        };
        self.renderer.render(&mut *self.camera, scene, |context| {
            tool.post_render(context, &redraw)
        })
    }

    // Bounds

    /// Bounds of the given registered meshes, ignoring invisible ones
    pub fn compute_bounding_box_meshes(&self, ids: &[MeshId]) -> Aabb {
        bounding_volume(ids.iter().filter_map(|&id| self.registry.get(id)))
    }

    /// Bounds of every visible registered mesh
    pub fn compute_bounding_box_all(&self) -> Aabb {
        bounding_volume(self.registry.iter())
    }

    /// Scene-wide bounds: meshes, ground grid and tool overlay
    pub fn compute_bounding_box_scene(&self) -> Aabb {
        bounding_volume(self.registry.iter().chain(std::iter::once(&self.grid)))
            .merge(&self.tool.overlay_bounds())
    }

    // Detail levels

    /// Grow `mesh` to the configured face threshold and level budget
    pub fn subdivide_clamp(&self, mesh: &mut Mesh, mode: SubdivisionMode) -> SceneResult<ClampOutcome> {
        self.subdivide_clamp_with(mesh, ClampParams::from_config(&self.config, mode))
    }

    /// Subdivision clamp with explicit parameters
    pub fn subdivide_clamp_with(&self, mesh: &mut Mesh, params: ClampParams) -> SceneResult<ClampOutcome> {
        let outcome = mesh.multires_mut().subdivide_clamp(&*self.subdivider, params)?;
        log::debug!(
            "{}: {} levels added, {} evicted, {} faces",
            mesh.name,
            outcome.added,
            outcome.evicted,
            outcome.finest_faces
        );
        Ok(outcome)
    }

    /// Switch the active detail level of a registered mesh
    ///
    /// Returns `false` when no mesh has that identity.
    pub fn set_mesh_level(&mut self, id: MeshId, level: usize) -> SceneResult<bool> {
        let Some(mesh) = self.registry.get_mut(id) else {
            return Ok(false);
        };
        mesh.multires_mut().set_active_level(level)?;
        self.request_redraw();
        Ok(true)
    }

    // Mesh lifecycle

    /// Register a mesh, journal it and make it the sole selection
    pub fn add_mesh(&mut self, mesh: Mesh) -> SceneResult<MeshId> {
        let id = mesh.id();
        if self.registry.push(mesh).is_none() {
            return Err(SceneError::DuplicateMesh(id));
        }
        self.undo.push_add(&[id]);
        log::debug!("Added {} ({} meshes)", id, self.registry.len());
        self.set_selection(Some(id), false);
        Ok(id)
    }

    /// Add a smooth sphere grown from a unit-diagonal cube
    pub fn add_sphere(&mut self) -> SceneResult<MeshId> {
        let mut mesh = Mesh::from_geometry("sphere", primitives::cube());
        let diagonal = mesh.multires().active().local_bounds().diagonal();
        mesh.matrix = Mat4::from_scale(Vec3::splat(1.0 / diagonal));
        self.subdivide_clamp(&mut mesh, SubdivisionMode::Smooth)?;
        self.add_mesh(mesh)
    }

    /// Add a linearly subdivided cube
    pub fn add_cube(&mut self) -> SceneResult<MeshId> {
        let mut mesh = Mesh::from_geometry("cube", primitives::cube());
        mesh.matrix = Mat4::from_scale(Vec3::splat(CUBE_SCALE));
        self.subdivide_clamp(&mut mesh, SubdivisionMode::Linear)?;
        self.add_mesh(mesh)
    }

    /// Add a linearly subdivided cylinder
    pub fn add_cylinder(&mut self) -> SceneResult<MeshId> {
        let mut mesh = Mesh::from_geometry("cylinder", primitives::cylinder(CYLINDER_SEGMENTS));
        self.subdivide_clamp(&mut mesh, SubdivisionMode::Linear)?;
        self.add_mesh(mesh)
    }

    /// Remove meshes without journaling
    ///
    /// Unknown identities are ignored. The removed meshes are returned in
    /// ascending original order, ready for [`Scene::restore_meshes`].
    pub fn take_meshes(&mut self, ids: &[MeshId]) -> Vec<RemovedMesh> {
        let removed = self.registry.remove_many(ids);
        if removed.is_empty() {
            return removed;
        }
        let removed_ids: SmallVec<[MeshId; 8]> = removed.iter().map(|r| r.mesh.id()).collect();
        if self.selection.remove(&removed_ids) {
            self.notify_gui();
        }
        self.request_redraw();
        removed
    }

    /// Remove meshes and journal the removal
    ///
    /// Returns how many meshes were removed; removing nothing journals
    /// nothing.
    pub fn remove_meshes(&mut self, ids: &[MeshId]) -> usize {
        let removed = self.take_meshes(ids);
        if !removed.is_empty() {
            self.undo.push_remove(&removed);
            log::debug!("Removed {} meshes ({} left)", removed.len(), self.registry.len());
        }
        removed.len()
    }

    /// Reinsert removed meshes at their original relative order without
    /// journaling
    pub fn restore_meshes(&mut self, removed: Vec<RemovedMesh>) -> Vec<MeshId> {
        let restored = self.registry.restore(removed);
        if !restored.is_empty() {
            self.request_redraw();
        }
        restored
    }

    /// Remove every selected mesh as one undoable step, then clear the
    /// selection
    pub fn delete_current_selection(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids = self.selection.members().to_vec();
        self.set_selection(None, false);
        self.remove_meshes(&ids)
    }

    /// Copy every selected mesh; the last copy ends up selected
    pub fn duplicate_selection(&mut self) -> SceneResult<Vec<MeshId>> {
        let copies: Vec<Mesh> = self
            .selection
            .members()
            .iter()
            .filter_map(|&id| self.registry.get(id))
            .map(Mesh::duplicate)
            .collect();
        copies.into_iter().map(|mesh| self.add_mesh(mesh)).collect()
    }

    /// Change the selection
    ///
    /// `None` clears it. Without `multi_select` the mesh becomes the sole
    /// selection; with it, the mesh is toggled in or out. Identities not in
    /// the registry are ignored. Returns the primary afterwards.
    pub fn set_selection(&mut self, id: Option<MeshId>, multi_select: bool) -> Option<MeshId> {
        match id {
            None => self.selection.clear(),
            Some(id) if !self.registry.contains(id) => {
                log::debug!("Ignoring selection of unknown {}", id);
                return self.selection.primary();
            }
            Some(id) if multi_select => self.selection.toggle(id),
            Some(id) => self.selection.select_only(id),
        }
        self.notify_gui();
        self.request_redraw();
        self.selection.primary()
    }

    /// Substitute `new` for the mesh `old` in place
    ///
    /// Selection entries follow the substitution. Returns `false` when `old`
    /// is not registered.
    pub fn replace_mesh(&mut self, old: MeshId, new: Mesh) -> SceneResult<bool> {
        let new_id = new.id();
        if new_id != old && self.registry.contains(new_id) {
            return Err(SceneError::DuplicateMesh(new_id));
        }
        if self.registry.replace(old, new).is_none() {
            return Ok(false);
        }
        if self.selection.replace(old, new_id) {
            self.notify_gui();
        }
        self.request_redraw();
        Ok(true)
    }

    /// Set the display flags of a registered mesh
    pub fn set_mesh_flags(&mut self, id: MeshId, flags: DisplayFlags) -> bool {
        let Some(mesh) = self.registry.get_mut(id) else {
            return false;
        };
        mesh.flags = flags;
        self.request_redraw();
        true
    }

    /// Install or remove the transient preview mesh, returning the old one
    pub fn set_preview_mesh(&mut self, preview: Option<Mesh>) -> Option<Mesh> {
        let previous = std::mem::replace(&mut self.preview, preview);
        self.request_redraw();
        previous
    }

    // Scene-wide helpers

    /// Drop every mesh and start a fresh undo history
    pub fn clear_scene(&mut self) {
        self.undo.reset();
        let cleared = self.registry.clear();
        self.camera.reset_view();
        self.set_selection(None, false);
        log::info!("Cleared scene ({} meshes)", cleared.len());
    }

    /// Scale and translate every mesh so the visible ones are centered on the
    /// origin with the configured diagonal
    ///
    /// Returns `false` when there is nothing visible to measure.
    pub fn normalize_and_center_meshes(&mut self) -> bool {
        let bounds = self.compute_bounding_box_all();
        if bounds.is_empty() {
            return false;
        }
        let diagonal = bounds.diagonal();
        if diagonal <= f32::EPSILON {
            return false;
        }
        let scale = self.config.normalize_scale / diagonal;
        let transform = Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-bounds.center());
        for mesh in self.registry.as_mut_slice() {
            mesh.matrix = transform * mesh.matrix;
        }
        self.request_redraw();
        true
    }

    /// Frame the given meshes (all when `None`), or reset the view when
    /// nothing visible remains
    pub fn reset_camera_meshes(&mut self, ids: Option<&[MeshId]>) {
        let bounds = match ids {
            Some(ids) => self.compute_bounding_box_meshes(ids),
            None => self.compute_bounding_box_all(),
        };
        if bounds.is_empty() {
            self.camera.reset_view();
        } else {
            let zoom = FRAME_MARGIN * radius_from_bounds(&bounds) * self.camera.compute_frustum_fit();
            self.camera.set_and_focus_on_pivot(bounds.center(), zoom);
        }
        self.request_redraw();
    }

    /// Window resize in logical pixels
    pub fn on_resize(&mut self, width: u32, height: u32) -> SceneResult<()> {
        let ratio = self.config.pixel_ratio;
        let width = (width as f32 * ratio).round() as u32;
        let height = (height as f32 * ratio).round() as u32;
        self.renderer.set_viewport(width, height)?;
        self.camera.on_resize(width, height);
        self.request_redraw();
        Ok(())
    }

    fn notify_gui(&mut self) {
        let primary = self.selection.primary().and_then(|id| self.registry.get(id));
        self.gui.update_mesh(primary);
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("config", &self.config)
            .field("meshes", &self.registry.len())
            .field("selection", &self.selection)
            .field("scheduler", &self.scheduler)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}
