//! # Chisel CLI
//!
//! Headless driver for the Chisel scene orchestrator.
//!
//! ## Commands
//! - `sculpt` - Grow a primitive through the subdivision clamp
//! - `frame` - Render a scene into a recording context
//! - `bounds` - Print the bounds of the default scene

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use chisel_core::{Aabb, DisplayFlags, Mesh, SculptConfig, primitives, radius_from_bounds};
use chisel_editor::{Scene, SceneCollaborators};
use chisel_renderer::{CountingTicker, FrameOutcome, RecordingContext};
use glam::{Mat4, Vec3};

/// Chisel sculpting core CLI
#[derive(Parser)]
#[command(name = "chisel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a primitive and print its detail ladder
    Sculpt {
        /// Primitive to build
        #[arg(short, long, value_enum, default_value_t = Primitive::Sphere)]
        primitive: Primitive,

        /// Face threshold, overrides the configuration
        #[arg(short, long)]
        threshold: Option<usize>,

        /// Retained detail levels, overrides the configuration
        #[arg(short, long)]
        max_levels: Option<usize>,
    },

    /// Render a headless scene and print the recorded commands
    Frame {
        /// Number of meshes
        #[arg(short, long, default_value = "3")]
        meshes: usize,

        /// How many of the meshes are transparent
        #[arg(short, long, default_value = "0")]
        transparent: usize,

        /// Show wireframe overlays
        #[arg(short, long)]
        wireframe: bool,
    },

    /// Print bounds and radius of the default scene
    Bounds,
}

/// Primitive builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Sphere,
    Cube,
    Cylinder,
}

/// Output of `sculpt`
#[derive(Debug, Serialize)]
pub struct SculptReport {
    pub primitive: Primitive,
    pub level_face_counts: Vec<usize>,
    pub active_level: usize,
}

/// Output of `frame`
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub meshes: usize,
    /// Frame callbacks armed by the ticker
    pub armed: usize,
    /// Frames executed while pumping ticks
    pub frames: usize,
    pub draw_calls: u32,
    pub triangles: usize,
    pub commands: Vec<String>,
}

/// Output of `bounds`
#[derive(Debug, Serialize)]
pub struct BoundsReport {
    pub meshes: [f32; 6],
    pub scene: [f32; 6],
    pub radius: f32,
}

/// Result of a command
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Sculpt(SculptReport),
    Frame(FrameReport),
    Bounds(BoundsReport),
}

impl Report {
    /// Human-readable lines
    pub fn lines(&self) -> Vec<String> {
        match self {
            Report::Sculpt(report) => vec![
                format!("primitive: {:?}", report.primitive),
                format!("levels: {:?}", report.level_face_counts),
                format!("active level: {}", report.active_level),
            ],
            Report::Frame(report) => {
                let mut lines = vec![
                    format!("meshes: {}", report.meshes),
                    format!("armed: {}, frames: {}", report.armed, report.frames),
                    format!(
                        "draw calls: {}, triangles: {}",
                        report.draw_calls, report.triangles
                    ),
                ];
                lines.extend(report.commands.iter().map(|command| format!("  {command}")));
                lines
            }
            Report::Bounds(report) => vec![
                format!("meshes: {:?}", report.meshes),
                format!("scene: {:?}", report.scene),
                format!("radius: {}", report.radius),
            ],
        }
    }
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let report = run(&cli)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Run a command without printing
pub fn run(cli: &Cli) -> Result<Report> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SculptConfig::default(),
    };

    match cli.command {
        Commands::Sculpt {
            primitive,
            threshold,
            max_levels,
        } => {
            let config = SculptConfig {
                face_threshold: threshold.unwrap_or(config.face_threshold),
                max_levels: max_levels.unwrap_or(config.max_levels),
                ..config
            };
            sculpt(config, primitive).map(Report::Sculpt)
        }
        Commands::Frame {
            meshes,
            transparent,
            wireframe,
        } => frame(config, meshes, transparent, wireframe).map(Report::Frame),
        Commands::Bounds => bounds(config).map(Report::Bounds),
    }
}

/// Read and validate a configuration file
pub fn load_config(path: &Path) -> Result<SculptConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: SculptConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    config.validate()?;
    log::debug!("Using configuration {}", path.display());
    Ok(config)
}

fn sculpt(config: SculptConfig, primitive: Primitive) -> Result<SculptReport> {
    let mut scene = Scene::headless(config)?;
    let id = match primitive {
        Primitive::Sphere => scene.add_sphere()?,
        Primitive::Cube => scene.add_cube()?,
        Primitive::Cylinder => scene.add_cylinder()?,
    };
    let mesh = scene.mesh(id).context("new mesh missing from the scene")?;
    log::info!("Built {} with {} faces", mesh.name, mesh.face_count());

    Ok(SculptReport {
        primitive,
        level_face_counts: mesh.multires().level_face_counts(),
        active_level: mesh.multires().active_level(),
    })
}

fn frame(config: SculptConfig, meshes: usize, transparent: usize, wireframe: bool) -> Result<FrameReport> {
    let ticker = Arc::new(CountingTicker::new());
    let context = RecordingContext::new();
    let collaborators = SceneCollaborators::default().with_ticker(ticker.clone());
    let mut scene = Scene::new(config, collaborators, Some(Box::new(context.clone())))?;
    scene.on_resize(800, 600)?;

    for index in 0..meshes {
        let mut mesh = Mesh::from_geometry(format!("mesh{index}"), primitives::cube());
        mesh.matrix = Mat4::from_translation(Vec3::new(index as f32 * 1.5, 0.0, 0.0));
        mesh.set_flag(DisplayFlags::TRANSPARENT, index < transparent);
        mesh.set_flag(DisplayFlags::WIREFRAME, wireframe);
        scene.add_mesh(mesh)?;
    }
    for _ in 0..meshes {
        scene.request_redraw();
    }
    scene.reset_camera_meshes(None);

    context.reset();
    let mut frames = 0;
    while let Some(outcome) = scene.on_frame_tick() {
        if let FrameOutcome::Rendered(stats) = outcome {
            log::debug!("Frame {} rendered", stats.frame_number);
        }
        frames += 1;
    }
    let stats = scene.renderer_stats();

    Ok(FrameReport {
        meshes: scene.mesh_count(),
        armed: ticker.armed(),
        frames,
        draw_calls: stats.draw_calls,
        triangles: stats.triangles,
        commands: context.commands().iter().map(|command| format!("{command:?}")).collect(),
    })
}

fn bounds(config: SculptConfig) -> Result<BoundsReport> {
    let mut scene = Scene::headless(config)?;
    scene.add_sphere()?;
    let meshes: Aabb = scene.compute_bounding_box_all();
    let scene_bounds = scene.compute_bounding_box_scene();

    Ok(BoundsReport {
        meshes: meshes.to_array(),
        scene: scene_bounds.to_array(),
        radius: radius_from_bounds(&meshes),
    })
}
