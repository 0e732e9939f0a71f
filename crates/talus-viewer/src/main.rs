//! Talus Viewer - Terrain scanner viewer binary
//!
//! Flies a free camera over a heightmap terrain with an expanding scan
//! pulse composited over the scene.
//!
//! Usage:
//!   talus-viewer [--config <path>] [--assets <dir>] [--no-scan] [--fullscreen]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use talus_terrain::{build_mesh, Heightmap};
use talus_viewer::{ViewerApp, ViewerConfig};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "talus-viewer")]
#[command(about = "Terrain scanner viewer - fly over a heightmap with a scan pulse overlay")]
struct Args {
    /// Path to config file (built-in scene when omitted)
    #[arg(long)]
    config: Option<String>,

    /// Directory containing heightmaps and textures
    #[arg(long, default_value = "assets")]
    assets: String,

    /// Start with the scan overlay disabled
    #[arg(long)]
    no_scan: bool,

    /// Launch in fullscreen mode
    #[arg(long)]
    fullscreen: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => ViewerConfig::default(),
    };
    config.validate().context("Invalid config")?;

    if args.no_scan {
        config.scan.enabled = false;
    }

    let asset_root = PathBuf::from(&args.assets);
    let heightmap_path = asset_root.join(&config.terrain.heightmap);
    let heightmap = Heightmap::from_image(&heightmap_path)
        .with_context(|| format!("Failed to load heightmap: {}", heightmap_path.display()))?;

    let terrain = build_mesh(
        &heightmap,
        config.terrain.height_scale,
        config.terrain.horizontal_scale,
    );

    println!(
        "Loaded heightmap: {}x{} ({} vertices, {} triangles)",
        heightmap.width,
        heightmap.height,
        terrain.vertex_count(),
        terrain.triangle_count()
    );
    println!();
    println!("Controls:");
    println!("  WASD     - Move");
    println!("  Mouse    - Look");
    println!("  F2       - Toggle scan overlay");
    println!("  F11      - Toggle fullscreen");
    println!("  Escape   - Release cursor / Exit");

    // Create and run the event loop
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config, terrain, asset_root, args.fullscreen);
    event_loop.run_app(&mut app)?;

    Ok(())
}
