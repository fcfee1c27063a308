use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use scenery_engine::device::GpuInit;
use scenery_engine::import::ObjScene;
use scenery_engine::logging::{init_logging, LoggingConfig};
use scenery_engine::window::{LogicalSize, Runtime, RuntimeConfig};
use scenery_world::{Viewer, WorldConfig};

/// Renders an OBJ scene with a ground quad, cylinder, disk and overlay labels.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding the scene file and its material library.
    #[arg(long, default_value = "assets")]
    scene_dir: PathBuf,

    /// Scene file name inside `--scene-dir`.
    #[arg(long, default_value = "barrel.obj")]
    scene_file: String,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    #[arg(long, default_value = "scenery")]
    title: String,

    /// Start with the orientation grid visible (toggle with G).
    #[arg(long)]
    grid: bool,

    /// Log filter in env_logger syntax; falls back to RUST_LOG, then info.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    log::info!(
        "scene {} (arrows rotate, +/- distance, G grid, Esc quit)",
        args.scene_dir.join(&args.scene_file).display()
    );

    let config = WorldConfig { show_grid: args.grid, ..WorldConfig::default() };
    let scene = ObjScene::new(args.scene_dir, args.scene_file);
    let viewer = Viewer::new(scene, config, args.width, args.height);

    Runtime::run(
        RuntimeConfig {
            title: args.title,
            initial_size: LogicalSize::new(f64::from(args.width), f64::from(args.height)),
        },
        GpuInit::default(),
        viewer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sample_scene() {
        let args = Args::parse_from(["scenery-viewer"]);
        assert_eq!(args.scene_dir, PathBuf::from("assets"));
        assert_eq!(args.scene_file, "barrel.obj");
        assert_eq!((args.width, args.height), (800, 600));
        assert!(!args.grid);
        assert!(args.log.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "scenery-viewer",
            "--scene-dir",
            "models",
            "--scene-file",
            "crate.obj",
            "--grid",
            "--log",
            "debug",
        ]);
        assert_eq!(args.scene_dir, PathBuf::from("models"));
        assert_eq!(args.scene_file, "crate.obj");
        assert!(args.grid);
        assert_eq!(args.log.as_deref(), Some("debug"));
    }
}
