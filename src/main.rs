//! Offline try-on replay: runs a recorded detection session through a product
//! renderer and prints the smoothed pose of every frame.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use wearable_tryon::config::Config;
use wearable_tryon::headless::HeadlessEngine;
use wearable_tryon::renderers::LodLevel;
use wearable_tryon::replay::{Recording, ReplayCamera, ReplayDetector};
use wearable_tryon::session::{ProductCategory, TryOnSession};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recording file (YAML) with per-frame detector output
    recording: PathBuf,

    /// Product category (eyewear, watch, bracelet, necklace, earring, ring)
    #[arg(short, long, default_value = "eyewear")]
    product: String,

    /// Model URL, overrides the configuration
    #[arg(short, long)]
    model: Option<String>,

    /// Level of detail to show (high, medium, low)
    #[arg(short, long)]
    lod: Option<String>,

    /// Initial hand tracking quality (low, medium, high)
    #[arg(short, long)]
    quality: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this path
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn parse_lod(value: &str) -> Result<LodLevel> {
    Ok(match value.to_lowercase().as_str() {
        "high" => LodLevel::High,
        "medium" => LodLevel::Medium,
        "low" => LodLevel::Low,
        other => bail!("Unknown LOD level: {other}"),
    })
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Wearable try-on replay");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };

    let category: ProductCategory = args.product.parse()?;
    if let Some(model) = args.model {
        config.renderer.model_url = model;
    } else if config.renderer.model_url.is_empty() {
        config.renderer.model_url = format!("models/{category}.glb");
    }
    if let Some(quality) = &args.quality {
        config.hand_tracking.initial_quality = quality.parse()?;
    }
    let lod = args.lod.as_deref().map(parse_lod).transpose()?;
    config.validate()?;

    if let Some(path) = &args.save_config {
        config.to_file(path)?;
        info!("Configuration written to {}", path.display());
    }

    let recording = Arc::new(
        Recording::from_file(&args.recording)
            .with_context(|| format!("loading recording {}", args.recording.display()))?,
    );
    info!("Replaying {} frames for {}", recording.len(), category);

    // Wire the session to the headless engine
    let engine = HeadlessEngine::new();
    let mut scene = engine.scene();
    let detector = Box::new(ReplayDetector::new(Arc::clone(&recording)));
    let mut session = TryOnSession::new(category, detector, engine.loader(), &config)?;
    session.on_tracking(move |tracking| {
        info!("{category} {}", if tracking { "acquired" } else { "lost" });
    });
    session.initialize(Box::new(ReplayCamera::new(Arc::clone(&recording))), &mut scene)?;

    if let Some(level) = lod {
        if !session.renderer_mut().set_lod(level) {
            warn!("{level:?} LOD not available, showing the primary model");
        }
    }

    println!("frame,visible,x,y,z,pitch,yaw,roll,scale");
    let mut frame = 0u64;
    let mut visible_frames = 0u64;
    while session.pump()? {
        let visible = session.render_tick();
        match session.renderer().current_pose() {
            Some(pose) if visible => {
                visible_frames += 1;
                println!(
                    "{frame},1,{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
                    pose.position.x,
                    pose.position.y,
                    pose.position.z,
                    pose.rotation.pitch,
                    pose.rotation.yaw,
                    pose.rotation.roll,
                    pose.scale
                );
            }
            _ => println!("{frame},0,,,,,,,"),
        }
        frame += 1;
    }

    if let Some(quality) = session.tracker_quality() {
        info!("Final hand tracking quality: {quality}");
    }
    info!(
        "Processed {} frames, product visible in {}, {} nodes drawn at end",
        session.frames_processed(),
        visible_frames,
        engine.drawn_nodes().len()
    );
    session.destroy();

    Ok(())
}
