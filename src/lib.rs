//! Landmark tracking to smoothed 3D pose pipeline for virtual try-on of
//! wearable products.
//!
//! This library turns per-frame face mesh and hand landmark detections into
//! stable model transforms for glasses, watches, bracelets, necklaces,
//! earrings and rings:
//! - Trackers own the camera lifecycle and derive face/hand geometry
//! - Renderers anchor a product to that geometry and smooth it over time
//! - A session binds one product category to its tracker and renderer
//!
//! The landmark detector, camera and scene engine are external and reached
//! through traits ([`detector::LandmarkDetector`], [`camera::CameraSource`],
//! [`scene::SceneGraph`] / [`scene::AssetLoader`]).
//!
//! # Examples
//!
//! ## Anchoring a product
//!
//! ```no_run
//! use wearable_tryon::headless::HeadlessEngine;
//! use wearable_tryon::landmarks::FaceLandmarks;
//! use wearable_tryon::renderers::{EyewearRenderer, ProductRenderer, RendererConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = HeadlessEngine::new();
//! let mut scene = engine.scene();
//!
//! let mut glasses = EyewearRenderer::new(RendererConfig::with_model("glasses.glb"), engine.loader())?;
//! glasses.load_model("glasses.glb")?;
//! glasses.attach_to_scene(&mut scene)?;
//!
//! # let mesh = Vec::new();
//! // Once per frame with the detector's face mesh
//! let face = FaceLandmarks::from_points(mesh);
//! glasses.update_from_face_tracking(face.as_ref());
//! if let Some(pose) = glasses.current_pose() {
//!     println!("glasses at {:?}, scale {:.2}", pose.position, pose.scale);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a session
//!
//! ```no_run
//! use std::sync::Arc;
//! use wearable_tryon::config::Config;
//! use wearable_tryon::headless::HeadlessEngine;
//! use wearable_tryon::replay::{Recording, ReplayCamera, ReplayDetector};
//! use wearable_tryon::session::{ProductCategory, TryOnSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recording = Arc::new(Recording::from_file("session.yaml")?);
//! let engine = HeadlessEngine::new();
//! let mut config = Config::default();
//! config.renderer.model_url = "watch.glb".to_string();
//!
//! let detector = Box::new(ReplayDetector::new(Arc::clone(&recording)));
//! let mut session = TryOnSession::new(ProductCategory::Watch, detector, engine.loader(), &config)?;
//! session.on_tracking(|tracking| println!("tracking: {tracking}"));
//! session.initialize(Box::new(ReplayCamera::new(recording)), &mut engine.scene())?;
//!
//! while session.pump()? {
//!     session.render_tick();
//! }
//! session.destroy();
//! # Ok(())
//! # }
//! ```

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

/// Landmark geometry helpers
pub mod utils;

/// Landmark types and derived face/hand geometry
pub mod landmarks;

/// Camera acquisition boundary and stream lifecycle
pub mod camera;

/// Landmark detector boundary and quality presets
pub mod detector;

/// Face mesh tracker
pub mod face_tracker;

/// Hand tracker with adjustable quality
pub mod hand_tracker;

/// Scene-space poses
pub mod pose;

/// Temporal pose filters
pub mod filters;

/// Scene and asset engine boundary
pub mod scene;

/// Product renderers
pub mod renderers;

/// Detection latency statistics for adaptive quality
pub mod latency_monitor;

/// Category-level wiring of tracker and renderer
pub mod session;

/// In-memory scene engine
pub mod headless;

/// Recorded detector output playback
pub mod replay;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{Error, Result};
