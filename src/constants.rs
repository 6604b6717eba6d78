//! Constants used throughout the tracking core

use std::f64::consts::{FRAC_PI_2, PI};

/// Number of points in a face mesh detection
pub const NUM_FACE_LANDMARKS: usize = 468;

/// Number of points in a hand detection
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Maximum hands reported per frame
pub const MAX_HANDS: usize = 2;

/// Face mesh indices
pub const FACE_LEFT_EYE: usize = 33;
pub const FACE_RIGHT_EYE: usize = 263;
pub const FACE_LEFT_EAR: usize = 234;
pub const FACE_RIGHT_EAR: usize = 454;
pub const FACE_NOSE_TIP: usize = 1;
pub const FACE_CHIN: usize = 152;

/// Hand indices
pub const HAND_WRIST: usize = 0;
pub const HAND_INDEX_MCP: usize = 5;
pub const HAND_MIDDLE_MCP: usize = 9;
pub const HAND_MIDDLE_TIP: usize = 12;
pub const HAND_RING_MCP: usize = 13;
pub const HAND_RING_PIP: usize = 14;

/// Expected nose-to-chin share of face height for a level head
pub const PITCH_CALIBRATION: f64 = 0.4;
/// Gain from the pitch offset ratio to radians
pub const PITCH_GAIN: f64 = PI;
/// Gain from the normalized nose offset to radians
pub const YAW_GAIN: f64 = FRAC_PI_2;

/// Distances below this are treated as degenerate
pub const EPSILON: f64 = 1e-10;

/// Camera defaults
pub const DEFAULT_CAMERA_WIDTH: u32 = 1280;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 720;
pub const DEFAULT_FIRST_FRAME_TIMEOUT_MS: u64 = 10_000;

/// Normalized-to-scene conversion: normalized [0, 1] spans 2 scene units
pub const SCENE_SPAN: f64 = 2.0;

/// Per-product smoothing factors
pub const EYEWEAR_SMOOTHING: f64 = 0.4;
pub const WATCH_SMOOTHING: f64 = 0.3;
pub const NECKLACE_SMOOTHING: f64 = 0.25;
pub const EARRING_SMOOTHING: f64 = 0.3;
pub const RING_SMOOTHING: f64 = 0.35;

/// Adaptive quality defaults
pub const DEFAULT_LATENCY_WINDOW: usize = 30;
pub const DEFAULT_LATENCY_BUDGET_MS: f64 = 45.0;
/// Mean latency below budget times this ratio allows an upgrade
pub const UPGRADE_HEADROOM_RATIO: f64 = 0.5;

/// Eyewear: forward nudge as a share of scene face width, scale per inter-ear distance
pub const EYEWEAR_FORWARD_NUDGE: f64 = 0.05;
pub const EYEWEAR_SCALE: f64 = 10.0;

/// Watch: forearm offset in wrist-to-index-MCP lengths, scale per hand size
pub const WATCH_FOREARM_OFFSET: f64 = 2.0;
pub const WATCH_SCALE: f64 = 6.0;

/// Necklace: drop below the chin as a share of scene face height
pub const NECKLACE_DROP: f64 = 0.15;
pub const NECKLACE_SCALE: f64 = 4.0;
/// Necklace rotation damping for pitch, yaw and roll
pub const NECKLACE_DAMPING: (f64, f64, f64) = (0.3, 0.4, 0.5);

/// Earring: drop below each ear as a share of scene face width
pub const EARRING_DROP: f64 = 0.1;
pub const EARRING_SCALE: f64 = 1.5;

pub const RING_SCALE: f64 = 2.0;

/// Roll correction for models that wrap around a limb or finger
pub const LIMB_ROLL_CORRECTION: f64 = -FRAC_PI_2;
