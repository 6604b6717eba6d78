//! One try-on session: a product category bound to its tracker and renderer.
//!
//! The session owns exactly one tracker (face or hand, chosen by category) and
//! one renderer. Hosts drive it with [`TryOnSession::pump`] per camera frame
//! and [`TryOnSession::render_tick`] per display frame. For hand products the
//! detection latency of every frame feeds a [`LatencyMonitor`] whose
//! recommendations step the hand tracker's quality preset.

use crate::camera::{CameraSource, FrameMetadata, VideoFrame};
use crate::config::Config;
use crate::detector::{LandmarkDetector, TrackerQuality};
use crate::face_tracker::FaceTracker;
use crate::hand_tracker::HandTracker;
use crate::landmarks::{FaceLandmarks, HandLandmarks};
use crate::latency_monitor::{LatencyMonitor, QualityAdjustment};
use crate::renderers::{
    EarringRenderer, EyewearRenderer, NecklaceRenderer, ProductRenderer, RendererConfig, RingRenderer,
    TrackingFrame, TrackingSource, WatchRenderer,
};
use crate::scene::{AssetLoader, SceneGraph};
use crate::{Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

/// Kind of product being tried on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Eyewear,
    Watch,
    Bracelet,
    Necklace,
    Earring,
    Ring,
}

impl ProductCategory {
    pub const ALL: [Self; 6] = [
        Self::Eyewear,
        Self::Watch,
        Self::Bracelet,
        Self::Necklace,
        Self::Earring,
        Self::Ring,
    ];

    #[must_use]
    pub const fn tracking_source(self) -> TrackingSource {
        match self {
            Self::Eyewear | Self::Necklace | Self::Earring => TrackingSource::Face,
            Self::Watch | Self::Bracelet | Self::Ring => TrackingSource::Hand,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eyewear => "eyewear",
            Self::Watch => "watch",
            Self::Bracelet => "bracelet",
            Self::Necklace => "necklace",
            Self::Earring => "earring",
            Self::Ring => "ring",
        }
    }

    /// Build the renderer for this category; bracelets use the watch anchor
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` or `FilterError` when the renderer configuration is invalid
    pub fn create_renderer(
        self,
        config: RendererConfig,
        loader: Rc<dyn AssetLoader>,
    ) -> Result<Box<dyn ProductRenderer>> {
        Ok(match self {
            Self::Eyewear => Box::new(EyewearRenderer::new(config, loader)?),
            Self::Watch | Self::Bracelet => Box::new(WatchRenderer::new(config, loader)?),
            Self::Necklace => Box::new(NecklaceRenderer::new(config, loader)?),
            Self::Earring => Box::new(EarringRenderer::new(config, loader)?),
            Self::Ring => Box::new(RingRenderer::new(config, loader)?),
        })
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "glasses" | "sunglasses" => Ok(Self::Eyewear),
            "earrings" => Ok(Self::Earring),
            "necklaces" => Ok(Self::Necklace),
            _ => Self::ALL
                .into_iter()
                .find(|category| category.as_str() == name)
                .ok_or_else(|| Error::InvalidInput(format!("Unknown product category: {s}"))),
        }
    }
}

enum ActiveTracker {
    Face(FaceTracker),
    Hand(HandTracker),
}

impl ActiveTracker {
    fn initialize(&mut self, camera: Box<dyn CameraSource>) -> Result<FrameMetadata> {
        match self {
            Self::Face(tracker) => tracker.initialize(camera),
            Self::Hand(tracker) => tracker.initialize(camera),
        }
    }

    fn snapshot(&self) -> (Option<Arc<FaceLandmarks>>, Arc<[HandLandmarks]>) {
        match self {
            Self::Face(tracker) => (tracker.latest_result(), Arc::from(Vec::new())),
            Self::Hand(tracker) => (None, tracker.latest_results()),
        }
    }
}

/// Receives `true` when the product becomes visible and `false` when it is lost
pub type TrackingCallback = Box<dyn FnMut(bool)>;

/// Receives the new hand tracker quality after an adaptive change took effect
pub type QualityCallback = Box<dyn FnMut(TrackerQuality)>;

/// A product category wired to its tracker and renderer
pub struct TryOnSession {
    category: ProductCategory,
    model_url: String,
    tracker: ActiveTracker,
    renderer: Box<dyn ProductRenderer>,
    monitor: Option<LatencyMonitor>,
    tracking: bool,
    on_tracking: Option<TrackingCallback>,
    on_quality_change: Option<QualityCallback>,
    destroyed: bool,
}

impl TryOnSession {
    /// Create a session; nothing is loaded or acquired until [`TryOnSession::initialize`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate
    pub fn new(
        category: ProductCategory,
        detector: Box<dyn LandmarkDetector>,
        loader: Rc<dyn AssetLoader>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        let renderer_config = config.renderer_for(category);
        let model_url = renderer_config.model_url.clone();
        let renderer = category.create_renderer(renderer_config, loader)?;

        let source = category.tracking_source();
        let tracker = match source {
            TrackingSource::Face => ActiveTracker::Face(FaceTracker::new(detector, config)),
            TrackingSource::Hand => ActiveTracker::Hand(HandTracker::new(detector, config)),
        };

        let adaptive = &config.adaptive_quality;
        let monitor = (adaptive.enabled && source == TrackingSource::Hand)
            .then(|| LatencyMonitor::new(adaptive.window_size, adaptive.latency_budget_ms));

        debug!("Created {category} session with {} renderer", renderer.name());
        Ok(Self {
            category,
            model_url,
            tracker,
            renderer,
            monitor,
            tracking: false,
            on_tracking: None,
            on_quality_change: None,
            destroyed: false,
        })
    }

    /// Load the product into the scene, then acquire the camera.
    ///
    /// LOD variants are preloaded before attaching. If the camera cannot be
    /// acquired the loaded model is released again.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` when the primary model fails, or the tracker's
    /// camera/detector error
    pub fn initialize(&mut self, camera: Box<dyn CameraSource>, scene: &mut dyn SceneGraph) -> Result<FrameMetadata> {
        if self.destroyed {
            return Err(Error::InvalidState("session destroyed".to_string()));
        }
        info!("Initializing {} try-on", self.category);

        self.renderer.load_model(&self.model_url)?;
        let lods = self.renderer.preload_lods()?;
        self.renderer.attach_to_scene(scene)?;

        match self.tracker.initialize(camera) {
            Ok(metadata) => {
                info!(
                    "{} try-on ready at {}x{} with {} LOD variants",
                    self.category, metadata.width, metadata.height, lods
                );
                Ok(metadata)
            }
            Err(e) => {
                warn!("Tracker failed to start: {e}");
                self.renderer.dispose();
                Err(e)
            }
        }
    }

    /// Resume tracking after [`TryOnSession::stop`]
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` before initialization or a camera error
    pub fn start(&mut self) -> Result<()> {
        match &mut self.tracker {
            ActiveTracker::Face(tracker) => tracker.start(),
            ActiveTracker::Hand(tracker) => tracker.start(),
        }
    }

    /// Pause tracking; the product hides on the next render tick
    pub fn stop(&mut self) {
        match &mut self.tracker {
            ActiveTracker::Face(tracker) => tracker.stop(),
            ActiveTracker::Hand(tracker) => tracker.stop(),
        }
    }

    /// Register the single tracking-state subscriber, replacing any previous one
    pub fn on_tracking<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.on_tracking = Some(Box::new(callback));
    }

    /// Register the single quality-change subscriber, replacing any previous one.
    ///
    /// Fires only when the latency monitor actually moved the hand tracker to
    /// another preset; face sessions never call it.
    pub fn on_quality_change<F>(&mut self, callback: F)
    where
        F: FnMut(TrackerQuality) + 'static,
    {
        self.on_quality_change = Some(Box::new(callback));
    }

    /// Pull and process the next camera frame
    ///
    /// # Errors
    ///
    /// Returns an error when detection or a quality change fails
    pub fn pump(&mut self) -> Result<bool> {
        let processed = match &mut self.tracker {
            ActiveTracker::Face(tracker) => tracker.pump()?,
            ActiveTracker::Hand(tracker) => tracker.pump()?,
        };
        if processed {
            self.adapt_quality()?;
        }
        Ok(processed)
    }

    /// Process a host-supplied frame
    ///
    /// # Errors
    ///
    /// Returns an error when detection or a quality change fails
    pub fn process_frame(&mut self, frame: &VideoFrame) -> Result<bool> {
        let processed = match &mut self.tracker {
            ActiveTracker::Face(tracker) => tracker.process_frame(frame)?,
            ActiveTracker::Hand(tracker) => tracker.process_frame(frame)?,
        };
        if processed {
            self.adapt_quality()?;
        }
        Ok(processed)
    }

    /// Update the renderer from the latest tracker results.
    ///
    /// Returns whether the product is visible. The tracking callback fires
    /// only when that changes.
    pub fn render_tick(&mut self) -> bool {
        let running = match &self.tracker {
            ActiveTracker::Face(tracker) => tracker.is_running(),
            ActiveTracker::Hand(tracker) => tracker.is_running(),
        };
        let (face, hands) = if running {
            self.tracker.snapshot()
        } else {
            (None, Arc::from(Vec::new()))
        };

        self.renderer.update(&TrackingFrame {
            face: face.as_deref(),
            hands: &hands,
        });

        let tracking = self.renderer.is_visible();
        if tracking != self.tracking {
            self.tracking = tracking;
            info!("{} {}", self.category, if tracking { "tracking" } else { "lost" });
            if let Some(callback) = self.on_tracking.as_mut() {
                callback(tracking);
            }
        }
        tracking
    }

    fn adapt_quality(&mut self) -> Result<()> {
        let (ActiveTracker::Hand(tracker), Some(monitor)) = (&mut self.tracker, self.monitor.as_mut()) else {
            return Ok(());
        };
        let Some(metric) = tracker.last_metric() else {
            return Ok(());
        };

        let next = match monitor.record(metric.latency) {
            Some(QualityAdjustment::Downgrade) => tracker.quality().downgrade(),
            Some(QualityAdjustment::Upgrade) => tracker.quality().upgrade(),
            None => None,
        };
        if let Some(quality) = next {
            if tracker.set_quality(quality)? {
                if let Some(callback) = self.on_quality_change.as_mut() {
                    callback(quality);
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn category(&self) -> ProductCategory {
        self.category
    }

    #[must_use]
    pub fn renderer(&self) -> &dyn ProductRenderer {
        self.renderer.as_ref()
    }

    /// Mutable renderer access, e.g. for LOD switching
    pub fn renderer_mut(&mut self) -> &mut dyn ProductRenderer {
        self.renderer.as_mut()
    }

    /// Hand tracker quality, `None` for face products
    #[must_use]
    pub fn tracker_quality(&self) -> Option<TrackerQuality> {
        match &self.tracker {
            ActiveTracker::Hand(tracker) => Some(tracker.quality()),
            ActiveTracker::Face(_) => None,
        }
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        match &self.tracker {
            ActiveTracker::Face(tracker) => tracker.frames_processed(),
            ActiveTracker::Hand(tracker) => tracker.frames_processed(),
        }
    }

    /// Release tracker, camera and every scene node; later calls are no-ops
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        match &mut self.tracker {
            ActiveTracker::Face(tracker) => tracker.destroy(),
            ActiveTracker::Hand(tracker) => tracker.destroy(),
        }
        self.renderer.dispose();
        self.on_tracking = None;
        self.on_quality_change = None;
        self.tracking = false;
        self.destroyed = true;
        info!("{} session destroyed", self.category);
    }
}
