//! Hand-mode tracker: camera lifecycle, quality presets and per-hand geometry.

use crate::camera::{CameraSession, CameraSource, FrameMetadata, VideoFrame};
use crate::config::Config;
use crate::constants::MAX_HANDS;
use crate::detector::{DetectorOptions, LandmarkDetector, TrackerQuality};
use crate::landmarks::HandLandmarks;
use crate::{Error, Result};
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receives the hands of each processed frame; empty means none visible
pub type HandResultsCallback = Box<dyn FnMut(&[HandLandmarks])>;

/// Receives one latency sample per processed frame
pub type PerformanceCallback = Box<dyn FnMut(DetectionMetric)>;

/// Detection timing for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionMetric {
    pub frame_sequence: u64,
    /// Wall-clock time from frame submission to derived result
    pub latency: Duration,
    pub hands_detected: usize,
    pub quality: TrackerQuality,
}

impl DetectionMetric {
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Tracks up to two hands.
///
/// The latest hand list is kept as one shared snapshot that is replaced as a
/// whole per frame, so [`HandTracker::latest_results`] never observes a
/// partially updated list.
pub struct HandTracker {
    detector: Option<Box<dyn LandmarkDetector>>,
    quality: TrackerQuality,
    max_hands: usize,
    camera: CameraSession,
    latest: Arc<[HandLandmarks]>,
    last_metric: Option<DetectionMetric>,
    on_results: Option<HandResultsCallback>,
    on_metric: Option<PerformanceCallback>,
    frames_processed: u64,
    destroyed: bool,
}

impl HandTracker {
    #[must_use]
    pub fn new(detector: Box<dyn LandmarkDetector>, config: &Config) -> Self {
        Self {
            detector: Some(detector),
            quality: config.hand_tracking.initial_quality,
            max_hands: config.hand_tracking.max_hands.min(MAX_HANDS),
            camera: CameraSession::new(config.camera.constraints(), config.camera.first_frame_timeout()),
            latest: Arc::from(Vec::new()),
            last_metric: None,
            on_results: None,
            on_metric: None,
            frames_processed: 0,
            destroyed: false,
        }
    }

    /// Acquire the camera, bind the detector at the current quality and start the pump
    ///
    /// # Errors
    ///
    /// Returns a classified camera error, a detector configuration error, or
    /// `InvalidState` after [`HandTracker::destroy`]
    pub fn initialize(&mut self, camera: Box<dyn CameraSource>) -> Result<FrameMetadata> {
        if self.destroyed {
            return Err(Error::InvalidState("hand tracker destroyed".to_string()));
        }
        info!("Initializing hand tracker at {} quality", self.quality);

        let metadata = self.camera.bind(camera)?;
        let options = DetectorOptions::hands(self.quality, self.max_hands);
        let detector = self
            .detector
            .as_mut()
            .ok_or_else(|| Error::InvalidState("hand detector released".to_string()))?;
        if let Err(e) = detector.configure(&options) {
            self.camera.release();
            return Err(e);
        }

        info!("Hand tracker running");
        Ok(metadata)
    }

    /// Resume the frame pump without re-initializing
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` before initialization, or a camera error if the
    /// stream cannot be re-opened
    pub fn start(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(Error::InvalidState("hand tracker destroyed".to_string()));
        }
        self.camera.start()
    }

    /// Halt the frame pump and the media stream; safe to repeat
    pub fn stop(&mut self) {
        self.camera.stop();
    }

    /// Switch detector presets without touching the camera.
    ///
    /// Returns `Ok(true)` when the detector was reconfigured. Re-applying the
    /// current level does nothing. Before initialization the level is stored
    /// and applied at bind time.
    ///
    /// # Errors
    ///
    /// Returns an error when the detector rejects the new options; the
    /// previous level stays active
    pub fn set_quality(&mut self, quality: TrackerQuality) -> Result<bool> {
        if quality == self.quality {
            return Ok(false);
        }
        if !self.camera.is_bound() {
            debug!("Quality set to {quality} before initialization");
            self.quality = quality;
            return Ok(false);
        }

        let Some(detector) = self.detector.as_mut() else {
            return Err(Error::InvalidState("hand detector released".to_string()));
        };
        detector.configure(&DetectorOptions::hands(quality, self.max_hands))?;
        info!("Hand tracking quality {} -> {}", self.quality, quality);
        self.quality = quality;
        Ok(true)
    }

    #[must_use]
    pub fn quality(&self) -> TrackerQuality {
        self.quality
    }

    /// Register the single results subscriber, replacing any previous one
    pub fn on_results<F>(&mut self, callback: F)
    where
        F: FnMut(&[HandLandmarks]) + 'static,
    {
        self.on_results = Some(Box::new(callback));
    }

    /// Register the single latency subscriber, replacing any previous one
    pub fn on_performance_metric<F>(&mut self, callback: F)
    where
        F: FnMut(DetectionMetric) + 'static,
    {
        self.on_metric = Some(Box::new(callback));
    }

    /// Pull the next frame from the stream and process it.
    ///
    /// # Errors
    ///
    /// Returns an error when the detector fails on the frame
    pub fn pump(&mut self) -> Result<bool> {
        match self.camera.next_frame() {
            Some(frame) => self.process_frame(&frame),
            None => Ok(false),
        }
    }

    /// Run detection on a host-supplied frame, replacing the previous result.
    ///
    /// # Errors
    ///
    /// Returns an error when the detector fails on the frame
    pub fn process_frame(&mut self, frame: &VideoFrame) -> Result<bool> {
        if !self.camera.is_running() {
            trace!("Discarding frame {} while stopped", frame.sequence);
            return Ok(false);
        }
        let Some(detector) = self.detector.as_mut() else {
            return Ok(false);
        };

        let submitted = Instant::now();
        let output = match detector.detect(frame) {
            Ok(output) => output,
            Err(e) => {
                self.latest = Arc::from(Vec::new());
                warn!("Hand detection failed on frame {}: {}", frame.sequence, e);
                return Err(e);
            }
        };
        let hands: Vec<HandLandmarks> = output
            .hands
            .into_iter()
            .filter_map(|hand| HandLandmarks::from_points(hand.handedness, hand.points))
            .take(self.max_hands)
            .collect();

        let metric = DetectionMetric {
            frame_sequence: frame.sequence,
            latency: submitted.elapsed(),
            hands_detected: hands.len(),
            quality: self.quality,
        };

        self.latest = Arc::from(hands);
        self.last_metric = Some(metric);
        self.frames_processed += 1;

        if let Some(callback) = self.on_results.as_mut() {
            callback(&self.latest[..]);
        }
        if let Some(callback) = self.on_metric.as_mut() {
            callback(metric);
        }
        Ok(true)
    }

    /// Snapshot of the most recent frame's hands
    #[must_use]
    pub fn latest_results(&self) -> Arc<[HandLandmarks]> {
        Arc::clone(&self.latest)
    }

    /// Timing of the most recent processed frame
    #[must_use]
    pub fn last_metric(&self) -> Option<DetectionMetric> {
        self.last_metric
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.camera.is_running()
    }

    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Release camera and detector; later calls are no-ops
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.camera.release();
        if let Some(mut detector) = self.detector.take() {
            detector.close();
        }
        self.on_results = None;
        self.on_metric = None;
        self.latest = Arc::from(Vec::new());
        self.destroyed = true;
        debug!("Hand tracker destroyed after {} frames", self.frames_processed);
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        self.destroy();
    }
}
