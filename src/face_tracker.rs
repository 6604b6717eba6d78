//! Face-mode tracker: camera lifecycle plus per-frame face geometry.

use crate::camera::{CameraSession, CameraSource, FrameMetadata, VideoFrame};
use crate::config::Config;
use crate::detector::{DetectorOptions, LandmarkDetector};
use crate::landmarks::FaceLandmarks;
use crate::{Error, Result};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Receives the face of each processed frame; `None` means target lost
pub type FaceResultsCallback = Box<dyn FnMut(Option<&FaceLandmarks>)>;

/// Tracks at most one face.
///
/// Results are delivered two ways: pushed to a single subscriber registered
/// with [`FaceTracker::on_results`], and pulled with
/// [`FaceTracker::latest_result`]. Registering a second subscriber replaces the
/// first.
pub struct FaceTracker {
    detector: Option<Box<dyn LandmarkDetector>>,
    options: DetectorOptions,
    camera: CameraSession,
    latest: Option<Arc<FaceLandmarks>>,
    on_results: Option<FaceResultsCallback>,
    frames_processed: u64,
    destroyed: bool,
}

impl FaceTracker {
    #[must_use]
    pub fn new(detector: Box<dyn LandmarkDetector>, config: &Config) -> Self {
        let face = &config.face_tracking;
        Self {
            detector: Some(detector),
            options: DetectorOptions::face(
                face.refine_landmarks,
                face.min_detection_confidence,
                face.min_tracking_confidence,
            ),
            camera: CameraSession::new(config.camera.constraints(), config.camera.first_frame_timeout()),
            latest: None,
            on_results: None,
            frames_processed: 0,
            destroyed: false,
        }
    }

    /// Acquire the camera, bind the detector and start the frame pump
    ///
    /// # Errors
    ///
    /// Returns a classified camera error, a detector configuration error, or
    /// `InvalidState` after [`FaceTracker::destroy`]
    pub fn initialize(&mut self, camera: Box<dyn CameraSource>) -> Result<FrameMetadata> {
        if self.destroyed {
            return Err(Error::InvalidState("face tracker destroyed".to_string()));
        }
        info!("Initializing face tracker");

        let metadata = self.camera.bind(camera)?;
        let detector = self
            .detector
            .as_mut()
            .ok_or_else(|| Error::InvalidState("face detector released".to_string()))?;
        if let Err(e) = detector.configure(&self.options) {
            self.camera.release();
            return Err(e);
        }

        info!("Face tracker running");
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
            return Err(Error::InvalidState("face tracker destroyed".to_string()));
        }
        self.camera.start()
    }

    /// Halt the frame pump and the media stream; safe to repeat
    pub fn stop(&mut self) {
        self.camera.stop();
    }

    /// Register the single results subscriber, replacing any previous one
    pub fn on_results<F>(&mut self, callback: F)
    where
        F: FnMut(Option<&FaceLandmarks>) + 'static,
    {
        self.on_results = Some(Box::new(callback));
    }

    /// Pull the next frame from the stream and process it.
    ///
    /// Returns `Ok(false)` when no frame was ready or the tracker is stopped.
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

    /// Run detection on a host-supplied frame.
    ///
    /// Frames arriving while stopped are discarded. The result overwrites the
    /// previous one.
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

        let output = match detector.detect(frame) {
            Ok(output) => output,
            Err(e) => {
                self.latest = None;
                warn!("Face detection failed on frame {}: {}", frame.sequence, e);
                return Err(e);
            }
        };
        let face = output.faces.into_iter().next().and_then(FaceLandmarks::from_points);
        if face.is_none() {
            trace!("No face in frame {}", frame.sequence);
        }

        self.latest = face.map(Arc::new);
        self.frames_processed += 1;

        if let Some(callback) = self.on_results.as_mut() {
            callback(self.latest.as_deref());
        }
        Ok(true)
    }

    /// Most recent processed face, `None` if the last frame had none
    #[must_use]
    pub fn latest_result(&self) -> Option<Arc<FaceLandmarks>> {
        self.latest.clone()
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
        self.latest = None;
        self.destroyed = true;
        debug!("Face tracker destroyed after {} frames", self.frames_processed);
    }
}

impl Drop for FaceTracker {
    fn drop(&mut self) {
        self.destroy();
    }
}
