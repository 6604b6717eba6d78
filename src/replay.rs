//! Recorded detector output played back through the camera and detector seams.
//!
//! A recording is a YAML document listing, per video frame, the raw faces and
//! hands a detector reported. [`ReplayCamera`] produces one frame per entry and
//! [`ReplayDetector`] answers each frame with its recorded output, so a full
//! session runs offline and deterministically.

use crate::camera::{CameraConstraints, CameraSource, FrameMetadata, MediaStream, VideoFrame};
use crate::detector::{DetectorOptions, DetectorOutput, LandmarkDetector};
use crate::error::CameraError;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Detector output captured frame by frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    pub width: u32,
    pub height: u32,
    /// Capture interval between frames
    pub frame_interval_ms: u64,
    pub frames: Vec<DetectorOutput>,
}

impl Default for Recording {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_interval_ms: 33,
            frames: Vec::new(),
        }
    }
}

impl Recording {
    #[must_use]
    pub fn new(frames: Vec<DetectorOutput>) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Load a recording from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `InvalidInput` if it does not parse
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a recording from YAML text
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text does not parse
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::InvalidInput(format!("Failed to parse recording: {e}")))
    }

    /// Save a recording as YAML
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if serialization fails, `Io` if the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize recording: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Camera producing one frame per recorded entry
pub struct ReplayCamera {
    recording: Arc<Recording>,
    opens: usize,
}

impl ReplayCamera {
    #[must_use]
    pub fn new(recording: Arc<Recording>) -> Self {
        Self { recording, opens: 0 }
    }
}

impl CameraSource for ReplayCamera {
    fn open(&mut self, constraints: &CameraConstraints) -> std::result::Result<Box<dyn MediaStream>, CameraError> {
        self.opens += 1;
        log::debug!(
            "Opening replay stream #{} ({:?} requested at {}x{})",
            self.opens,
            constraints.facing_mode,
            constraints.width,
            constraints.height
        );
        Ok(Box::new(ReplayStream {
            recording: Arc::clone(&self.recording),
            next: 0,
            stopped: false,
        }))
    }
}

struct ReplayStream {
    recording: Arc<Recording>,
    next: usize,
    stopped: bool,
}

impl MediaStream for ReplayStream {
    fn wait_for_metadata(&mut self, _timeout: Duration) -> Option<FrameMetadata> {
        // an empty recording never delivers a frame
        (!self.recording.is_empty()).then_some(FrameMetadata {
            width: self.recording.width,
            height: self.recording.height,
        })
    }

    fn next_frame(&mut self) -> Option<VideoFrame> {
        if self.stopped || self.next >= self.recording.len() {
            return None;
        }
        let sequence = self.next as u64;
        self.next += 1;

        Some(VideoFrame {
            sequence,
            width: self.recording.width,
            height: self.recording.height,
            timestamp: self.recording.frame_interval() * self.next as u32,
            data: Arc::from(Vec::new()),
        })
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Detector answering each frame with its recorded output
pub struct ReplayDetector {
    recording: Arc<Recording>,
    configurations: Rc<RefCell<Vec<DetectorOptions>>>,
    closed: bool,
}

impl ReplayDetector {
    #[must_use]
    pub fn new(recording: Arc<Recording>) -> Self {
        Self {
            recording,
            configurations: Rc::default(),
            closed: false,
        }
    }

    /// Shared log of every configuration applied, readable after the detector moves
    #[must_use]
    pub fn configurations(&self) -> Rc<RefCell<Vec<DetectorOptions>>> {
        Rc::clone(&self.configurations)
    }
}

impl LandmarkDetector for ReplayDetector {
    fn configure(&mut self, options: &DetectorOptions) -> Result<()> {
        if self.closed {
            return Err(Error::Detector("detector closed".to_string()));
        }
        self.configurations.borrow_mut().push(options.clone());
        Ok(())
    }

    fn detect(&mut self, frame: &VideoFrame) -> Result<DetectorOutput> {
        if self.closed {
            return Err(Error::Detector("detector closed".to_string()));
        }
        let output = usize::try_from(frame.sequence)
            .ok()
            .and_then(|index| self.recording.frames.get(index))
            .cloned()
            .unwrap_or_default();
        Ok(output)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
