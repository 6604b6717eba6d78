//! Camera/media acquisition boundary and the stream lifecycle shared by both trackers.

use crate::constants::{DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH};
use crate::error::{CameraError, Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Which physical camera to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing (selfie) camera
    User,
    /// Rear camera
    Environment,
}

/// Stream acquisition constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
    /// Ideal width, the source may deliver something else
    pub width: u32,
    /// Ideal height, the source may deliver something else
    pub height: u32,
    pub frame_rate: Option<u32>,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            frame_rate: None,
        }
    }
}

/// Dimensions reported once the stream delivers its first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetadata {
    pub width: u32,
    pub height: u32,
}

/// One captured video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Monotonic frame counter assigned by the stream
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    /// Capture time relative to stream start
    pub timestamp: Duration,
    /// Encoded or raw pixel data, opaque to the tracking core
    pub data: Arc<[u8]>,
}

/// A live media stream exclusively owned by one tracker
pub trait MediaStream {
    /// Block up to `timeout` for the first frame's metadata
    fn wait_for_metadata(&mut self, timeout: Duration) -> Option<FrameMetadata>;

    /// The next frame, or `None` when no new frame is ready
    fn next_frame(&mut self) -> Option<VideoFrame>;

    /// Halt every track of the stream; must tolerate repeated calls
    fn stop(&mut self);
}

/// Something that can open camera streams
pub trait CameraSource {
    /// Acquire a stream, classifying failures
    ///
    /// # Errors
    ///
    /// Returns the classified reason the stream could not be acquired
    fn open(&mut self, constraints: &CameraConstraints) -> std::result::Result<Box<dyn MediaStream>, CameraError>;
}

/// Camera lifecycle: bind, start, stop, release.
///
/// Frames are only handed out while running. Stopping drops the stream; a
/// later `start` re-opens it from the bound source.
pub struct CameraSession {
    constraints: CameraConstraints,
    first_frame_timeout: Duration,
    source: Option<Box<dyn CameraSource>>,
    stream: Option<Box<dyn MediaStream>>,
    metadata: Option<FrameMetadata>,
    running: bool,
}

impl CameraSession {
    #[must_use]
    pub fn new(constraints: CameraConstraints, first_frame_timeout: Duration) -> Self {
        Self {
            constraints,
            first_frame_timeout,
            source: None,
            stream: None,
            metadata: None,
            running: false,
        }
    }

    /// Bind a camera source, open its stream and wait for the first frame
    ///
    /// # Errors
    ///
    /// Returns a classified [`CameraError`] when the stream cannot be opened or
    /// stays silent past the first-frame timeout
    pub fn bind(&mut self, source: Box<dyn CameraSource>) -> Result<FrameMetadata> {
        self.stop();
        self.source = Some(source);
        self.metadata = None;
        match self.open_stream() {
            Ok(metadata) => {
                self.running = true;
                Ok(metadata)
            }
            Err(e) => {
                self.source = None;
                Err(e)
            }
        }
    }

    /// Resume handing out frames, re-opening the stream if it was stopped
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no source was bound, or a camera error if
    /// re-opening fails
    pub fn start(&mut self) -> Result<()> {
        if self.source.is_none() {
            return Err(Error::InvalidState("camera not initialized".to_string()));
        }
        if self.stream.is_none() {
            self.open_stream()?;
        }
        self.running = true;
        Ok(())
    }

    /// Stop handing out frames and halt the stream tracks
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(mut stream) = self.stream.take() {
            debug!("Stopping media stream tracks");
            stream.stop();
        }
    }

    /// Stop and forget the bound source
    pub fn release(&mut self) {
        self.stop();
        if self.source.take().is_some() {
            info!("Camera released");
        }
        self.metadata = None;
    }

    /// Next frame while running
    pub fn next_frame(&mut self) -> Option<VideoFrame> {
        if !self.running {
            return None;
        }
        self.stream.as_mut()?.next_frame()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    #[must_use]
    pub fn metadata(&self) -> Option<FrameMetadata> {
        self.metadata
    }

    fn open_stream(&mut self) -> Result<FrameMetadata> {
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| Error::InvalidState("camera not initialized".to_string()))?;

        info!(
            "Opening {:?} camera at {}x{}",
            self.constraints.facing_mode, self.constraints.width, self.constraints.height
        );
        let mut stream = source.open(&self.constraints)?;

        let Some(metadata) = stream.wait_for_metadata(self.first_frame_timeout) else {
            warn!(
                "No video frame within {} ms, giving up",
                self.first_frame_timeout.as_millis()
            );
            stream.stop();
            return Err(CameraError::InitFailure(format!(
                "no video frame within {} ms",
                self.first_frame_timeout.as_millis()
            ))
            .into());
        };

        info!("Camera stream ready at {}x{}", metadata.width, metadata.height);
        self.metadata = Some(metadata);
        self.stream = Some(stream);
        Ok(metadata)
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}
