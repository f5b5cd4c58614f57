//! Camera image source
//!
//! Two-phase protocol: `Idle` until the user opens the camera, then
//! `Streaming` until they capture a photo or cancel. The live stream is owned
//! by a `CameraSession`; dropping the session stops the stream, so every exit
//! path (capture, cancel, read error) releases the device.
//!
//! Streams are polled, never waited on: backends deliver frames from their
//! own thread and `poll_frame` only picks up what has already arrived.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::data::EncodedImage;

/// Shown under the camera card when the device cannot be used
pub const CAMERA_ERROR_MESSAGE: &str =
    "Unable to access camera. Please check permissions and try again.";

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no camera backend available")]
    Unavailable,
    #[error("no camera found")]
    NoDevice,
    #[error("failed to open camera: {0}")]
    Open(String),
    #[error("failed to read frame: {0}")]
    Frame(String),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// Which way the device should face, when the platform can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear camera, pointing away from the user
    Environment,
    /// Front camera
    User,
}

/// Requested stream parameters; backends treat them as preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing: Facing::Environment,
        }
    }
}

/// A live stream on an acquired device
pub trait VideoStream {
    /// Newest frame delivered since the last poll, `None` if nothing new arrived
    fn poll_frame(&mut self) -> Result<Option<RgbaImage>, CameraError>;
    /// Stop the stream and release the device
    fn stop(&mut self);
}

/// Opens live streams
pub trait CaptureBackend {
    type Stream: VideoStream;

    fn open(&mut self, constraints: &VideoConstraints) -> Result<Self::Stream, CameraError>;
}

/// Owned guard over an acquired stream
pub struct CameraSession<S: VideoStream> {
    stream: S,
    /// Last frame seen, kept for capture
    latest: Option<RgbaImage>,
}

impl<S: VideoStream> CameraSession<S> {
    fn new(stream: S) -> Self {
        Self {
            stream,
            latest: None,
        }
    }

    /// Pick up a newer frame if one arrived; returns whether `latest` changed
    fn refresh(&mut self) -> Result<bool, CameraError> {
        match self.stream.poll_frame()? {
            Some(frame) => {
                self.latest = Some(frame);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<S: VideoStream> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("Camera stream released");
    }
}

/// Provider lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPhase {
    Idle,
    Streaming,
}

/// The camera image source
pub struct CameraProvider<B: CaptureBackend> {
    backend: B,
    constraints: VideoConstraints,
    session: Option<CameraSession<B::Stream>>,
    error: Option<String>,
}

impl<B: CaptureBackend> CameraProvider<B> {
    pub fn new(backend: B) -> Self {
        Self::with_constraints(backend, VideoConstraints::default())
    }

    pub fn with_constraints(backend: B, constraints: VideoConstraints) -> Self {
        Self {
            backend,
            constraints,
            session: None,
            error: None,
        }
    }

    pub fn phase(&self) -> CameraPhase {
        if self.session.is_some() {
            CameraPhase::Streaming
        } else {
            CameraPhase::Idle
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    /// User-facing error from the last failed acquisition
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Acquire the device and start streaming. No-op while already streaming.
    pub fn start(&mut self) {
        if self.session.is_some() {
            debug!("Camera already streaming, ignoring activation");
            return;
        }

        self.error = None;
        match self.backend.open(&self.constraints) {
            Ok(stream) => {
                info!(
                    "📷 Camera streaming (requested {}x{}, {:?})",
                    self.constraints.width, self.constraints.height, self.constraints.facing
                );
                self.session = Some(CameraSession::new(stream));
            }
            Err(e) => self.fail(e),
        }
    }

    /// New live frame for the viewfinder, `None` when nothing new arrived.
    ///
    /// A read failure ends the session and reverts to `Idle` with an error.
    pub fn preview(&mut self) -> Option<RgbaImage> {
        let session = self.session.as_mut()?;
        match session.refresh() {
            Ok(true) => session.latest.clone(),
            Ok(false) => None,
            Err(e) => {
                self.session = None;
                self.fail(e);
                None
            }
        }
    }

    /// Take the newest frame, release the stream, and encode the frame as JPEG.
    ///
    /// Returns `None` when not streaming or when the capture failed; in the
    /// latter case `error()` explains why. Before the first frame arrives the
    /// request is ignored and the stream keeps running.
    pub fn capture(&mut self) -> Option<EncodedImage> {
        let session = self.session.as_mut()?;
        if let Err(e) = session.refresh() {
            self.session = None;
            self.fail(e);
            return None;
        }

        let Some(frame) = session.latest.take() else {
            debug!("No frame yet, ignoring capture");
            return None;
        };
        self.session = None;

        match encode_jpeg(frame) {
            Ok(image) => {
                info!("📸 Captured photo from camera");
                Some(image)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Release the stream without delivering anything
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            info!("Camera cancelled");
        }
        self.error = None;
    }

    fn fail(&mut self, error: CameraError) {
        warn!("⚠️  Camera error: {}", error);
        self.error = Some(CAMERA_ERROR_MESSAGE.to_string());
    }
}

/// Encode a captured frame as a JPEG data URI
pub fn encode_jpeg(frame: RgbaImage) -> Result<EncodedImage, CameraError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(frame).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb).write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(EncodedImage::from_bytes("image/jpeg", &out.into_inner()))
}

/// Backend used when the crate is built without camera support
#[cfg_attr(feature = "camera", allow(dead_code))]
#[derive(Debug, Default)]
pub struct UnavailableBackend;

/// Never constructed; `UnavailableBackend` cannot open a stream
#[cfg_attr(feature = "camera", allow(dead_code))]
pub struct NoStream;

impl VideoStream for NoStream {
    fn poll_frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        Err(CameraError::Unavailable)
    }

    fn stop(&mut self) {}
}

impl CaptureBackend for UnavailableBackend {
    type Stream = NoStream;

    fn open(&mut self, _constraints: &VideoConstraints) -> Result<NoStream, CameraError> {
        Err(CameraError::Unavailable)
    }
}
