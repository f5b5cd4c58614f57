//! Platform camera backend built on nokhwa
//!
//! The device is opened and read on a dedicated capture thread. Decoded frames
//! reach the UI through a small bounded channel; the thread stops when the
//! stream is stopped or its receiver goes away.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread;

use image::RgbaImage;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, CameraInfo, FrameFormat, RequestedFormat,
    RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use tracing::{debug, info};

use super::camera::{CameraError, CaptureBackend, Facing, VideoConstraints, VideoStream};

const PREFERRED_FPS: u32 = 30;
/// Frames buffered between the capture thread and the UI
const FRAME_QUEUE: usize = 2;

type FrameResult = Result<RgbaImage, CameraError>;

/// Opens the system camera that best matches the requested facing
#[derive(Debug, Default)]
pub struct NativeBackend;

/// UI-side end of a running capture thread
pub struct NativeStream {
    frames: Receiver<FrameResult>,
    running: Arc<AtomicBool>,
}

impl CaptureBackend for NativeBackend {
    type Stream = NativeStream;

    /// Spawn the capture thread; device errors arrive on the first poll
    fn open(&mut self, constraints: &VideoConstraints) -> Result<NativeStream, CameraError> {
        let (tx, rx) = mpsc::sync_channel(FRAME_QUEUE);
        let running = Arc::new(AtomicBool::new(true));

        let constraints = *constraints;
        let flag = running.clone();
        thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                if let Err(e) = capture_loop(&constraints, &flag, &tx) {
                    let _ = tx.send(Err(e));
                }
                debug!("Camera capture thread finished");
            })
            .map_err(|e| CameraError::Open(e.to_string()))?;

        Ok(NativeStream {
            frames: rx,
            running,
        })
    }
}

impl VideoStream for NativeStream {
    fn poll_frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        let mut newest = None;
        loop {
            match self.frames.try_recv() {
                Ok(Ok(frame)) => newest = Some(frame),
                Ok(Err(e)) => return Err(e),
                Err(TryRecvError::Empty) => return Ok(newest),
                Err(TryRecvError::Disconnected) => {
                    return match newest {
                        Some(frame) => Ok(Some(frame)),
                        None => Err(CameraError::Frame("capture thread stopped".to_string())),
                    };
                }
            }
        }
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Body of the capture thread
fn capture_loop(
    constraints: &VideoConstraints,
    running: &AtomicBool,
    tx: &SyncSender<FrameResult>,
) -> Result<(), CameraError> {
    let mut camera = open_camera(constraints)?;

    let mut outcome = Ok(());
    while running.load(Ordering::Acquire) {
        match read_frame(&mut camera) {
            Ok(frame) => {
                // Receiver gone: the session was dropped
                if tx.send(Ok(frame)).is_err() {
                    break;
                }
            }
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        debug!("Stopping camera stream failed: {}", e);
    }
    outcome
}

fn open_camera(constraints: &VideoConstraints) -> Result<Camera, CameraError> {
    let devices =
        nokhwa::query(ApiBackend::Auto).map_err(|e| CameraError::Open(e.to_string()))?;
    let index = pick_device(&devices, constraints.facing).ok_or(CameraError::NoDevice)?;

    let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(
        CameraFormat::new(
            Resolution::new(constraints.width, constraints.height),
            FrameFormat::MJPEG,
            PREFERRED_FPS,
        ),
    ));

    let mut camera =
        Camera::new(index, requested).map_err(|e| CameraError::Open(e.to_string()))?;
    camera
        .open_stream()
        .map_err(|e| CameraError::Open(e.to_string()))?;

    let format = camera.camera_format();
    info!(
        "📷 Opened {} at {}x{}",
        camera.info().human_name(),
        format.width(),
        format.height()
    );
    Ok(camera)
}

fn read_frame(camera: &mut Camera) -> FrameResult {
    let buffer = camera
        .frame()
        .map_err(|e| CameraError::Frame(e.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbAFormat>()
        .map_err(|e| CameraError::Frame(e.to_string()))?;

    // nokhwa links its own `image` version, move the pixels across by hand
    let (width, height) = (decoded.width(), decoded.height());
    RgbaImage::from_raw(width, height, decoded.into_raw())
        .ok_or_else(|| CameraError::Frame("frame buffer size mismatch".to_string()))
}

/// Prefer a device whose name matches the requested facing, else the first one
fn pick_device(devices: &[CameraInfo], facing: Facing) -> Option<CameraIndex> {
    let names: Vec<String> = devices.iter().map(|d| d.human_name()).collect();
    let chosen = preferred_position(&names, facing)?;
    debug!("Camera candidates: {:?}, using {}", names, names[chosen]);
    Some(devices[chosen].index().clone())
}

fn preferred_position(names: &[String], facing: Facing) -> Option<usize> {
    let keywords: &[&str] = match facing {
        Facing::Environment => &["rear", "back", "environment", "world"],
        Facing::User => &["front", "user", "facetime", "integrated"],
    };

    names
        .iter()
        .position(|name| {
            let name = name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
        .or_else(|| (!names.is_empty()).then_some(0))
}
