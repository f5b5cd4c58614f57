//! In-memory camera backend for tests
//!
//! Counts live streams so tests can check the device is always released.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use super::camera::{CameraError, CaptureBackend, Facing, VideoConstraints, VideoStream};

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub active: Arc<AtomicUsize>,
    pub opened: Arc<AtomicUsize>,
    /// Refuse to open, like a denied permission
    pub deny: bool,
    /// Every poll fails, like an unplugged device
    pub broken_frames: bool,
    /// Polls that report no frame before the first one arrives
    pub warmup: usize,
}

impl FakeBackend {
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

pub struct FakeStream {
    active: Arc<AtomicUsize>,
    broken: bool,
    warmup: usize,
    stopped: bool,
}

impl VideoStream for FakeStream {
    fn poll_frame(&mut self) -> Result<Option<RgbaImage>, CameraError> {
        if self.broken {
            return Err(CameraError::Frame("device unplugged".to_string()));
        }
        if self.warmup > 0 {
            self.warmup -= 1;
            return Ok(None);
        }
        Ok(Some(RgbaImage::from_pixel(8, 6, Rgba([10, 120, 200, 255]))))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl CaptureBackend for FakeBackend {
    type Stream = FakeStream;

    fn open(&mut self, constraints: &VideoConstraints) -> Result<FakeStream, CameraError> {
        assert_eq!((constraints.width, constraints.height), (1280, 720));
        assert_eq!(constraints.facing, Facing::Environment);

        if self.deny {
            return Err(CameraError::Open("permission denied".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStream {
            active: self.active.clone(),
            broken: self.broken_frames,
            warmup: self.warmup,
            stopped: false,
        })
    }
}
