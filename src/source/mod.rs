/// Image source providers
///
/// Each source delivers at most one encoded still image per user action:
/// - File upload through the native picker (upload.rs)
/// - Live camera capture (camera.rs), backed by the platform camera
///   stack when the `camera` feature is enabled (native.rs)

pub mod camera;
#[cfg(test)]
pub mod fake;
#[cfg(feature = "camera")]
pub mod native;
pub mod upload;

/// Camera backend compiled into this build
#[cfg(feature = "camera")]
pub type DeviceBackend = native::NativeBackend;
#[cfg(not(feature = "camera"))]
pub type DeviceBackend = camera::UnavailableBackend;
