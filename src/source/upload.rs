//! File upload image source
//!
//! The user picks a file with the native dialog; it is read fully into
//! memory off the UI thread and encoded as a data URI with its sniffed MIME type.

use std::path::{Path, PathBuf};

use rfd::FileDialog;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::data::EncodedImage;

/// Extensions offered in the file picker
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tif", "tiff"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a supported image")]
    NotAnImage(PathBuf),
}

/// Show the native picker; `None` when the user cancels
pub fn pick_image_file() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select an Eye Image")
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
}

/// Read an image file and encode it as a data URI
pub async fn load_image(path: PathBuf) -> Result<EncodedImage, UploadError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| UploadError::Read {
            path: path.clone(),
            source,
        })?;

    encode_image_bytes(&path, &bytes)
}

/// Sniff the format from the content, not the extension
fn encode_image_bytes(path: &Path, bytes: &[u8]) -> Result<EncodedImage, UploadError> {
    let format = image::guess_format(bytes).map_err(|_| {
        warn!("⚠️  Rejected {}: unrecognized image format", path.display());
        UploadError::NotAnImage(path.to_path_buf())
    })?;

    info!(
        "📁 Loaded {} ({} KB, {:?})",
        path.display(),
        bytes.len() / 1024,
        format
    );

    Ok(EncodedImage::from_bytes(format.to_mime_type(), bytes))
}
