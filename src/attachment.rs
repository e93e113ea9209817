//! Image attachment: read a local image file into a data URI

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Maximum image size (5MB)
const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Accepted image media types
const SUPPORTED_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("Unsupported image format. Supported: png, jpeg, gif, webp")]
    Unsupported,
    #[error("Image too large: {size} bytes (max {max} bytes)", max = MAX_IMAGE_SIZE)]
    TooLarge { size: u64 },
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

fn media_type(path: &Path) -> Option<String> {
    let guess = mime_guess::from_path(path).first()?;
    let essence = guess.essence_str();
    SUPPORTED_TYPES
        .contains(&essence)
        .then(|| essence.to_string())
}

/// Read `path` and encode it as `data:<mime>;base64,<body>`
pub async fn load_image(path: &Path) -> Result<String, AttachmentError> {
    let metadata = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AttachmentError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile(path.to_path_buf()));
    }

    let media_type = media_type(path).ok_or(AttachmentError::Unsupported)?;

    if metadata.len() > MAX_IMAGE_SIZE {
        return Err(AttachmentError::TooLarge {
            size: metadata.len(),
        });
    }

    let data = fs::read(path).await?;
    Ok(format!("data:{media_type};base64,{}", BASE64.encode(&data)))
}
