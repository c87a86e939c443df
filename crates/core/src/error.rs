use crate::domain::ImageRef;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("index {index} out of bounds (roster has {len} people)")]
    OutOfBounds { index: usize, len: usize },

    #[error("image not found: {0}")]
    NotFound(ImageRef),

    #[error("failed to write image {image_ref}: {source}")]
    WriteFailure {
        image_ref: ImageRef,
        #[source]
        source: std::io::Error,
    },

    #[error("name must not be empty")]
    EmptyName,

    #[error("an add is already in progress")]
    AddInProgress,

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("input is not a recognised image (expected JPEG, PNG, TIFF or WebP)")]
    UnrecognizedImage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("image buffer error: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
