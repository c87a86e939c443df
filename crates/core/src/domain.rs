use std::fmt;
use std::path::{Component, Path};

use image::{DynamicImage, ImageDecoder, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name given to a person until the user renames them.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Opaque identifier of a stored image. Doubles as its file name in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Generate a fresh random (UUID v4) reference.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the ref is a single, visible file name and can be joined onto the
    /// repository root without escaping it.
    pub fn is_plain_file_name(&self) -> bool {
        if self.0.is_empty() || self.0.starts_with('.') {
            return false;
        }
        let mut components = Path::new(&self.0).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) && !self.0.contains(['/', '\\'])
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One catalogued individual: a display name bound to a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub image_ref: ImageRef,
}

impl Person {
    /// A freshly added person, named [`UNKNOWN_NAME`].
    pub fn unnamed(image_ref: ImageRef) -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            image_ref,
        }
    }
}

/// An image handed over by the acquisition side (picker, camera, file).
pub enum ImageInput {
    /// Decoded pixels; encoded to JPEG on store.
    Raster(DynamicImage),
    /// Already-compressed bytes, written as-is.
    Encoded(Vec<u8>),
}

impl ImageInput {
    /// Decode an image file into an upright raster. The EXIF orientation is
    /// applied to the pixels; everything else beyond them (EXIF, color
    /// profiles) is dropped when the raster is re-encoded.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut decoder = image::ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut img = DynamicImage::from_decoder(decoder)?;
        img.apply_orientation(orientation);
        Ok(Self::Raster(img))
    }
}

/// Formats accepted for [`ImageInput::Encoded`].
pub(crate) fn recognised_format(bytes: &[u8]) -> Result<ImageFormat> {
    match image::guess_format(bytes) {
        Ok(
            format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP),
        ) => Ok(format),
        _ => Err(Error::UnrecognizedImage),
    }
}
