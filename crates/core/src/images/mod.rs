pub mod thumbnail;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::{recognised_format, ImageInput, ImageRef};
use crate::error::{Error, Result};

/// JPEG quality used when encoding rasters (compression factor 0.8).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

const PARTIAL_SUFFIX: &str = ".partial";

/// Where and how the repository stores images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub root: PathBuf,
    pub jpeg_quality: u8,
}

impl RepositoryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }

    /// `$HOME/.namefaces/images`, or `./.namefaces/images` without a home directory.
    pub fn default_root() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".namefaces").join("images")
    }
}

/// Flat, user-private directory holding one file per stored image, named by its ref.
pub struct ImageRepository {
    root: PathBuf,
    jpeg_quality: u8,
}

impl ImageRepository {
    /// Open the repository, creating its directory if needed.
    pub fn open(config: RepositoryConfig) -> Result<Self> {
        if !(1..=100).contains(&config.jpeg_quality) {
            return Err(Error::InvalidQuality(config.jpeg_quality));
        }
        fs::create_dir_all(&config.root)?;
        debug!(root = %config.root.display(), "opened image repository");
        Ok(Self {
            root: config.root,
            jpeg_quality: config.jpeg_quality,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Path of the file backing `image_ref`, or `None` if the ref can't name a
    /// file directly inside the repository.
    pub fn path_for(&self, image_ref: &ImageRef) -> Option<PathBuf> {
        image_ref
            .is_plain_file_name()
            .then(|| self.root.join(image_ref.as_str()))
    }

    pub fn exists(&self, image_ref: &ImageRef) -> bool {
        self.path_for(image_ref).is_some_and(|p| p.is_file())
    }

    /// Persist an image under a freshly generated ref.
    ///
    /// The bytes go to a hidden `.partial` file first and are renamed into place,
    /// so a failed write never leaves a file under the returned ref.
    pub fn store(&self, input: ImageInput) -> Result<ImageRef> {
        let bytes = self.encode(input)?;
        let image_ref = ImageRef::generate();
        let target = self.root.join(image_ref.as_str());
        let partial = self
            .root
            .join(format!(".{}{}", image_ref.as_str(), PARTIAL_SUFFIX));

        let written = write_then_rename(&partial, &target, &bytes);
        if let Err(source) = written {
            if partial.exists() {
                if let Err(e) = fs::remove_file(&partial) {
                    warn!(path = %partial.display(), error = %e, "could not remove partial image");
                }
            }
            warn!(%image_ref, error = %source, "image write failed");
            return Err(Error::WriteFailure { image_ref, source });
        }

        info!(%image_ref, bytes = bytes.len(), "stored image");
        Ok(image_ref)
    }

    /// Read back the stored bytes.
    pub fn load(&self, image_ref: &ImageRef) -> Result<Vec<u8>> {
        let path = self
            .path_for(image_ref)
            .ok_or_else(|| Error::NotFound(image_ref.clone()))?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(%image_ref, bytes = bytes.len(), "loaded image");
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(image_ref.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the stored file. Returns `Ok(false)` if there was nothing to delete.
    pub fn delete(&self, image_ref: &ImageRef) -> Result<bool> {
        let Some(path) = self.path_for(image_ref) else {
            return Ok(false);
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(%image_ref, "deleted image");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every image currently on disk, sorted by ref. Hidden and partial files are skipped.
    pub fn list(&self) -> Result<Vec<ImageRef>> {
        let mut refs = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            refs.push(ImageRef::from(name.into_owned()));
        }
        refs.sort();
        Ok(refs)
    }

    /// Square thumbnail of a stored image.
    pub fn thumbnail(&self, image_ref: &ImageRef, size: u32) -> Result<RgbImage> {
        let bytes = self.load(image_ref)?;
        thumbnail::generate(&bytes, size)
    }

    fn encode(&self, input: ImageInput) -> Result<Vec<u8>> {
        match input {
            ImageInput::Encoded(bytes) => {
                recognised_format(&bytes)?;
                Ok(bytes)
            }
            ImageInput::Raster(img) => {
                // JPEG has no alpha channel
                let rgb = img.to_rgb8();
                let mut buf = Vec::new();
                let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
                rgb.write_with_encoder(encoder)?;
                Ok(buf)
            }
        }
    }
}

fn write_then_rename(partial: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(partial)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(partial, target)
}
