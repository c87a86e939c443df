pub mod domain;
pub mod error;
pub mod images;
pub mod people;

use std::path::{Path, PathBuf};

use image::RgbImage;
use rayon::prelude::*;
use tracing::{info, warn};

use domain::{ImageInput, ImageRef, Person};
use error::{Error, Result};
use images::{thumbnail, ImageRepository, RepositoryConfig};
use people::People;

/// Callback events for [`Roster::add_batch`].
pub enum AddProgress {
    /// Starting a batch of `total` files.
    Start { total: usize },
    /// A file was stored and its person appended at `index`.
    Added { path: PathBuf, index: usize },
    /// A file could not be decoded or stored; the batch continues.
    Failed { path: PathBuf, error: Error },
    /// Batch completed.
    Complete { added: usize, failed: usize },
}

/// One grid cell: what the rendering side needs to draw a person.
pub struct Cell {
    pub index: usize,
    pub name: String,
    pub thumbnail: RgbImage,
    /// The image couldn't be loaded and `thumbnail` is the placeholder.
    pub missing: bool,
}

/// Proof that an add was started. Hand it back to [`Roster::finish_add`] or
/// [`Roster::cancel_add`]; only one can be outstanding at a time.
#[derive(Debug)]
#[must_use = "an unfinished add blocks further adds until cancelled"]
pub struct PendingAdd {
    _private: (),
}

/// The main entry point: the people on screen plus the images backing them.
pub struct Roster {
    people: People,
    images: ImageRepository,
    add_pending: bool,
}

impl Roster {
    /// Open a roster over the image repository described by `config`. The
    /// people list always starts empty.
    pub fn open(config: RepositoryConfig) -> Result<Self> {
        Ok(Self::with_repository(ImageRepository::open(config)?))
    }

    pub fn with_repository(images: ImageRepository) -> Self {
        Self {
            people: People::new(),
            images,
            add_pending: false,
        }
    }

    pub fn people(&self) -> &People {
        &self.people
    }

    pub fn images(&self) -> &ImageRepository {
        &self.images
    }

    pub fn count(&self) -> usize {
        self.people.count()
    }

    pub fn get(&self, index: usize) -> Result<&Person> {
        self.people.get(index)
    }

    /// Reserve the add slot. Fails with [`Error::AddInProgress`] while another
    /// add is pending, so a double tap can't produce two people.
    pub fn begin_add(&mut self) -> Result<PendingAdd> {
        if self.add_pending {
            return Err(Error::AddInProgress);
        }
        self.add_pending = true;
        Ok(PendingAdd { _private: () })
    }

    /// Store the picked image and append an unnamed person for it. Returns the
    /// new index. If storing fails nothing is appended. The add slot is released
    /// either way.
    pub fn finish_add(&mut self, pending: PendingAdd, input: ImageInput) -> Result<usize> {
        let PendingAdd { .. } = pending;
        self.add_pending = false;

        let image_ref = self.images.store(input)?;
        let index = self.people.add(Person::unnamed(image_ref));
        info!(index, "added person");
        Ok(index)
    }

    /// The picker was dismissed without an image.
    pub fn cancel_add(&mut self, pending: PendingAdd) {
        let PendingAdd { .. } = pending;
        self.add_pending = false;
    }

    pub fn add_person(&mut self, input: ImageInput) -> Result<usize> {
        let pending = self.begin_add()?;
        self.finish_add(pending, input)
    }

    /// Add one person per image file, in order. Files that fail to decode or
    /// store are reported and skipped.
    pub fn add_batch(
        &mut self,
        paths: &[PathBuf],
        mut progress_cb: Option<&mut dyn FnMut(AddProgress)>,
    ) -> Result<Vec<usize>> {
        if let Some(ref mut cb) = progress_cb {
            cb(AddProgress::Start { total: paths.len() });
        }

        let mut added = Vec::new();
        let mut failed = 0usize;
        for path in paths {
            match self.add_path(path) {
                Ok(index) => {
                    added.push(index);
                    if let Some(ref mut cb) = progress_cb {
                        cb(AddProgress::Added {
                            path: path.clone(),
                            index,
                        });
                    }
                }
                Err(Error::AddInProgress) => return Err(Error::AddInProgress),
                Err(error) => {
                    failed += 1;
                    warn!(path = %path.display(), %error, "skipping image");
                    if let Some(ref mut cb) = progress_cb {
                        cb(AddProgress::Failed {
                            path: path.clone(),
                            error,
                        });
                    }
                }
            }
        }

        if let Some(ref mut cb) = progress_cb {
            cb(AddProgress::Complete {
                added: added.len(),
                failed,
            });
        }
        Ok(added)
    }

    fn add_path(&mut self, path: &Path) -> Result<usize> {
        let pending = self.begin_add()?;
        match ImageInput::from_path(path) {
            Ok(input) => self.finish_add(pending, input),
            Err(e) => {
                self.cancel_add(pending);
                Err(e)
            }
        }
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        self.people.rename(index, name)?;
        info!(index, "renamed person");
        Ok(())
    }

    /// Remove the person at `index` and delete their image file. An image that
    /// is already gone doesn't block removal; any other delete failure leaves
    /// the person in place.
    pub fn remove(&mut self, index: usize) -> Result<Person> {
        let image_ref = self.people.get(index)?.image_ref.clone();
        self.images.delete(&image_ref)?;
        let person = self.people.remove(index)?;
        info!(index, %image_ref, "removed person");
        Ok(person)
    }

    /// Raw stored bytes of the image for the person at `index`.
    pub fn load_image(&self, index: usize) -> Result<Vec<u8>> {
        let person = self.people.get(index)?;
        self.images.load(&person.image_ref)
    }

    pub fn thumbnail(&self, index: usize, size: u32) -> Result<RgbImage> {
        let person = self.people.get(index)?;
        self.images.thumbnail(&person.image_ref, size)
    }

    /// One cell per person, in order. Thumbnails are built in parallel; images
    /// that are missing or undecodable get the placeholder.
    pub fn cells(&self, size: u32) -> Vec<Cell> {
        let people: Vec<&Person> = self.people.iter().collect();
        people
            .par_iter()
            .enumerate()
            .map(|(index, person)| {
                let (thumbnail, missing) = match self.images.thumbnail(&person.image_ref, size) {
                    Ok(thumb) => (thumb, false),
                    Err(error) => {
                        warn!(index, image_ref = %person.image_ref, %error, "using placeholder");
                        (thumbnail::placeholder(size), true)
                    }
                };
                Cell {
                    index,
                    name: person.name.clone(),
                    thumbnail,
                    missing,
                }
            })
            .collect()
    }

    /// Stored images no person refers to.
    pub fn orphans(&self) -> Result<Vec<ImageRef>> {
        Ok(self
            .images
            .list()?
            .into_iter()
            .filter(|r| !self.people.contains_ref(r))
            .collect())
    }

    /// Delete every orphaned image. Returns how many files were removed.
    pub fn prune_orphans(&self) -> Result<usize> {
        let mut removed = 0;
        for image_ref in self.orphans()? {
            if self.images.delete(&image_ref)? {
                removed += 1;
            }
        }
        info!(removed, "pruned orphaned images");
        Ok(removed)
    }
}
