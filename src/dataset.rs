//! Image folder datasets.
//!
//! Images are discovered as `*.jpg` files under `root/name/split`, either
//! directly or one level down in per-class sub-folders. The file list is
//! shuffled once and truncated to the split's size.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray::{stack, Array3, ArrayView3, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::image::{load_image, ImageTransform, DEFAULT_IMAGE_SIZE};
use crate::tensor::ImageBatch;

const IMAGE_EXTENSION: &str = "jpg";

/// Dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Split {
    #[default]
    Train,
    Val,
    Test,
}

impl Split {
    /// Directory name of the split.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }

    /// Maximum number of images kept for the split.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Train => 16_384,
            Self::Val => 1_024,
            Self::Test => 32,
        }
    }
}

impl FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(Self::Train),
            "val" => Ok(Self::Val),
            "test" => Ok(Self::Test),
            other => Err(Error::invalid(
                "split",
                format!("unknown split {other:?} (expected train, val or test)"),
            )),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Where and how to load a dataset.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Directory holding all datasets.
    pub root: PathBuf,

    /// Dataset directory name under `root`.
    pub name: String,

    /// Partition to load.
    pub split: Split,

    /// Images live in sub-folders of the split directory.
    pub sub_folder: bool,

    /// Side length images are resized to.
    pub image_size: u32,

    /// Tensor conversion applied to each image.
    pub transform: ImageTransform,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            name: String::new(),
            split: Split::Train,
            sub_folder: true,
            image_size: DEFAULT_IMAGE_SIZE,
            transform: ImageTransform::default(),
        }
    }
}

impl DatasetConfig {
    /// Directory of the configured split.
    #[must_use]
    pub fn split_dir(&self) -> PathBuf {
        self.root.join(&self.name).join(self.split.dir_name())
    }
}

/// A shuffled list of image files.
#[derive(Debug, Clone)]
pub struct Dataset {
    config: DatasetConfig,
    images: Vec<PathBuf>,
}

impl Dataset {
    /// Discover, shuffle and truncate the image list.
    ///
    /// # Errors
    ///
    /// Returns an error if the split directory cannot be read or holds no
    /// images.
    pub fn open<R: Rng + ?Sized>(config: DatasetConfig, rng: &mut R) -> Result<Self> {
        if config.image_size == 0 {
            return Err(Error::invalid("image_size", "must be greater than 0"));
        }

        let dir = config.split_dir();
        let mut images = if config.sub_folder {
            let mut images = Vec::new();
            for sub in sub_folders(&dir)? {
                images.extend(image_files(&sub)?);
            }
            images
        } else {
            image_files(&dir)?
        };

        if images.is_empty() {
            return Err(Error::EmptyDataset { path: dir });
        }

        images.shuffle(rng);
        images.truncate(config.split.size());

        tracing::info!(
            split = %config.split,
            count = images.len(),
            "loaded dataset index from {}",
            dir.display()
        );

        Ok(Self { config, images })
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image paths in shuffled order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.images
    }

    /// Configuration the dataset was opened with.
    #[must_use]
    pub const fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Load image `index` as a `(3, size, size)` tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the image cannot be
    /// loaded.
    pub fn get(&self, index: usize) -> Result<Array3<f32>> {
        let path = self.images.get(index).ok_or_else(|| {
            Error::invalid(
                "index",
                format!("{index} out of range for {} images", self.images.len()),
            )
        })?;

        let image = load_image(path, self.config.image_size)?;
        Ok(self.config.transform.transform(&image))
    }

    /// Load and stack several images into an `(N, 3, size, size)` batch.
    ///
    /// # Errors
    ///
    /// Returns an error if any image fails to load or `indices` is empty.
    pub fn batch(&self, indices: &[usize]) -> Result<ImageBatch> {
        if indices.is_empty() {
            return Err(Error::invalid("indices", "at least one index is required"));
        }

        let samples = indices
            .iter()
            .map(|&i| self.get(i))
            .collect::<Result<Vec<_>>>()?;
        let views: Vec<ArrayView3<'_, f32>> = samples.iter().map(|s| s.view()).collect();

        stack(Axis(0), &views)
            .map_err(|err| Error::shape("equally sized images", err.to_string()))
    }

    /// Consecutive batches of at most `batch_size` images in shuffled order.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Result<ImageBatch>> + '_ {
        let chunk = batch_size.max(1);
        let len = self.len();
        (0..len.div_ceil(chunk)).map(move |b| {
            let start = b * chunk;
            let indices: Vec<usize> = (start..(start + chunk).min(len)).collect();
            self.batch(&indices)
        })
    }
}

fn sub_folders(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(IMAGE_EXTENSION)
        })
        .collect();
    files.sort();
    Ok(files)
}
