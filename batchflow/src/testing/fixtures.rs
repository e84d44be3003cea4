//! Test fixtures for batch runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::WorkItem;

/// Returns `count` synthetic items named `item-0.jpg`, `item-1.jpg`, ...
#[must_use]
pub fn sample_items(count: usize) -> Vec<WorkItem> {
    (0..count).map(|i| WorkItem::from(format!("item-{i}.jpg"))).collect()
}

/// Writes a solid-colour RGB image; the encoding follows the extension.
#[cfg(feature = "images")]
pub fn write_sample_image(path: impl AsRef<Path>, width: u32, height: u32) -> image::ImageResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([100, 200, 255]));
    img.save(path)
}

/// Writes bytes that no image decoder accepts.
pub fn write_corrupt_file(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, b"this is not an image")
}

/// A directory of input images plus an output directory beneath it.
#[derive(Debug, Clone)]
pub struct ImageDirFixture {
    root: PathBuf,
}

impl ImageDirFixture {
    /// Creates a fixture rooted at `root`, creating `input/` and `output/`.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let fixture = Self { root: root.into() };
        fs::create_dir_all(fixture.input_dir())?;
        Ok(fixture)
    }

    /// Returns the directory inputs are written to.
    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    /// Returns the directory processed images should be written to.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Returns the work item for an input file name, whether or not it exists.
    #[must_use]
    pub fn item(&self, file_name: &str) -> WorkItem {
        WorkItem::from(self.input_dir().join(file_name))
    }

    /// Writes a sample image and returns its work item.
    #[cfg(feature = "images")]
    pub fn image(&self, file_name: &str, width: u32, height: u32) -> image::ImageResult<WorkItem> {
        let item = self.item(file_name);
        write_sample_image(item.as_path(), width, height)?;
        Ok(item)
    }

    /// Writes a corrupt file and returns its work item.
    pub fn corrupt(&self, file_name: &str) -> io::Result<WorkItem> {
        let item = self.item(file_name);
        write_corrupt_file(item.as_path())?;
        Ok(item)
    }
}
