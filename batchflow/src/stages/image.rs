//! Image processing stages: load, resize, grayscale, save.
//!
//! Every stage works on an [`ImageJob`]. Decoding, resampling and encoding
//! are CPU-bound, so they run on tokio's blocking pool.

use super::{Stage, StageChain};
use crate::config::{ImagePipelineConfig, ResizeFilter};
use crate::core::WorkItem;
use crate::errors::{ConfigError, FailureKind, StageFailure};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The value threaded through the image stages for one item.
#[derive(Debug, Clone)]
pub struct ImageJob {
    source: PathBuf,
    image: Option<DynamicImage>,
    output: Option<PathBuf>,
}

impl ImageJob {
    /// Returns the source path.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the decoded image, if one has been loaded.
    #[must_use]
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    /// Returns where the image was written, once saved.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Replaces the image.
    #[must_use]
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = Some(image);
        self
    }

    fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    fn take_image(&mut self, item: &WorkItem, kind: FailureKind) -> Result<DynamicImage, StageFailure> {
        self.image
            .take()
            .ok_or_else(|| StageFailure::new(kind, item.clone(), "no image loaded"))
    }
}

impl From<WorkItem> for ImageJob {
    fn from(item: WorkItem) -> Self {
        Self {
            source: item.as_path().to_path_buf(),
            image: None,
            output: None,
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Gaussian => Self::Gaussian,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Runs CPU-bound or blocking work off the async workers.
async fn run_blocking<T, F>(item: &WorkItem, work: F) -> Result<T, StageFailure>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StageFailure> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StageFailure::panicked(item.clone(), e.to_string()))?
}

/// Decodes the source image, guessing the format from its content.
#[derive(Debug, Clone, Default)]
pub struct LoadImageStage;

impl LoadImageStage {
    /// Creates a new load stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn load_image(item: &WorkItem, path: &Path) -> Result<DynamicImage, StageFailure> {
    if path.as_os_str().is_empty() {
        return Err(StageFailure::missing_input(item.clone(), "empty file path provided"));
    }

    let file = File::open(path).map_err(|e| {
        StageFailure::missing_input(item.clone(), format!("failed to open image file: {e}"))
    })?;

    ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|e| StageFailure::decode(item.clone(), e.to_string()))?
        .decode()
        .map_err(|e| StageFailure::decode(item.clone(), e.to_string()))
}

#[async_trait]
impl Stage<ImageJob> for LoadImageStage {
    fn name(&self) -> &str {
        "load"
    }

    async fn apply(&self, item: &WorkItem, job: ImageJob) -> Result<ImageJob, StageFailure> {
        let owned_item = item.clone();
        let source = job.source.clone();
        let image = run_blocking(item, move || load_image(&owned_item, &source)).await?;

        debug!(item = %item, width = image.width(), height = image.height(), "Image decoded");
        Ok(job.with_image(image))
    }
}

/// Resizes the image to exact target dimensions.
#[derive(Debug, Clone)]
pub struct ResizeStage {
    width: u32,
    height: u32,
    filter: ResizeFilter,
}

impl ResizeStage {
    /// Creates a new resize stage.
    #[must_use]
    pub fn new(width: u32, height: u32, filter: ResizeFilter) -> Self {
        Self {
            width,
            height,
            filter,
        }
    }
}

#[async_trait]
impl Stage<ImageJob> for ResizeStage {
    fn name(&self) -> &str {
        "resize"
    }

    async fn apply(&self, item: &WorkItem, mut job: ImageJob) -> Result<ImageJob, StageFailure> {
        let image = job.take_image(item, FailureKind::TransformFailure)?;
        if self.width == 0 || self.height == 0 {
            return Err(StageFailure::transform(
                item.clone(),
                format!("invalid target size {}x{}", self.width, self.height),
            ));
        }

        let (width, height, filter) = (self.width, self.height, FilterType::from(self.filter));
        let resized = run_blocking(item, move || Ok(image.resize_exact(width, height, filter))).await?;

        Ok(job.with_image(resized))
    }
}

/// Converts the image to 8-bit grayscale, dropping any alpha channel.
#[derive(Debug, Clone, Default)]
pub struct GrayscaleStage;

impl GrayscaleStage {
    /// Creates a new grayscale stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage<ImageJob> for GrayscaleStage {
    fn name(&self) -> &str {
        "grayscale"
    }

    async fn apply(&self, item: &WorkItem, mut job: ImageJob) -> Result<ImageJob, StageFailure> {
        let image = job.take_image(item, FailureKind::TransformFailure)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(StageFailure::transform(item.clone(), "image has no bounds"));
        }

        let gray = run_blocking(item, move || Ok(DynamicImage::ImageLuma8(image.to_luma8()))).await?;

        Ok(job.with_image(gray))
    }
}

/// Writes the image into an output directory under the source file name.
///
/// The encoding follows the lower-cased extension: `.jpg`/`.jpeg` or `.png`.
/// Items sharing a file name map to the same output file; run
/// [`check_output_names`] over the batch before processing it.
#[derive(Debug, Clone)]
pub struct SaveImageStage {
    output_dir: PathBuf,
}

impl SaveImageStage {
    /// Creates a new save stage.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn format_for(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        _ => None,
    }
}

fn write_image(item: &WorkItem, path: &Path, image: &DynamicImage) -> Result<(), StageFailure> {
    let format = format_for(path).ok_or_else(|| {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        StageFailure::write(item.clone(), format!("unsupported image format: {ext}"))
    })?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            StageFailure::write(item.clone(), format!("failed to create output directory: {e}"))
        })?;
    }

    let file = File::create(path).map_err(|e| {
        StageFailure::write(item.clone(), format!("failed to create output file: {e}"))
    })?;

    let written = encode_into(BufWriter::new(file), image, format);
    if let Err(cause) = written {
        // A failed item leaves no partial output behind.
        if let Err(e) = fs::remove_file(path) {
            debug!(item = %item, output = %path.display(), error = %e, "Failed to remove partial output");
        }
        return Err(StageFailure::write(item.clone(), cause));
    }
    Ok(())
}

fn encode_into(mut writer: BufWriter<File>, image: &DynamicImage, format: ImageFormat) -> Result<(), String> {
    // JPEG has no alpha channel
    let encoded = if format == ImageFormat::Jpeg && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut writer, format)
    } else {
        image.write_to(&mut writer, format)
    };
    encoded.map_err(|e| format!("failed to encode image: {e}"))?;

    writer
        .flush()
        .map_err(|e| format!("failed to flush output file: {e}"))
}

/// Checks that no two items would be saved under the same output file name.
///
/// The save stage writes `output_dir/<file name>`, so `a/cat.png` and
/// `b/cat.png` would overwrite each other, concurrently under the parallel
/// strategy. Items without a file name are left to fail in the save stage.
pub fn check_output_names(items: &[WorkItem]) -> Result<(), ConfigError> {
    let mut seen: HashMap<&OsStr, &WorkItem> = HashMap::new();
    for item in items {
        let Some(name) = item.file_name() else {
            continue;
        };
        if let Some(first) = seen.insert(name, item) {
            return Err(ConfigError::invalid(
                "items",
                format!(
                    "'{first}' and '{item}' would both be saved as '{}'",
                    name.to_string_lossy()
                ),
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl Stage<ImageJob> for SaveImageStage {
    fn name(&self) -> &str {
        "save"
    }

    async fn apply(&self, item: &WorkItem, mut job: ImageJob) -> Result<ImageJob, StageFailure> {
        let image = job.take_image(item, FailureKind::WriteFailure)?;
        let file_name = job
            .source
            .file_name()
            .ok_or_else(|| StageFailure::write(item.clone(), "source has no file name"))?;
        let output = self.output_dir.join(file_name);

        let owned_item = item.clone();
        let target = output.clone();
        let image = run_blocking(item, move || {
            write_image(&owned_item, &target, &image)?;
            Ok(image)
        })
        .await?;

        debug!(item = %item, output = %output.display(), "Image written");
        Ok(job.with_image(image).with_output(output))
    }
}

/// Assembles the load → resize → grayscale → save chain.
pub fn image_chain(config: &ImagePipelineConfig) -> Result<StageChain<ImageJob>, ConfigError> {
    config.validate()?;

    StageChain::builder("image-pipeline")
        .stage(LoadImageStage::new())
        .stage(ResizeStage::new(config.width, config.height, config.filter))
        .stage(GrayscaleStage::new())
        .stage(SaveImageStage::new(config.output_dir.clone()))
        .build()
}
