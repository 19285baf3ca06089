//! The image pipeline: load, render, present and save.
//!
//! # Render Stages
//!
//! 1. Optional resize of the original to the requested scaled size
//! 2. Rotation, mirroring and crop ([`apply_transform`])
//! 3. Color adjustments, when enabled
//! 4. Mirror layout
//!
//! The original buffer is kept untouched; every render starts from it.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

use crate::codec::{ImageCodec, StdCodec};
use crate::color::colorize;
use crate::compose::composite;
use crate::decode::{FilterType, Orientation, PixelBuffer};
use crate::encode::{format_for_path, EncodeError, ExifEmbed};
use crate::host::Viewport;
use crate::metadata::{
    ExifMetadata, MetadataBlock, MetadataError, MetadataNotice, MetadataOutcome, MetadataService,
};
use crate::settings::{RenderConfig, SaveOptions};
use crate::transform::{apply_orientation, apply_transform, resize_exact, resize_to_fit, TransformError};
use crate::zoom::{FitOutcome, Size, ZoomFitPlanner, ZoomPolicy};

/// Status text for images that did not come from a file
pub const CLIPBOARD_STATUS: &str = "Clipboard";

/// Result of [`ImagePipeline::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Decoded and rendered; size of the (orientation corrected) original
    Loaded { width: u32, height: u32 },
    /// Decoding failed; the placeholder is shown
    Missing,
    /// The file is an animation the host should play. The first frame is
    /// loaded as a still for saving and icons.
    Animated,
    /// Animation skipped in batch mode; nothing changed
    Skipped,
}

/// Errors that prevent the pixels from being saved.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The image has no source file; the host should ask for a destination
    #[error("Image has no source file")]
    NoSourcePath,

    #[error("Nothing to save")]
    EmptyImage,

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Result of a successful pixel save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub metadata: MetadataOutcome,
    /// The host should tell the user the metadata was lost
    pub notify: bool,
}

/// Owns the current image and turns it into displayable pixels.
#[derive(Debug)]
pub struct ImagePipeline<C: ImageCodec = StdCodec, M: MetadataService = ExifMetadata> {
    codec: C,
    metadata: M,
    original: PixelBuffer,
    rendered: PixelBuffer,
    source: Option<PathBuf>,
    source_format: Option<ImageFormat>,
    /// Orientation corrected at load time
    applied_orientation: Orientation,
    clipboard: bool,
    status: String,
    notice: MetadataNotice,
}

impl Default for ImagePipeline {
    fn default() -> Self {
        Self::new(StdCodec, ExifMetadata)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl<C: ImageCodec, M: MetadataService> ImagePipeline<C, M> {
    pub fn new(codec: C, metadata: M) -> Self {
        Self {
            codec,
            metadata,
            original: PixelBuffer::placeholder(),
            rendered: PixelBuffer::placeholder(),
            source: None,
            source_format: None,
            applied_orientation: Orientation::Normal,
            clipboard: false,
            status: String::new(),
            notice: MetadataNotice::default(),
        }
    }

    /// Load `path` and render it.
    ///
    /// # Arguments
    ///
    /// * `path` - Image file to open
    /// * `config` - Render parameters; EXIF correction and animation
    ///   handling are taken from here
    /// * `batch_mode` - Skip animated files instead of loading them
    pub fn load(&mut self, path: &Path, config: &RenderConfig, batch_mode: bool) -> LoadOutcome {
        let decoded = match self.codec.decode(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to decode image");
                self.set_placeholder();
                self.status = format!("{}: {e}", file_name(path));
                return LoadOutcome::Missing;
            }
        };

        if decoded.animated && batch_mode {
            tracing::info!(path = %path.display(), "Skipping animation in batch mode");
            return LoadOutcome::Skipped;
        }

        let mut buffer = decoded.buffer;
        self.applied_orientation = Orientation::Normal;
        if config.exif_rotation {
            let orientation = self.metadata.orientation(path);
            if orientation != Orientation::Normal {
                tracing::debug!(code = orientation.code(), "Correcting EXIF orientation");
                buffer = apply_orientation(&buffer, orientation);
                self.applied_orientation = orientation;
            }
        }

        self.original = buffer;
        self.source = Some(path.to_path_buf());
        self.source_format = Some(decoded.format);
        self.clipboard = false;
        self.status = file_name(path);
        self.render(config);

        tracing::info!(
            path = %path.display(),
            width = self.original.width,
            height = self.original.height,
            "Loaded image"
        );

        if decoded.animated && config.enable_animations {
            LoadOutcome::Animated
        } else {
            LoadOutcome::Loaded {
                width: self.original.width,
                height: self.original.height,
            }
        }
    }

    /// Take pixels that did not come from a file (paste, clipboard).
    pub fn load_pixels(&mut self, buffer: PixelBuffer, config: &RenderConfig) {
        self.original = buffer;
        self.source = None;
        self.source_format = None;
        self.applied_orientation = Orientation::Normal;
        self.clipboard = true;
        self.status = CLIPBOARD_STATUS.to_string();
        self.render(config);
    }

    /// Rebuild the rendered buffer from the original.
    pub fn render(&mut self, config: &RenderConfig) -> &PixelBuffer {
        let scaled = match config.scaled_size {
            Some(size) if !size.is_empty() => {
                match resize_exact(&self.original, size.width, size.height, FilterType::Lanczos3) {
                    Ok(resized) => {
                        tracing::debug!(width = size.width, height = size.height, "Scaled original");
                        resized
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Keeping original size");
                        self.original.clone()
                    }
                }
            }
            _ => self.original.clone(),
        };

        let mut buffer = apply_transform(&scaled, &config.transform, config.interpolation);

        if config.colors_active || config.keep_transform {
            colorize(&mut buffer, &config.color);
            tracing::debug!(colorize = config.color.colorize, "Applied color adjustments");
        }

        self.rendered = composite(&buffer, config.mirror);
        &self.rendered
    }

    /// Show the rendered buffer in `viewport` and fit it.
    pub fn present(
        &self,
        viewport: &mut dyn Viewport,
        planner: &ZoomFitPlanner,
        policy: &ZoomPolicy,
    ) -> FitOutcome {
        viewport.display(&self.rendered);
        let natural = Size::new(self.rendered.width, self.rendered.height);
        planner.fit(natural, viewport, policy)
    }

    /// Save the rendered image over its source or into the save directory.
    ///
    /// The source format is kept. Metadata of the source is embedded in the
    /// new file; failing to do so does not fail the save.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::NoSourcePath` for images without a source file.
    pub fn save(&mut self, options: &SaveOptions) -> Result<SaveReport, SaveError> {
        let (Some(source), Some(format)) = (self.source.clone(), self.source_format) else {
            return Err(SaveError::NoSourcePath);
        };

        let dest = match &options.save_directory {
            Some(dir) => {
                let name = source.file_name().ok_or(SaveError::NoSourcePath)?;
                dir.join(name)
            }
            None => source,
        };

        self.write_rendered(&dest, format, options.quality)
    }

    /// Save the rendered image to `dest`, format chosen by its extension.
    pub fn save_as(&mut self, dest: &Path, quality: u8) -> Result<SaveReport, SaveError> {
        let format = format_for_path(dest)?;
        self.write_rendered(dest, format, quality)
    }

    fn write_rendered(
        &mut self,
        dest: &Path,
        format: ImageFormat,
        quality: u8,
    ) -> Result<SaveReport, SaveError> {
        if self.rendered.is_empty() {
            return Err(SaveError::EmptyImage);
        }

        // Read first: an in-place save overwrites the source
        let (block, read_error) = match self.source.as_deref().map(|src| self.metadata.read(src)) {
            Some(Ok(block)) => (self.prepare_metadata(block), None),
            Some(Err(e)) => (MetadataBlock::default(), Some(e.to_string())),
            None => (MetadataBlock::default(), None),
        };

        let embed = self
            .codec
            .encode(&self.rendered, dest, format, quality, block.exif())?;

        let metadata = match (read_error, embed) {
            (Some(message), _) => MetadataOutcome::ReadFailed(message),
            (None, ExifEmbed::Nothing) => MetadataOutcome::NothingToCopy,
            (None, ExifEmbed::Embedded) => MetadataOutcome::Copied,
            (None, ExifEmbed::Unsupported) => {
                let error = MetadataError::Unsupported(dest.to_path_buf());
                MetadataOutcome::WriteFailed(error.to_string())
            }
        };
        let notify = self.notice.record(&metadata);

        tracing::info!(path = %dest.display(), ?format, ?metadata, "Saved rendered image");
        Ok(SaveReport {
            path: dest.to_path_buf(),
            format,
            metadata,
            notify,
        })
    }

    /// Fit the source block to the rendered pixels: the preview thumbnail
    /// shows the unedited image, and an orientation already applied must
    /// not be applied again.
    fn prepare_metadata(&self, mut block: MetadataBlock) -> MetadataBlock {
        if block.strip_thumbnail() {
            tracing::debug!("Dropped EXIF thumbnail");
        }
        if self.applied_orientation != Orientation::Normal {
            block.reset_orientation();
        }
        block
    }

    /// Stop notifying about metadata failures for this session
    pub fn suppress_metadata_notice(&mut self) {
        self.notice.suppress();
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn rendered(&self) -> &PixelBuffer {
        &self.rendered
    }

    /// File name, clipboard marker or load error
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_clipboard(&self) -> bool {
        self.clipboard
    }

    /// Size of the original before crop and scaling
    pub fn original_size(&self) -> Size {
        Size::new(self.original.width, self.original.height)
    }

    /// The rendered image fit into an `edge` square, for window icons
    pub fn window_icon(&self, edge: u32) -> Result<PixelBuffer, TransformError> {
        resize_to_fit(&self.rendered, edge, FilterType::Lanczos3)
    }

    /// Drop the current image and show the placeholder.
    pub fn clear(&mut self) {
        self.set_placeholder();
        self.status.clear();
    }

    fn set_placeholder(&mut self) {
        self.original = PixelBuffer::placeholder();
        self.rendered = PixelBuffer::placeholder();
        self.source = None;
        self.source_format = None;
        self.applied_orientation = Orientation::Normal;
        self.clipboard = false;
    }
}
