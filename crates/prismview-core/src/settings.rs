//! Viewer settings and render snapshots.
//!
//! The host owns one [`ViewerSettings`] and mutates it from its menus and
//! shortcuts. Every pipeline run receives an immutable [`RenderConfig`]
//! taken from it with [`ViewerSettings::snapshot`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::MirrorLayout;
use crate::transform::InterpolationFilter;
use crate::zoom::{Size, ZoomPolicy};
use crate::{ColorState, TransformState};

/// Default JPEG quality for saves
pub const DEFAULT_SAVE_QUALITY: u8 = 90;

/// Errors from loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Cannot access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Session settings that drive rendering, zoom and saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub transform: TransformState,
    pub color: ColorState,
    /// Apply `color` on every render
    pub colors_active: bool,
    pub mirror: MirrorLayout,
    pub zoom: ZoomPolicy,
    /// Keep transform and color settings when switching images
    pub keep_transform: bool,
    /// Keep the zoom factor when opening a new image
    pub keep_zoom_factor: bool,
    /// Correct orientation from EXIF at load time
    pub exif_rotation: bool,
    pub enable_animations: bool,
    /// Saves go here instead of overwriting the source
    pub save_directory: Option<PathBuf>,
    pub save_quality: u8,
    /// Batch processing: skip animations, keep absolute crop across images
    pub batch_mode: bool,
    /// Resize the original to this size before transforming
    pub scaled_size: Option<Size>,
    pub interpolation: InterpolationFilter,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            transform: TransformState::default(),
            color: ColorState::default(),
            colors_active: false,
            mirror: MirrorLayout::None,
            zoom: ZoomPolicy::default(),
            keep_transform: false,
            keep_zoom_factor: false,
            exif_rotation: true,
            enable_animations: true,
            save_directory: None,
            save_quality: DEFAULT_SAVE_QUALITY,
            batch_mode: false,
            scaled_size: None,
            interpolation: InterpolationFilter::default(),
        }
    }
}

/// Immutable parameters for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub transform: TransformState,
    pub color: ColorState,
    pub colors_active: bool,
    pub mirror: MirrorLayout,
    pub zoom: ZoomPolicy,
    pub exif_rotation: bool,
    pub enable_animations: bool,
    pub scaled_size: Option<Size>,
    pub keep_transform: bool,
    pub interpolation: InterpolationFilter,
}

impl Default for RenderConfig {
    fn default() -> Self {
        ViewerSettings::default().snapshot()
    }
}

/// Where and how [`crate::ImagePipeline::save`] writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    pub save_directory: Option<PathBuf>,
    pub quality: u8,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            save_directory: None,
            quality: DEFAULT_SAVE_QUALITY,
        }
    }
}

impl ViewerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-image state before (re)loading a file.
    ///
    /// Unless `keep_transform` is set, rotation, flips and the percentage
    /// crop are cleared; the pixel crop is kept in batch mode so one
    /// selection applies to a whole series. The scaled size is always
    /// cleared.
    pub fn on_reload(&mut self) {
        if !self.keep_transform {
            self.transform.crop.clear_percent();
            self.transform.rotation = 0.0;
            self.transform.flip_h = false;
            self.transform.flip_v = false;
            if !self.batch_mode {
                self.transform.crop.clear_absolute();
            }
        }
        self.scaled_size = None;
    }

    /// Reset state when a different image is opened
    pub fn on_new_image(&mut self) {
        if !self.keep_zoom_factor {
            self.zoom.zoom_factor = 1.0;
        }
    }

    pub fn snapshot(&self) -> RenderConfig {
        RenderConfig {
            transform: self.transform,
            color: self.color.clone(),
            colors_active: self.colors_active,
            mirror: self.mirror,
            zoom: self.zoom,
            exif_rotation: self.exif_rotation,
            enable_animations: self.enable_animations,
            scaled_size: self.scaled_size,
            keep_transform: self.keep_transform,
            interpolation: self.interpolation,
        }
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            save_directory: self.save_directory.clone(),
            quality: self.save_quality,
        }
    }

    /// Read settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Io` if the file cannot be read and
    /// `SettingsError::Parse` if it is not valid settings JSON.
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read settings from a JSON file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(SettingsError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)?;

        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }
}
