//! Embedded metadata: EXIF orientation lookup and the EXIF block carried
//! into saved files.
//!
//! Re-encoding drops every metadata segment of the source file, so the raw
//! EXIF block is read before the save and handed to the encoder, which
//! embeds it in JPEG, PNG and WebP output.

use std::fs;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use exif::{In, Reader, Tag};
use image::ImageFormat;
use thiserror::Error;

use crate::decode::Orientation;

/// Errors from metadata reads and embedding.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Cannot read metadata from {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// The destination format has no EXIF container we can write
    #[error("Metadata cannot be embedded in {0}")]
    Unsupported(PathBuf),
}

/// Raw EXIF (TIFF structured) data of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    exif: Vec<u8>,
}

impl MetadataBlock {
    pub fn from_exif(exif: Vec<u8>) -> Self {
        Self { exif }
    }

    pub fn exif(&self) -> &[u8] {
        &self.exif
    }

    pub fn is_empty(&self) -> bool {
        self.exif.is_empty()
    }

    /// Orientation tag of the block, `Normal` when absent or unparsable.
    pub fn orientation(&self) -> Orientation {
        if self.is_empty() {
            return Orientation::Normal;
        }
        Reader::new()
            .read_raw(self.exif.clone())
            .ok()
            .and_then(|exif| orientation_of(&exif))
            .unwrap_or_default()
    }

    /// Set the Orientation tag of IFD0 to 1 (normal).
    ///
    /// Used when the pixels were already rotated upright. Returns `false`
    /// when the block has no Orientation entry.
    pub fn reset_orientation(&mut self) -> bool {
        reset_orientation_entry(&mut self.exif).is_some()
    }

    /// Unlink IFD1, the embedded preview thumbnail.
    ///
    /// The preview shows the unedited source, so it must not outlive a
    /// save. The thumbnail bytes stay in the block but nothing refers to
    /// them. Returns `false` when there was no IFD1.
    pub fn strip_thumbnail(&mut self) -> bool {
        unlink_next_ifd(&mut self.exif).is_some()
    }
}

const ORIENTATION_TAG: u16 = 0x0112;
const TIFF_SHORT: u16 = 3;

fn read_u16(data: &[u8], at: usize, little_endian: bool) -> Option<u16> {
    let b = data.get(at..at.checked_add(2)?)?;
    Some(if little_endian {
        u16::from_le_bytes([b[0], b[1]])
    } else {
        u16::from_be_bytes([b[0], b[1]])
    })
}

fn read_u32(data: &[u8], at: usize, little_endian: bool) -> Option<u32> {
    let b = data.get(at..at.checked_add(4)?)?;
    let b = [b[0], b[1], b[2], b[3]];
    Some(if little_endian {
        u32::from_le_bytes(b)
    } else {
        u32::from_be_bytes(b)
    })
}

/// Byte order and IFD0 location of a TIFF structure
fn ifd0(tiff: &[u8]) -> Option<(bool, usize, usize)> {
    let little_endian = match tiff.get(..2)? {
        b"II" => true,
        b"MM" => false,
        _ => return None,
    };
    let ifd = read_u32(tiff, 4, little_endian)? as usize;
    let count = read_u16(tiff, ifd, little_endian)? as usize;
    Some((little_endian, ifd, count))
}

fn reset_orientation_entry(tiff: &mut [u8]) -> Option<()> {
    let (little_endian, ifd, count) = ifd0(tiff)?;

    for i in 0..count {
        let entry = ifd + 2 + i * 12;
        if read_u16(tiff, entry, little_endian)? != ORIENTATION_TAG {
            continue;
        }
        if read_u16(tiff, entry + 2, little_endian)? != TIFF_SHORT {
            return None;
        }
        let normal = if little_endian {
            1u16.to_le_bytes()
        } else {
            1u16.to_be_bytes()
        };
        tiff.get_mut(entry + 8..entry + 10)?.copy_from_slice(&normal);
        return Some(());
    }
    None
}

fn unlink_next_ifd(tiff: &mut [u8]) -> Option<()> {
    let (little_endian, ifd, count) = ifd0(tiff)?;
    let link = ifd + 2 + count * 12;
    if read_u32(tiff, link, little_endian)? == 0 {
        return None;
    }
    tiff.get_mut(link..link + 4)?.copy_from_slice(&[0; 4]);
    Some(())
}

/// Metadata access used by the pipeline.
pub trait MetadataService {
    /// EXIF orientation of the file, `Normal` when it has none.
    fn orientation(&self, path: &Path) -> Orientation;

    /// Read the metadata block of `path`. Files without metadata give an
    /// empty block.
    fn read(&self, path: &Path) -> Result<MetadataBlock, MetadataError>;
}

/// [`MetadataService`] backed by `kamadak-exif`.
///
/// Reads EXIF from JPEG, PNG, TIFF and WebP sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifMetadata;

fn orientation_of(exif: &exif::Exif) -> Option<Orientation> {
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    let code = field.value.get_uint(0)?;
    Orientation::from_exif(code)
}

/// Containers `kamadak-exif` can read EXIF from
fn can_carry_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP
    )
}

impl MetadataService for ExifMetadata {
    fn orientation(&self, path: &Path) -> Orientation {
        let Ok(file) = fs::File::open(path) else {
            return Orientation::Normal;
        };
        let mut reader = BufReader::new(file);
        let orientation = Reader::new()
            .read_from_container(&mut reader)
            .ok()
            .and_then(|exif| orientation_of(&exif))
            .unwrap_or_default();

        tracing::debug!(path = %path.display(), code = orientation.code(), "Read EXIF orientation");
        orientation
    }

    fn read(&self, path: &Path) -> Result<MetadataBlock, MetadataError> {
        let read_err = |message: String| MetadataError::Read {
            path: path.to_path_buf(),
            message,
        };

        let bytes = fs::read(path).map_err(|e| read_err(e.to_string()))?;
        match image::guess_format(&bytes) {
            Ok(format) if can_carry_exif(format) => {}
            _ => return Ok(MetadataBlock::default()),
        }

        match Reader::new().read_from_container(&mut Cursor::new(&bytes)) {
            Ok(exif) => {
                tracing::debug!(path = %path.display(), bytes = exif.buf().len(), "Read EXIF block");
                Ok(MetadataBlock::from_exif(exif.buf().to_vec()))
            }
            Err(exif::Error::NotFound(_)) => Ok(MetadataBlock::default()),
            Err(e) => Err(read_err(e.to_string())),
        }
    }
}

/// What happened to the metadata during a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    Copied,
    /// The source had no metadata
    NothingToCopy,
    ReadFailed(String),
    WriteFailed(String),
}

impl MetadataOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ReadFailed(_) | Self::WriteFailed(_))
    }
}

/// Decides when a metadata failure deserves a user-visible notice.
///
/// Write failures notify until the user asks not to be told again; read
/// failures and suppressed notices are only logged.
#[derive(Debug, Clone, Default)]
pub struct MetadataNotice {
    suppressed: bool,
}

impl MetadataNotice {
    /// Record a save outcome. Returns `true` when the host should notify.
    pub fn record(&mut self, outcome: &MetadataOutcome) -> bool {
        if !outcome.is_failure() {
            return false;
        }

        tracing::warn!(?outcome, "Metadata was not preserved");
        matches!(outcome, MetadataOutcome::WriteFailed(_)) && !self.suppressed
    }

    /// Stop notifying for the rest of the session ("don't show again")
    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}


/// EXIF blocks shared by tests across the crate
#[cfg(test)]
pub(crate) mod fixtures {
    use exif::{In, Reader, Tag};

    use super::MetadataBlock;

    /// IFD1 of the block carries a JPEG preview
    pub fn has_thumbnail(block: &MetadataBlock) -> bool {
        let exif = Reader::new().read_raw(block.exif().to_vec()).unwrap();
        exif.get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)
            .is_some()
    }

    /// Little-endian TIFF header with a single Orientation entry
    pub fn exif_with_orientation(code: u16) -> Vec<u8> {
        let mut tiff = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&code.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff
    }

    /// [`exif_with_orientation`] followed by an IFD1 pointing at a tiny
    /// JPEG thumbnail
    pub fn exif_with_thumbnail(code: u16) -> Vec<u8> {
        let mut tiff = exif_with_orientation(code);
        let link = tiff.len() - 4;
        tiff[link..].copy_from_slice(&26u32.to_le_bytes());

        tiff.extend_from_slice(&2u16.to_le_bytes());
        // JPEGInterchangeFormat, LONG, offset of the thumbnail
        tiff.extend_from_slice(&0x0201u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&56u32.to_le_bytes());
        // JPEGInterchangeFormatLength, LONG
        tiff.extend_from_slice(&0x0202u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&4u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]);
        tiff
    }
}
