//! ROM image files.
//!
//! An image is a raw dump of the 64K-word ROM, two bytes per word with
//! the instruction byte first.

use std::path::Path;

use thiserror::Error;

use crate::chips::ROM_BYTES;

/// Load a ROM image from disk, checking its size.
pub fn load_rom<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, RomFileError> {
    let path = path.as_ref();
    let image = std::fs::read(path).map_err(|e| RomFileError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    if image.len() != ROM_BYTES {
        return Err(RomFileError::Size {
            path: path.display().to_string(),
            expected: ROM_BYTES,
            actual: image.len(),
        });
    }
    Ok(image)
}

/// Write a ROM image to disk.
pub fn save_rom<P: AsRef<Path>>(path: P, image: &[u8]) -> Result<(), RomFileError> {
    let path = path.as_ref();
    std::fs::write(path, image).map_err(|e| RomFileError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Errors reading or writing ROM files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomFileError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("{path}: ROM image must be {expected} bytes, file has {actual}")]
    Size {
        path: String,
        expected: usize,
        actual: usize,
    },
}
