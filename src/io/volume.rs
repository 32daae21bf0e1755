//! Volume decoding from multi-page TIFF files and slice-image directories
//!
//! Decoded volumes are indexed `(z, y, x)` and widened to 16 bits, so 8-bit
//! background (255) becomes `u16::MAX` and pore space stays at zero.

use crate::io::error::{AnalysisError, Result, WithContext, invalid_parameter, shape_error};
use log::debug;
use ndarray::Array3;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};

/// Decode a volume from a TIFF stack, a slice directory or a single slice image
///
/// # Errors
///
/// Returns an error if:
/// - The path does not exist or cannot be read
/// - A slice cannot be decoded or uses an unsupported sample format
/// - Slices differ in size
pub fn load_volume(path: &Path) -> Result<Array3<u16>> {
    if path.is_dir() {
        load_slice_directory(path)
    } else if is_tiff(path) {
        load_tiff_stack(path)
    } else if path.is_file() {
        let (width, height, pixels) = load_slice(path)?;
        assemble(path, width, height, vec![pixels])
    } else {
        Err(invalid_parameter(
            "target",
            &path.display(),
            &"must be a volume file or a directory of slices",
        ))
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

/// Decode every page of a multi-page grayscale TIFF as one z-slice
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded, a page is not
/// single-channel 8- or 16-bit, or pages differ in size
pub fn load_tiff_stack(path: &Path) -> Result<Array3<u16>> {
    let file = File::open(path).map_err(|e| AnalysisError::FileSystem {
        path: path.to_path_buf(),
        operation: "open volume",
        source: e,
    })?;
    let mut decoder = Decoder::new(BufReader::new(file)).with_path(path)?;

    let mut slices = Vec::new();
    let mut dimensions = None;
    loop {
        let (width, height) = decoder.dimensions().with_path(path)?;
        let pixels = match decoder.read_image().with_path(path)? {
            DecodingResult::U8(buffer) => buffer.into_iter().map(widen).collect(),
            DecodingResult::U16(buffer) => buffer,
            _ => {
                return Err(shape_error(
                    &[slices.len(), height as usize, width as usize],
                    &format!(
                        "page {} of '{}' is not 8- or 16-bit integer data",
                        slices.len(),
                        path.display()
                    ),
                ));
            }
        };
        if dimensions.is_some_and(|dims| dims != (width, height)) {
            return Err(shape_error(
                &[slices.len(), height as usize, width as usize],
                &format!("page {} of '{}' differs in size", slices.len(), path.display()),
            ));
        }
        dimensions = Some((width, height));
        slices.push(pixels);

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().with_path(path)?;
    }

    let (width, height) = dimensions.unwrap_or((0, 0));
    debug!("decoded {} TIFF pages from {}", slices.len(), path.display());
    assemble(path, width, height, slices)
}

/// Decode a directory of equally sized slice images, ordered by file name
///
/// # Errors
///
/// Returns an error if the directory cannot be read, holds no images, or an
/// image cannot be decoded or differs in size
pub fn load_slice_directory(dir: &Path) -> Result<Array3<u16>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| AnalysisError::FileSystem {
        path: dir.to_path_buf(),
        operation: "list slices",
        source: e,
    })?;
    for entry in entries {
        let path = entry.with_path(dir)?.path();
        if path.is_file() && image::ImageFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(invalid_parameter(
            "target",
            &dir.display(),
            &"directory contains no slice images",
        ));
    }

    let mut slices = Vec::with_capacity(files.len());
    let mut dimensions = None;
    for file in &files {
        let (width, height, pixels) = load_slice(file)?;
        if dimensions.is_some_and(|dims| dims != (width, height)) {
            return Err(shape_error(
                &[slices.len(), height as usize, width as usize],
                &format!("slice '{}' differs in size", file.display()),
            ));
        }
        dimensions = Some((width, height));
        slices.push(pixels);
    }

    let (width, height) = dimensions.unwrap_or((0, 0));
    debug!("decoded {} slices from {}", slices.len(), dir.display());
    assemble(dir, width, height, slices)
}

fn load_slice(path: &Path) -> Result<(u32, u32, Vec<u16>)> {
    let img = image::open(path).map_err(|e| AnalysisError::VolumeLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    let luma = img.to_luma16();
    Ok((luma.width(), luma.height(), luma.into_raw()))
}

fn assemble(path: &Path, width: u32, height: u32, slices: Vec<Vec<u16>>) -> Result<Array3<u16>> {
    let shape = (slices.len(), height as usize, width as usize);
    let expected = shape.1 * shape.2;
    if let Some(index) = slices.iter().position(|slice| slice.len() != expected) {
        return Err(shape_error(
            &[shape.0, shape.1, shape.2],
            &format!(
                "slice {index} of '{}' is not a single-channel {width}x{height} image",
                path.display()
            ),
        ));
    }

    let flat: Vec<u16> = slices.into_iter().flatten().collect();
    Array3::from_shape_vec(shape, flat).map_err(|e| shape_error(&[shape.0, shape.1, shape.2], &e))
}

// Scale 8-bit samples onto the full 16-bit range (255 -> 65535)
fn widen(value: u8) -> u16 {
    u16::from(value) * 257
}
