//! Tests for volume decoding from TIFF stacks and slice directories

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use porerev::AnalysisError;
    use porerev::io::volume::{load_slice_directory, load_tiff_stack, load_volume};
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;
    use tiff::encoder::{TiffEncoder, colortype};

    // Page z has pore (0) pixels where x < z, background (255) elsewhere
    fn page(z: u32, width: u32, height: u32) -> Vec<u8> {
        (0..height)
            .flat_map(|_| (0..width).map(move |x| if x < z { 0 } else { 255 }))
            .collect()
    }

    fn write_gray8_stack(path: &Path, pages: u32, width: u32, height: u32) {
        let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
        for z in 0..pages {
            encoder
                .write_image::<colortype::Gray8>(width, height, &page(z, width, height))
                .unwrap();
        }
    }

    // Tests every TIFF page becomes one z-slice with 8-bit values widened
    // Verified by reading only the first page
    #[test]
    fn test_load_gray8_stack() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack.tif");
        write_gray8_stack(&path, 3, 5, 4);

        let volume = load_tiff_stack(&path).unwrap();
        assert_eq!(volume.dim(), (3, 4, 5));
        assert_eq!(volume[(0, 0, 0)], u16::MAX);
        assert_eq!(volume[(2, 3, 1)], 0);
        assert_eq!(volume[(2, 3, 2)], u16::MAX);
        assert_eq!(volume.iter().filter(|&&v| v == 0).count(), 12);
    }

    // Tests 16-bit pages are kept as decoded
    // Verified by widening 16-bit samples
    #[test]
    fn test_load_gray16_stack() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack16.tiff");
        let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
        let data: Vec<u16> = (0..6).map(|i| i * 1000).collect();
        encoder
            .write_image::<colortype::Gray16>(3, 2, &data)
            .unwrap();
        encoder
            .write_image::<colortype::Gray16>(3, 2, &data)
            .unwrap();

        let volume = load_volume(&path).unwrap();
        assert_eq!(volume.dim(), (2, 2, 3));
        assert_eq!(volume[(1, 1, 2)], 5000);
    }

    // Tests pages of different sizes are rejected
    // Verified by cropping pages to the first size
    #[test]
    fn test_mismatched_pages_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ragged.tif");
        let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
        encoder
            .write_image::<colortype::Gray8>(4, 4, &page(1, 4, 4))
            .unwrap();
        encoder
            .write_image::<colortype::Gray8>(3, 4, &page(1, 3, 4))
            .unwrap();

        assert!(matches!(
            load_tiff_stack(&path),
            Err(AnalysisError::Shape { .. })
        ));
    }

    // Tests floating-point pages are rejected
    // Verified by truncating floats to integers
    #[test]
    fn test_float_pages_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("float.tif");
        let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
        encoder
            .write_image::<colortype::Gray32Float>(2, 2, &[0.0, 1.0, 0.5, 0.25])
            .unwrap();

        assert!(matches!(
            load_tiff_stack(&path),
            Err(AnalysisError::Shape { .. })
        ));
    }

    // Tests corrupt TIFF files surface decoding errors with their path
    // Verified by leaving the placeholder path in place
    #[test]
    fn test_corrupt_tiff() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.tif");
        std::fs::write(&path, b"not a tiff").unwrap();

        match load_tiff_stack(&path) {
            Err(AnalysisError::TiffDecode { path: reported, .. }) => assert_eq!(reported, path),
            other => unreachable!("Expected TIFF decode error, got {other:?}"),
        }
    }

    // Tests slice directories are stacked in file name order
    // Verified by stacking in directory listing order
    #[test]
    fn test_load_slice_directory() {
        let temp_dir = TempDir::new().unwrap();
        for z in [2u32, 0, 1] {
            let slice = GrayImage::from_raw(4, 3, page(z, 4, 3)).unwrap();
            slice
                .save(temp_dir.path().join(format!("slice_{z:03}.png")))
                .unwrap();
        }
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let volume = load_slice_directory(temp_dir.path()).unwrap();
        assert_eq!(volume.dim(), (3, 3, 4));
        assert_eq!(volume[(0, 0, 0)], u16::MAX);
        assert_eq!(volume[(2, 0, 1)], 0);
        assert_eq!(volume.iter().filter(|&&v| v == 0).count(), 9);

        assert_eq!(load_volume(temp_dir.path()).unwrap(), volume);
    }

    // Tests a directory without images is rejected
    // Verified by returning an empty volume
    #[test]
    fn test_empty_slice_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            load_slice_directory(temp_dir.path()),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }

    // Tests slices of different sizes are rejected
    // Verified by removing the size check
    #[test]
    fn test_mismatched_slices_rejected() {
        let temp_dir = TempDir::new().unwrap();
        GrayImage::from_pixel(4, 4, Luma([255]))
            .save(temp_dir.path().join("a.png"))
            .unwrap();
        GrayImage::from_pixel(5, 4, Luma([255]))
            .save(temp_dir.path().join("b.png"))
            .unwrap();

        assert!(matches!(
            load_slice_directory(temp_dir.path()),
            Err(AnalysisError::Shape { .. })
        ));
    }

    // Tests a single image loads as a one-slice volume
    // Verified by rejecting non-TIFF files
    #[test]
    fn test_single_slice_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slice.png");
        GrayImage::from_pixel(6, 2, Luma([0])).save(&path).unwrap();

        let volume = load_volume(&path).unwrap();
        assert_eq!(volume.dim(), (1, 2, 6));
        assert!(volume.iter().all(|&v| v == 0));
    }

    // Tests a missing target is rejected
    // Verified by treating missing paths as empty directories
    #[test]
    fn test_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            load_volume(&temp_dir.path().join("missing")),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }
}
