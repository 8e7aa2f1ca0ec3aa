//! # Metadata Module
//!
//! Builds the per-image records returned for every cluster member.
//!
//! ## Extracted Fields
//! - File size in bytes, and as "X.Y MB" / "X KB"
//! - Pixel dimensions from the image header ("0x0" if unreadable)
//! - Last-modified time in local time, "YYYY-MM-DD HH:MM"
//! - File name
//!
//! Records are built fresh for every run; nothing is cached.

use crate::core::comparator::Cluster;
use crate::error::MetadataError;
use chrono::{DateTime, Local};
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const BYTES_PER_KB: u64 = 1024;
const BYTES_PER_MB: u64 = 1_048_576;

/// Metadata for one clustered image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Path of the image as listed
    pub path: PathBuf,
    /// Final path component
    pub filename: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Human-readable file size
    pub size: String,
    /// Width in pixels, 0 if the header could not be read
    pub width: u32,
    /// Height in pixels, 0 if the header could not be read
    pub height: u32,
    /// "WIDTHxHEIGHT"
    pub resolution: String,
    /// Last-modified time, "YYYY-MM-DD HH:MM" local time
    pub modified: String,
}

impl ImageMetadata {
    /// Read metadata for a single file.
    ///
    /// Fails only if the file cannot be stat'ed; unreadable dimensions are
    /// reported as zero.
    pub fn read(path: &Path) -> Result<Self, MetadataError> {
        let stat = fs::metadata(path).map_err(|e| MetadataError::Stat {
            path: path.to_path_buf(),
            source: e,
        })?;

        let size_bytes = stat.len();
        let modified = stat.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let (width, height) = read_dimensions(path);

        Ok(Self {
            path: path.to_path_buf(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size_bytes,
            size: format_size(size_bytes),
            width,
            height,
            resolution: format!("{}x{}", width, height),
            modified: format_modified(modified),
        })
    }

    /// Megapixel count, 0.0 if dimensions are unknown
    pub fn megapixels(&self) -> f64 {
        (self.width as f64 * self.height as f64) / 1_000_000.0
    }
}

/// Pixel dimensions from the image header, or (0, 0) if unreadable.
///
/// The format is sniffed from the file's bytes, not its extension.
fn read_dimensions(path: &Path) -> (u32, u32) {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
        .unwrap_or((0, 0))
}

/// Format a byte count as "X.Y MB" from 1 MiB upward, otherwise "X KB".
///
/// KB values are rounded to whole numbers (ties to even).
pub fn format_size(bytes: u64) -> String {
    if bytes >= BYTES_PER_MB {
        format!("{:.1} MB", bytes as f64 / BYTES_PER_MB as f64)
    } else {
        format!("{:.0} KB", bytes as f64 / BYTES_PER_KB as f64)
    }
}

/// Format a timestamp as local "YYYY-MM-DD HH:MM"
pub fn format_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()
}

/// Read metadata for every member of a cluster, largest file first.
///
/// The sort is stable: equal sizes keep cluster order.
pub fn enrich(cluster: &Cluster) -> Result<Vec<ImageMetadata>, MetadataError> {
    let mut records = cluster
        .paths()
        .iter()
        .map(|path| ImageMetadata::read(path))
        .collect::<Result<Vec<_>, _>>()?;

    records.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_bytes(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn size_boundary_switches_to_megabytes() {
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1_048_575), "1024 KB");
    }

    #[test]
    fn size_formats_kilobytes_without_decimals() {
        assert_eq!(format_size(0), "0 KB");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(300_000), "293 KB");
    }

    #[test]
    fn size_formats_megabytes_with_one_decimal() {
        assert_eq!(format_size(5 * 1_048_576 + 524_288), "5.5 MB");
        assert_eq!(format_size(3_000_000), "2.9 MB");
    }

    #[test]
    fn modified_uses_minute_precision() {
        let local = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        assert_eq!(format_modified(SystemTime::from(local)), "2024-03-09 14:05");
    }

    #[test]
    fn read_reports_dimensions_of_real_images() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wide.png");
        RgbImage::from_pixel(40, 25, Rgb([9, 9, 9])).save(&path).unwrap();

        let meta = ImageMetadata::read(&path).unwrap();

        assert_eq!((meta.width, meta.height), (40, 25));
        assert_eq!(meta.resolution, "40x25");
        assert_eq!(meta.filename, "wide.png");
        assert_eq!(meta.size_bytes, fs::metadata(&path).unwrap().len());
        assert!((meta.megapixels() - 0.001).abs() < 1e-9);
    }

    #[test]
    fn dimensions_come_from_content_not_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("real.png");
        RgbImage::from_pixel(30, 20, Rgb([1, 2, 3])).save(&png).unwrap();
        let misnamed = temp_dir.path().join("upload.jpg");
        fs::copy(&png, &misnamed).unwrap();

        let meta = ImageMetadata::read(&misnamed).unwrap();

        assert_eq!(meta.resolution, "30x20");
    }

    #[test]
    fn unreadable_dimensions_are_zero() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_bytes(temp_dir.path(), "junk.png", 100);

        let meta = ImageMetadata::read(&path).unwrap();

        assert_eq!((meta.width, meta.height), (0, 0));
        assert_eq!(meta.resolution, "0x0");
        assert_eq!(meta.size, "0 KB");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ImageMetadata::read(Path::new("/nonexistent/gone.jpg")).unwrap_err();
        assert!(err.to_string().contains("gone.jpg"));
    }

    #[test]
    fn enrich_sorts_by_size_descending_and_keeps_ties_stable() {
        let temp_dir = TempDir::new().unwrap();
        let paths = vec![
            write_bytes(temp_dir.path(), "small.png", 10),
            write_bytes(temp_dir.path(), "tie_first.png", 500),
            write_bytes(temp_dir.path(), "big.png", 2000),
            write_bytes(temp_dir.path(), "tie_second.png", 500),
        ];

        let records = enrich(&Cluster::new(paths)).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();

        assert_eq!(names, vec!["big.png", "tie_first.png", "tie_second.png", "small.png"]);
        assert!(records.windows(2).all(|w| w[0].size_bytes >= w[1].size_bytes));
    }

    #[test]
    fn record_serializes_with_expected_field_names() {
        let record = ImageMetadata {
            path: PathBuf::from("/uploads/0001_a.png"),
            filename: "0001_a.png".to_string(),
            size_bytes: 2048,
            size: "2 KB".to_string(),
            width: 10,
            height: 20,
            resolution: "10x20".to_string(),
            modified: "2024-01-01 00:00".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "path", "filename", "size_bytes", "size", "width", "height", "resolution", "modified",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["size_bytes"], 2048);
    }
}
