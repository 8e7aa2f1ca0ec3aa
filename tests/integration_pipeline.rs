//! Integration tests for the pipeline module.
//!
//! These tests verify end-to-end pipeline behavior including:
//! - Duplicate pairs saved in different formats
//! - Empty and nonexistent folders
//! - Corrupt files counted but never clustered
//! - Resized, recompressed and misnamed copies
//! - Seed-only (non-transitive) grouping through the public API

use assert_fs::prelude::*;
use image::{DynamicImage, Rgb, RgbImage};
use image_dupe_finder::core::comparator::GroupingMode;
use image_dupe_finder::core::hasher::{Fingerprint, HashAlgorithm, HashingMode};
use image_dupe_finder::core::pipeline::{CancellationToken, Pipeline};
use image_dupe_finder::error::{HashError, PipelineError};
use image_dupe_finder::{run_pipeline, DupeFinderError, ScanReport};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Blocky 64x64 texture, deterministic per seed
fn texture(seed: u32) -> RgbImage {
    let mut state = seed;
    let mut cells = [0u8; 64];
    for value in cells.iter_mut() {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        *value = 20 + ((state >> 16) % 180) as u8;
    }
    RgbImage::from_fn(64, 64, |x, y| {
        let v = cells[((y / 8) * 8 + x / 8) as usize];
        Rgb([v, v, v])
    })
}

/// Save the same pixels as PNG and as BMP, so the pair hashes identically
/// but differs in file size
fn write_pair(dir: &Path, stem: &str, seed: u32) -> (PathBuf, PathBuf) {
    let img = texture(seed);
    let png = dir.join(format!("{}.png", stem));
    let bmp = dir.join(format!("{}.bmp", stem));
    img.save(&png).unwrap();
    img.save(&bmp).unwrap();
    (png, bmp)
}

fn filenames(report: &ScanReport) -> Vec<Vec<String>> {
    report
        .clusters
        .iter()
        .map(|c| c.iter().map(|m| m.filename.clone()).collect())
        .collect()
}

#[test]
fn duplicate_pairs_are_grouped_and_corrupt_file_is_counted() {
    let temp_dir = TempDir::new().unwrap();
    write_pair(temp_dir.path(), "a", 1);
    write_pair(temp_dir.path(), "b", 2);
    write_pair(temp_dir.path(), "c", 3);
    fs::write(temp_dir.path().join("corrupt.jpg"), b"this is not a valid image file").unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 7);
    assert_eq!(report.clusters.len(), 3);
    for cluster in &report.clusters {
        assert_eq!(cluster.len(), 2);
        assert!(cluster.iter().all(|m| m.filename != "corrupt.jpg"));
    }
}

#[test]
fn cluster_members_are_sorted_largest_first() {
    let temp_dir = TempDir::new().unwrap();
    write_pair(temp_dir.path(), "photo", 4);

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(filenames(&report), vec![vec!["photo.bmp", "photo.png"]]);
    let cluster = &report.clusters[0];
    assert!(cluster[0].size_bytes > cluster[1].size_bytes);
    assert_eq!(cluster[0].resolution, "64x64");
    assert_eq!(cluster[1].resolution, "64x64");
}

#[test]
fn zero_threshold_still_groups_identical_pixels() {
    let temp_dir = TempDir::new().unwrap();
    write_pair(temp_dir.path(), "same", 5);

    let report = run_pipeline(temp_dir.path(), 0).unwrap();

    assert_eq!(report.clusters.len(), 1);
}

#[test]
fn unrelated_images_are_not_grouped() {
    let temp_dir = TempDir::new().unwrap();
    texture(1).save(temp_dir.path().join("one.png")).unwrap();
    texture(2).save(temp_dir.path().join("two.png")).unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 2);
    assert!(report.clusters.is_empty());
}

/// Smooth low-frequency scene: two gradients and a bright disc
fn scene(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let fx = x as f64 / width as f64;
        let fy = y as f64 / height as f64;
        let mut v = 90.0 + 60.0 * (fx * 5.0).sin() + 40.0 * (fy * 3.0).cos();
        if (fx - 0.3).powi(2) + (fy - 0.6).powi(2) < 0.04 {
            v += 60.0;
        }
        let v = v.clamp(0.0, 255.0) as u8;
        Rgb([v, v / 2 + 40, 255 - v])
    })
}

#[test]
fn resized_jpeg_copy_is_grouped_with_its_original() {
    let temp_dir = TempDir::new().unwrap();
    let original = scene(256, 192);
    original.save(temp_dir.path().join("original.png")).unwrap();
    DynamicImage::ImageRgb8(original)
        .resize_exact(128, 96, image::imageops::FilterType::Lanczos3)
        .to_rgb8()
        .save(temp_dir.path().join("thumbnail.jpg"))
        .unwrap();
    texture(60).save(temp_dir.path().join("unrelated.png")).unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 3);
    let mut names = filenames(&report);
    for cluster in names.iter_mut() {
        cluster.sort();
    }
    assert_eq!(names, vec![vec!["original.png", "thumbnail.jpg"]]);
}

#[test]
fn misnamed_upload_is_decoded_by_content() {
    let temp_dir = TempDir::new().unwrap();
    let png = temp_dir.path().join("a.png");
    texture(70).save(&png).unwrap();
    fs::copy(&png, temp_dir.path().join("b.jpg")).unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 2);
    assert_eq!(report.clusters.len(), 1);
    assert!(report.clusters[0].iter().all(|m| m.resolution == "64x64"));
}

#[test]
fn pipeline_handles_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 0);
    assert!(report.clusters.is_empty());
}

#[test]
fn pipeline_handles_nonexistent_path() {
    let temp_dir = TempDir::new().unwrap();

    let report = run_pipeline(temp_dir.path().join("never-created"), 10).unwrap();

    assert_eq!(report.total_images, 0);
    assert!(report.clusters.is_empty());
}

#[test]
fn only_corrupt_files_gives_no_clusters() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.jpg"), b"garbage").unwrap();
    fs::write(temp_dir.path().join("b.png"), b"garbage").unwrap();

    let report = run_pipeline(temp_dir.path(), 64).unwrap();

    assert_eq!(report.total_images, 2);
    assert!(report.clusters.is_empty());
}

#[test]
fn unsupported_extensions_are_not_counted() {
    let temp_dir = TempDir::new().unwrap();
    write_pair(temp_dir.path(), "img", 6);
    fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();
    fs::write(temp_dir.path().join("clip.mp4"), b"\0\0\0").unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 2);
}

#[test]
fn duplicates_in_subfolders_are_found() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("2024").join("march");
    fs::create_dir_all(&nested).unwrap();
    let img = texture(8);
    img.save(temp_dir.path().join("top.png")).unwrap();
    img.save(nested.join("deep.bmp")).unwrap();

    let report = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(report.total_images, 2);
    assert_eq!(report.clusters.len(), 1);
}

#[test]
fn repeated_runs_give_identical_reports() {
    let temp_dir = TempDir::new().unwrap();
    for (i, stem) in ["k", "l", "m", "n"].iter().enumerate() {
        write_pair(temp_dir.path(), stem, 10 + i as u32);
    }

    let first = run_pipeline(temp_dir.path(), 10).unwrap();
    let second = run_pipeline(temp_dir.path(), 10).unwrap();

    assert_eq!(first, second);
}

#[test]
fn sequential_and_parallel_hashing_agree() {
    let temp_dir = TempDir::new().unwrap();
    for (i, stem) in ["p", "q", "r"].iter().enumerate() {
        write_pair(temp_dir.path(), stem, 20 + i as u32);
    }

    let sequential = Pipeline::builder()
        .hashing_mode(HashingMode::Sequential)
        .build()
        .run(temp_dir.path())
        .unwrap()
        .into_report();
    let parallel = Pipeline::builder()
        .threads(2)
        .build()
        .run(temp_dir.path())
        .unwrap()
        .into_report();

    assert_eq!(sequential, parallel);
}

#[test]
fn scanning_never_modifies_files() {
    let temp = assert_fs::TempDir::new().unwrap();
    let img = texture(30);
    img.save(temp.child("keep.png").path()).unwrap();
    img.save(temp.child("keep.bmp").path()).unwrap();
    let before = fs::read(temp.child("keep.bmp").path()).unwrap();

    let report = run_pipeline(temp.path(), 10).unwrap();

    assert_eq!(report.clusters.len(), 1);
    temp.child("keep.png").assert(predicate::path::is_file());
    temp.child("keep.bmp").assert(predicate::path::is_file());
    assert_eq!(fs::read(temp.child("keep.bmp").path()).unwrap(), before);
    temp.close().unwrap();
}

#[test]
fn report_serializes_to_json_with_relative_paths() {
    let temp_dir = TempDir::new().unwrap();
    write_pair(temp_dir.path(), "shot", 40);

    let report = run_pipeline(temp_dir.path(), 10)
        .unwrap()
        .relative_to(temp_dir.path());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["total_images"], 2);
    let first = &json["clusters"][0][0];
    assert_eq!(first["path"], "shot.bmp");
    assert_eq!(first["filename"], "shot.bmp");
    assert!(first["size"].as_str().unwrap().ends_with("KB"));
    assert!(first["modified"].is_string());
}

#[test]
fn cancelled_run_reports_cancellation() {
    let temp_dir = TempDir::new().unwrap();
    write_pair(temp_dir.path(), "x", 50);

    let token = CancellationToken::new();
    token.cancel();
    let result = Pipeline::builder()
        .cancellation(token)
        .build()
        .run(temp_dir.path());

    assert!(matches!(
        result,
        Err(DupeFinderError::Pipeline(PipelineError::Cancelled))
    ));
}

/// Fingerprint taken from the file name: `<order>_<bits>.png`
struct NamedFingerprint;

impl HashAlgorithm for NamedFingerprint {
    fn hash_image(&self, _image: &DynamicImage) -> Result<Fingerprint, HashError> {
        unreachable!("files are never decoded")
    }

    fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let stem = path.file_stem().unwrap().to_string_lossy();
        let bits = stem.split('_').nth(1).unwrap();
        Ok(Fingerprint::new(u64::from_str_radix(bits, 2).unwrap()))
    }
}

fn write_named(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"").unwrap();
    }
}

#[test]
fn grouping_compares_against_the_seed_only() {
    // d(A,B) = 3, d(B,C) = 3, d(A,C) = 6
    let temp_dir = TempDir::new().unwrap();
    write_named(temp_dir.path(), &["1_000000.png", "2_000111.png", "3_111111.png"]);

    let report = Pipeline::builder()
        .threshold(4)
        .hasher(Box::new(NamedFingerprint))
        .build()
        .run(temp_dir.path())
        .unwrap()
        .into_report();

    assert_eq!(report.total_images, 3);
    assert_eq!(report.clusters.len(), 1);
    let mut names: Vec<_> = report.clusters[0].iter().map(|m| m.filename.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["1_000000.png", "2_000111.png"]);
}

#[test]
fn connected_grouping_merges_chains() {
    let temp_dir = TempDir::new().unwrap();
    write_named(temp_dir.path(), &["1_000000.png", "2_000111.png", "3_111111.png"]);

    let report = Pipeline::builder()
        .threshold(4)
        .grouping(GroupingMode::Connected)
        .hasher(Box::new(NamedFingerprint))
        .build()
        .run(temp_dir.path())
        .unwrap()
        .into_report();

    assert_eq!(report.clusters.len(), 1);
    assert_eq!(report.clusters[0].len(), 3);
}

#[test]
fn every_image_appears_in_at_most_one_cluster() {
    let temp_dir = TempDir::new().unwrap();
    write_named(
        temp_dir.path(),
        &["1_0000.png", "2_0001.png", "3_0011.png", "4_0111.png", "5_1111.png", "6_1110.png"],
    );

    let report = Pipeline::builder()
        .threshold(1)
        .hasher(Box::new(NamedFingerprint))
        .build()
        .run(temp_dir.path())
        .unwrap()
        .into_report();

    let mut seen: Vec<PathBuf> = report
        .clusters
        .iter()
        .flatten()
        .map(|m| m.path.clone())
        .collect();
    let clustered = seen.len();
    seen.sort();
    seen.dedup();

    assert_eq!(seen.len(), clustered);
    assert!(report.clusters.iter().all(|c| c.len() >= 2));
}
