//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, ImageLister, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory lister
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Lister implementation using the walkdir crate.
///
/// Entries are visited depth-first with each directory's children sorted
/// by file name, so repeated listings of an unchanged tree are identical.
pub struct WalkDirLister {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirLister {
    /// Create a new lister with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            filter: ImageFilter::new(),
        }
    }
}

impl ImageLister for WalkDirLister {
    fn list_with_events(&self, root: &Path, events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut result = ScanResult::default();

        // A folder that was never created or already cleaned up has no images
        if !root.is_dir() {
            warn!(root = %root.display(), "folder does not exist, nothing to scan");
            events.send(Event::Scan(ScanEvent::Completed { total_images: 0 }));
            return result;
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    // Unfollowed symlinks count only when they point at a file
                    let is_file = entry.file_type().is_file()
                        || (entry.path_is_symlink() && entry.path().is_file());
                    if !is_file {
                        continue;
                    }

                    let path = entry.path();
                    if !self.filter.should_include(path) {
                        continue;
                    }

                    events.send(Event::Scan(ScanEvent::ImageFound {
                        path: path.to_path_buf(),
                    }));
                    result.images.push(entry.into_path());
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let message = e.to_string();

                    let error = match e.into_io_error() {
                        Some(io) if io.kind() == io::ErrorKind::PermissionDenied => {
                            ScanError::PermissionDenied { path: path.clone() }
                        }
                        Some(io) => ScanError::ReadEntry {
                            path: path.clone(),
                            source: io,
                        },
                        // Symlink loops carry no underlying I/O error
                        None => ScanError::ReadEntry {
                            path: path.clone(),
                            source: io::Error::other(message),
                        },
                    };

                    warn!(error = %error, "skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    result.errors.push(error);
                }
            }
        }

        debug!(
            root = %root.display(),
            images = result.images.len(),
            errors = result.errors.len(),
            "listing finished"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_images: result.images.len(),
        }));

        result
    }
}
