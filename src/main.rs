//! # dupe-finder CLI
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! dupe-finder scan ./uploads/batch --threshold 8
//! dupe-finder scan ./uploads/batch --output json --relative
//! ```

mod cli;

use image_dupe_finder::Result;

fn main() -> Result<()> {
    cli::run()
}
