//! Shared test utilities.
//!
//! Builders for posts and timestamps, a site config rooted in a temp
//! directory, and a synthetic JPEG writer for tests that need real image
//! headers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let config = site_config(tmp.path());
//! create_test_jpeg(&tmp.path().join("post/1/1.jpg"), 64, 48);
//! let repo = MemoryRepository::new(vec![post(1, "hello", "2024-03-05 10:00:00")]);
//! ```

use crate::config::SiteConfig;
use crate::types::Post;
use chrono::{NaiveDate, NaiveDateTime};
use image::{ImageEncoder, RgbImage};
use std::path::Path;

// =========================================================================
// Dates
// =========================================================================

/// Parse `YYYY-MM-DD HH:MM:SS`. Panics on bad input.
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|e| panic!("bad test timestamp {s:?}: {e}"))
}

/// Parse `YYYY-MM-DD`. Panics on bad input.
pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad test date {s:?}: {e}"))
}

// =========================================================================
// Fixtures
// =========================================================================

/// A post by "chris" whose content is `<p>{subject}</p>`.
pub fn post(id: i64, subject: &str, posted: &str) -> Post {
    Post {
        id,
        subject: subject.to_string(),
        content: format!("<p>{subject}</p>"),
        post_date: ts(posted),
        modified_date: ts(posted),
        author_name: "chris".to_string(),
    }
}

/// Site config with `data_root` at `root` and base URL `http://blog.test`.
pub fn site_config(root: &Path) -> SiteConfig {
    SiteConfig {
        base_url: "http://blog.test".to_string(),
        data_root: root.to_path_buf(),
        ..SiteConfig::default()
    }
}

/// Write a small valid JPEG with the given dimensions, creating parents.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}
