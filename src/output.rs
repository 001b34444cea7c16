//! CLI output formatting.
//!
//! Each listing has a `format_*` function that returns lines, and a
//! `print_*` wrapper that writes them to stdout. Format functions do no I/O.
//!
//! ## Latest
//!
//! ```text
//! 001 Hello world
//!     Date: 5th Mar, 2024
//!     Link: 2024-03-05/Hello+world
//!     By: chris
//! ```
//!
//! ## Gallery
//!
//! ```text
//! Post 7 (2 images)
//! 001 http://localhost/data/post/7/1.jpg (1600x1200)
//!     Thumbnail: http://localhost/data/post/7/thumbs/1.jpg (160x120)
//! 002 http://localhost/data/post/7/2.jpg (1600x1200)
//!     Thumbnail: http://localhost/data/post/7/thumbs/2.jpg (160x120)
//! ```

use crate::permalink;
use crate::types::{Gallery, GalleryImage, Post};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn image_label(image: &GalleryImage) -> String {
    format!("{} ({}x{})", image.url, image.width, image.height)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Latest posts
// ============================================================================

pub fn format_latest(posts: &[Post]) -> Vec<String> {
    if posts.is_empty() {
        return vec!["No posts".to_string()];
    }

    let mut lines = Vec::new();
    for (i, post) in posts.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), post.subject));
        lines.push(format!("    Date: {}", permalink::humanize(post.post_date)));
        lines.push(format!(
            "    Link: {}",
            permalink::encode(post.post_date, &post.subject)
        ));
        lines.push(format!("    By: {}", post.author_name));
    }
    lines
}

pub fn print_latest(posts: &[Post]) {
    for line in format_latest(posts) {
        println!("{}", line);
    }
}

// ============================================================================
// Gallery
// ============================================================================

pub fn format_gallery(post_id: i64, gallery: &Gallery) -> Vec<String> {
    if gallery.is_empty() {
        return vec![format!("Post {post_id} has no gallery")];
    }

    let mut lines = vec![format!(
        "Post {} ({})",
        post_id,
        plural(gallery.len(), "image", "images")
    )];
    for (i, entry) in gallery.entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), image_label(&entry.image)));
        lines.push(format!("    Thumbnail: {}", image_label(&entry.thumbnail)));
    }
    lines
}

pub fn print_gallery(post_id: i64, gallery: &Gallery) {
    for line in format_gallery(post_id, gallery) {
        println!("{}", line);
    }
}
