//! Shared types passed between the repository, gallery and presenter.
//!
//! Everything here is read-only data: posts come out of storage, galleries
//! come out of the filesystem, and neither is written back by this crate.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A blog post as stored in the `posts` table joined to its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Storage-assigned id. Unique, but not the lookup key for permalinks.
    pub id: i64,
    pub subject: String,
    /// Rich text body, already HTML.
    pub content: String,
    pub post_date: NaiveDateTime,
    pub modified_date: NaiveDateTime,
    /// Username of the author (`users.username`).
    pub author_name: String,
}

/// Which side of the current post a neighbor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

/// The slice of a neighboring post needed to link to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacentRef {
    pub id: i64,
    pub subject: String,
    pub post_date: NaiveDateTime,
    pub direction: Direction,
}

/// Result of an adjacency query. Either side may be missing at the ends of
/// the post list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<AdjacentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<AdjacentRef>,
}

/// One image reachable from the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A full-size image paired with its thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    pub image: GalleryImage,
    pub thumbnail: GalleryImage,
}

/// Ordered gallery for a post, in natural filename order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Gallery {
    pub entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
