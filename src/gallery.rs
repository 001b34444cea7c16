//! Per-post image galleries discovered on disk.
//!
//! A post gets a gallery when its data directory holds full-size images:
//!
//! ```text
//! {data_root}/post/{post id}/
//! ├── 1.jpg                 # full-size, shown as slides
//! ├── 2.jpg
//! ├── 10.jpg
//! └── thumbs/
//!     ├── 1.jpg             # thumbnail for 1.jpg (same filename)
//!     ├── 2.jpg
//!     └── 10.jpg
//! ```
//!
//! ## Build
//!
//! [`GalleryBuilder::build`] lists the full-size files, sorts them in
//! [natural order](crate::naming), reads the pixel size of each image and of
//! its thumbnail, and maps both paths to public URLs by replacing the data
//! root with the configured data URL. A post without a directory, or with a
//! directory holding no matching files, has an empty gallery.
//!
//! Every full-size image must have a thumbnail. What happens when either
//! cannot be read, or a matching filename is not valid UTF-8, is decided by
//! [`ImageErrorPolicy`]: `Abort` fails the build, `Skip` leaves the pair out
//! and logs a warning.
//!
//! ## Render
//!
//! [`render`] turns a [`Gallery`] into the slideshow markup: one slide per
//! image, one pagination entry per thumbnail, and fixed previous/next
//! controls. Empty galleries render to nothing.

use crate::config::{GalleryConfig, ImageErrorPolicy, SiteConfig};
use crate::imaging::{BackendError, ImageBackend};
use crate::naming::natural_sort;
use crate::types::{Gallery, GalleryEntry, GalleryImage};
use maud::{Markup, html};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Characters escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error listing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read gallery image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: BackendError,
    },
    #[error("{} is not under the data root", .0.display())]
    OutsideDataRoot(PathBuf),
    #[error("Gallery filename is not valid UTF-8: {}", .0.display())]
    NonUtf8Name(PathBuf),
}

/// Discovers and describes post galleries.
pub struct GalleryBuilder<B> {
    data_root: PathBuf,
    data_url: String,
    config: GalleryConfig,
    backend: B,
}

impl<B: ImageBackend> GalleryBuilder<B> {
    pub fn new(site: &SiteConfig, backend: B) -> Self {
        Self {
            data_root: site.data_root.clone(),
            data_url: site.public_data_url(),
            config: site.gallery.clone(),
            backend,
        }
    }

    /// Directory holding the gallery for `post_id`.
    pub fn post_dir(&self, post_id: i64) -> PathBuf {
        self.data_root.join("post").join(post_id.to_string())
    }

    /// Build the gallery for a post. Missing or empty directories give an
    /// empty gallery.
    pub fn build(&self, post_id: i64) -> Result<Gallery, GalleryError> {
        let dir = self.post_dir(post_id);
        if !dir.is_dir() {
            tracing::debug!(post_id, dir = %dir.display(), "no gallery directory");
            return Ok(Gallery::default());
        }

        let names = self.full_size_names(post_id, &dir)?;
        let thumbs = dir.join(&self.config.thumbs_dir);
        let mut entries = Vec::with_capacity(names.len());

        for name in &names {
            match self.entry(&dir.join(name), &thumbs.join(name)) {
                Ok(entry) => entries.push(entry),
                Err(err) => self.tolerate(post_id, err)?,
            }
        }

        tracing::debug!(post_id, images = entries.len(), "gallery built");
        Ok(Gallery { entries })
    }

    /// Full-size image filenames directly inside `dir`, in natural order.
    fn full_size_names(&self, post_id: i64, dir: &Path) -> Result<Vec<String>, GalleryError> {
        let io_err = |source| GalleryError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let Some(name) = path.file_name() else {
                continue;
            };
            if name.as_encoded_bytes().starts_with(b".")
                || !path.is_file()
                || !self.config.matches_extension(&path)
            {
                continue;
            }
            match name.to_str() {
                Some(name) => names.push(name.to_string()),
                None => self.tolerate(post_id, GalleryError::NonUtf8Name(path.clone()))?,
            }
        }

        natural_sort(&mut names);
        Ok(names)
    }

    /// Apply the failure policy: `Skip` logs and carries on, `Abort` fails.
    fn tolerate(&self, post_id: i64, err: GalleryError) -> Result<(), GalleryError> {
        match self.config.on_image_error {
            ImageErrorPolicy::Skip => {
                tracing::warn!(post_id, error = %err, "skipping gallery image");
                Ok(())
            }
            ImageErrorPolicy::Abort => Err(err),
        }
    }

    fn entry(&self, image: &Path, thumbnail: &Path) -> Result<GalleryEntry, GalleryError> {
        Ok(GalleryEntry {
            image: self.describe(image)?,
            thumbnail: self.describe(thumbnail)?,
        })
    }

    fn describe(&self, path: &Path) -> Result<GalleryImage, GalleryError> {
        let dims = self
            .backend
            .identify(path)
            .map_err(|source| GalleryError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(GalleryImage {
            url: self.public_url(path)?,
            width: dims.width,
            height: dims.height,
        })
    }

    /// Map a file under the data root to the URL it is served at.
    pub fn public_url(&self, path: &Path) -> Result<String, GalleryError> {
        let relative = path
            .strip_prefix(&self.data_root)
            .map_err(|_| GalleryError::OutsideDataRoot(path.to_path_buf()))?;

        let mut url = self.data_url.clone();
        for segment in relative.iter() {
            url.push('/');
            url.extend(utf8_percent_encode(&segment.to_string_lossy(), SEGMENT));
        }
        Ok(url)
    }
}

/// Render the slideshow markup for a gallery.
///
/// `base_url` locates the navigation arrow images.
pub fn render(gallery: &Gallery, base_url: &str) -> Markup {
    if gallery.is_empty() {
        return html! {};
    }
    html! {
        div #gallery {
            div #slides {
                div.slides_container {
                    @for entry in &gallery.entries {
                        div {
                            img src=(entry.image.url) width=(entry.image.width) height=(entry.image.height);
                        }
                    }
                }
                div #slides_nav {
                    a.slide-prev href="#" {
                        img src={ (base_url) "/web/images/prev.png" } border="0";
                    }
                    ul.pagination {
                        @for entry in &gallery.entries {
                            li {
                                a href="#" {
                                    img src=(entry.thumbnail.url) width=(entry.thumbnail.width) height=(entry.thumbnail.height);
                                }
                            }
                        }
                    }
                    a.slide-next href="#" {
                        img src={ (base_url) "/web/images/next.png" } border="0";
                    }
                }
            }
        }
    }
}
