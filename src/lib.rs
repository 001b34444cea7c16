//! # Post View
//!
//! Read-time rendering of a single blog post: resolve a permalink, fetch the
//! post and its chronological neighbours, discover the images stored next to
//! it on disk, and hand everything to a page template.
//!
//! # Request Flow
//!
//! ```text
//! "2024-03-05/hello+world"
//!     │ permalink::decode
//!     ▼
//! (2024-03-05, "hello world") ──repository──▶ Post ─┬─▶ neighbors (by id)
//!                                                   └─▶ gallery (data/post/{id}/)
//!                                                          │
//!                                       slots + template ◀─┘
//! ```
//!
//! A token without a `/` (including the empty token) shows the newest post.
//! A token that decodes but matches nothing is served the invalid-post page.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`permalink`] | `YYYY-MM-DD/subject` encode, decode and the human date |
//! | [`repository`] | Post queries behind a trait, with SQLite and in-memory stores |
//! | [`gallery`] | Directory scan, thumbnail pairing, URL mapping, slideshow markup |
//! | [`imaging`] | Image header reads (pixel dimensions) |
//! | [`naming`] | Natural filename ordering (`img2` before `img10`) |
//! | [`presenter`] | One request end to end: token in, template served |
//! | [`templates`] | Slot-filling template collaborator, HTML and recording variants |
//! | [`config`] | `config.toml` loading, merging over defaults, validation |
//! | [`types`] | Shared data types (`Post`, `Neighbors`, `Gallery`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Injected Collaborators
//!
//! Storage, image reads and templates are traits passed into
//! [`presenter::PostPresenter`]. Tests run the whole request flow against
//! [`repository::MemoryRepository`] and [`templates::RecordingTemplates`]
//! without a database or HTML.
//!
//! ## Neighbours By Id
//!
//! Previous and next are the nearest posts by numeric id, not by post date.
//! Posts imported out of order can therefore link backwards in time.
//!
//! ## Maud For Markup
//!
//! Gallery markup and full pages are generated with maud, so every text slot
//! is escaped unless it is explicitly marked as markup.

pub mod config;
pub mod gallery;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod permalink;
pub mod presenter;
pub mod repository;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
