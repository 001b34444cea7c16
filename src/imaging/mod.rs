//! Image inspection — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` (reads headers only) |
//!
//! The gallery only ever needs pixel sizes, so the backend surface is a
//! single call. It sits behind the [`ImageBackend`] trait so gallery tests can
//! run against a mock without encoding real files.

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use rust_backend::{RustBackend, supported_extensions};
