//! Read-only post queries.
//!
//! [`PostRepository`] is the seam between the presenter and storage. Two
//! implementations ship with the crate:
//!
//! | Implementation | Backing store |
//! |---|---|
//! | [`SqliteRepository`] | `posts` + `users` tables in SQLite (rusqlite) |
//! | [`MemoryRepository`] | a `Vec<Post>`, for tests and demos |
//!
//! Both honor the same contract:
//!
//! - `latest(n)` returns at most `n` posts, newest `post_date` first.
//! - `by_date_and_subject` matches the calendar day of `post_date` and the
//!   subject byte for byte. No match is `Ok(None)`, never an error.
//! - `neighbors(id)` picks the closest ids on either side. Adjacency follows
//!   id order, which tracks posting order only as long as posts are created
//!   chronologically; imported or back-dated posts will link out of date
//!   order.

mod memory;
mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::{NewPost, SqliteRepository};

use crate::types::{Neighbors, Post};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Limit must be a positive integer, got {0}")]
    InvalidLimit(u32),
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("Post {id} has an unreadable {column}: {value:?}")]
    Corrupt {
        id: i64,
        column: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Read-only queries over stored posts.
pub trait PostRepository {
    /// Newest posts first, at most `limit` of them.
    fn latest(&self, limit: u32) -> Result<Vec<Post>>;

    /// The post published on `date` whose subject is exactly `subject`.
    fn by_date_and_subject(&self, date: NaiveDate, subject: &str) -> Result<Option<Post>>;

    /// Closest posts by id on either side of `post_id`.
    fn neighbors(&self, post_id: i64) -> Result<Neighbors>;
}

impl<R: PostRepository + ?Sized> PostRepository for &R {
    fn latest(&self, limit: u32) -> Result<Vec<Post>> {
        (**self).latest(limit)
    }

    fn by_date_and_subject(&self, date: NaiveDate, subject: &str) -> Result<Option<Post>> {
        (**self).by_date_and_subject(date, subject)
    }

    fn neighbors(&self, post_id: i64) -> Result<Neighbors> {
        (**self).neighbors(post_id)
    }
}

fn check_limit(limit: u32) -> Result<()> {
    if limit == 0 {
        return Err(RepositoryError::InvalidLimit(limit));
    }
    Ok(())
}
