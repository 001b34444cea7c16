use super::{PostRepository, RepositoryError, Result, check_limit};
use crate::permalink;
use crate::types::{AdjacentRef, Direction, Neighbors, Post};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use std::path::Path;

/// Layout timestamps are written in; `DATE()` understands it directly.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQL expression turning a stored timestamp column into
/// `YYYY-MM-DD HH:MM:SS` (UTC), or NULL when it cannot be read.
///
/// Accepts the same shapes as [`permalink::parse_timestamp`]: an optionally
/// signed run of digits is epoch seconds, anything else goes through
/// SQLite's own date parser. Plain `DATE(col)` would read a bare number as
/// a Julian day.
fn normalized_timestamp(column: &str) -> String {
    let value = format!("TRIM({column})");
    format!(
        "(CASE WHEN LTRIM({value}, '-') <> '' \
               AND LTRIM({value}, '-') NOT GLOB '*[^0-9]*' \
               AND {value} NOT GLOB '--*' \
          THEN DATETIME({value}, 'unixepoch') \
          ELSE DATETIME({value}) END)"
    )
}

/// A post to insert. Ids are assigned by SQLite.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub subject: &'a str,
    pub content: &'a str,
    pub post_date: NaiveDateTime,
    pub modified_date: NaiveDateTime,
    pub author_id: i64,
}

/// Posts stored in SQLite.
///
/// Schema (table names carry the configured prefix):
///
/// ```text
/// users(userid INTEGER PK, username TEXT)
/// posts(postid INTEGER PK, subject TEXT, content TEXT,
///       postdate TEXT, modifieddate TEXT, postby → users.userid)
/// ```
pub struct SqliteRepository {
    conn: Connection,
    posts: String,
    users: String,
}

impl SqliteRepository {
    /// Open an existing database read-only.
    ///
    /// A missing file is a [`RepositoryError::Storage`] error; nothing is
    /// created and no schema is written.
    pub fn open(db_path: &Path, table_prefix: &str) -> Result<Self> {
        tracing::debug!(path = %db_path.display(), "opening post database");
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::with_connection(conn, table_prefix))
    }

    /// Open or create a writable database and make sure the tables exist.
    ///
    /// Used for seeding; request handling goes through [`open`](Self::open).
    pub fn create(db_path: &Path, table_prefix: &str) -> Result<Self> {
        tracing::debug!(path = %db_path.display(), "creating post database");
        let repo = Self::with_connection(Connection::open(db_path)?, table_prefix);
        repo.init_schema()?;
        Ok(repo)
    }

    /// A fresh in-memory database with the tables created.
    pub fn open_in_memory(table_prefix: &str) -> Result<Self> {
        let repo = Self::with_connection(Connection::open_in_memory()?, table_prefix);
        repo.init_schema()?;
        Ok(repo)
    }

    fn with_connection(conn: Connection, table_prefix: &str) -> Self {
        Self {
            conn,
            posts: format!("{table_prefix}posts"),
            users: format!("{table_prefix}users"),
        }
    }

    fn init_schema(&self) -> Result<()> {
        let (posts, users) = (&self.posts, &self.users);
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {users} (
                userid INTEGER PRIMARY KEY,
                username TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS {posts} (
                postid INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                content TEXT NOT NULL,
                postdate TEXT NOT NULL,
                modifieddate TEXT NOT NULL,
                postby INTEGER NOT NULL REFERENCES {users}(userid)
            );

            CREATE INDEX IF NOT EXISTS idx_{posts}_postdate ON {posts}(postdate DESC);
            "#
        ))?;
        Ok(())
    }

    pub fn insert_user(&self, username: &str) -> Result<i64> {
        self.conn.execute(
            &format!("INSERT INTO {} (username) VALUES (?1)", self.users),
            [username],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_post(&self, post: &NewPost<'_>) -> Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (subject, content, postdate, modifieddate, postby)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                self.posts
            ),
            params![
                post.subject,
                post.content,
                post.post_date.format(TIMESTAMP_FORMAT).to_string(),
                post.modified_date.format(TIMESTAMP_FORMAT).to_string(),
                post.author_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn select_posts(&self) -> String {
        format!(
            "SELECT p.postid, p.subject, p.content, p.postdate, p.modifieddate, u.username
             FROM {} p INNER JOIN {} u ON (p.postby = u.userid)",
            self.posts, self.users
        )
    }
}

/// A row before its timestamps have been parsed.
struct PostRow {
    id: i64,
    subject: String,
    content: String,
    post_date: String,
    modified_date: String,
    author_name: String,
}

impl PostRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject: row.get(1)?,
            content: row.get(2)?,
            post_date: row.get(3)?,
            modified_date: row.get(4)?,
            author_name: row.get(5)?,
        })
    }

    fn into_post(self) -> Result<Post> {
        Ok(Post {
            post_date: parse_column(self.id, "postdate", &self.post_date)?,
            modified_date: parse_column(self.id, "modifieddate", &self.modified_date)?,
            id: self.id,
            subject: self.subject,
            content: self.content,
            author_name: self.author_name,
        })
    }
}

fn parse_column(id: i64, column: &'static str, value: &str) -> Result<NaiveDateTime> {
    permalink::parse_timestamp(value).map_err(|_| RepositoryError::Corrupt {
        id,
        column,
        value: value.to_string(),
    })
}

impl PostRepository for SqliteRepository {
    fn latest(&self, limit: u32) -> Result<Vec<Post>> {
        check_limit(limit)?;
        let sql = format!(
            "{} ORDER BY {} DESC, p.postid DESC LIMIT ?1",
            self.select_posts(),
            normalized_timestamp("p.postdate")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([limit], PostRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(PostRow::into_post).collect()
    }

    fn by_date_and_subject(&self, date: NaiveDate, subject: &str) -> Result<Option<Post>> {
        let sql = format!(
            "{} WHERE DATE({}) = ?1 AND p.subject = ?2 ORDER BY p.postid LIMIT 1",
            self.select_posts(),
            normalized_timestamp("p.postdate")
        );
        let row = self
            .conn
            .query_row(
                &sql,
                params![date.format("%Y-%m-%d").to_string(), subject],
                PostRow::from_row,
            )
            .optional()?;
        row.map(PostRow::into_post).transpose()
    }

    fn neighbors(&self, post_id: i64) -> Result<Neighbors> {
        let posts = &self.posts;
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT postid, subject, postdate, 'previous' AS pos
                FROM {posts} WHERE postid < ?1
                ORDER BY postid DESC LIMIT 1
            )
            UNION ALL
            SELECT * FROM (
                SELECT postid, subject, postdate, 'next' AS pos
                FROM {posts} WHERE postid > ?1
                ORDER BY postid ASC LIMIT 1
            )
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([post_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut neighbors = Neighbors::default();
        for (id, subject, post_date, pos) in rows {
            let direction = if pos == "previous" {
                Direction::Previous
            } else {
                Direction::Next
            };
            let adjacent = AdjacentRef {
                id,
                subject,
                post_date: parse_column(id, "postdate", &post_date)?,
                direction,
            };
            match direction {
                Direction::Previous => neighbors.previous = Some(adjacent),
                Direction::Next => neighbors.next = Some(adjacent),
            }
        }
        Ok(neighbors)
    }
}
