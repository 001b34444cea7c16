//! Request orchestration for the single-post view.
//!
//! One call to [`PostPresenter::process`] handles one request, start to
//! finish, in this order:
//!
//! ```text
//! route token ──decode──▶ permalink ──lookup──▶ post
//!                  │                               │
//!          no '/'  ▼                               ▼
//!            latest post               neighbors ─▶ gallery ─▶ slots ─▶ serve
//! ```
//!
//! Nothing is cached between calls; every request builds a fresh
//! [`PostView`].
//!
//! Outcomes map onto the three templates:
//!
//! - a resolved post is served with `post.show`;
//! - no posts at all is `post.empty`;
//! - a permalink that matches nothing, or cannot be decoded past its `/`,
//!   is `post.invalid`.
//!
//! Storage failures, gallery failures and template output failures are
//! returned as [`PresentError`] and nothing is served.

use crate::config::SiteConfig;
use crate::gallery::{self, GalleryBuilder, GalleryError};
use crate::imaging::ImageBackend;
use crate::permalink::{self, DecodeError};
use crate::repository::{PostRepository, RepositoryError};
use crate::templates::{Template, TemplateError, Templates};
use crate::types::{Gallery, Post};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresentError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Everything the `post.show` template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub post: Post,
    /// `3rd Apr, 2024`
    pub display_date: String,
    pub gallery: Gallery,
    /// Rendered gallery, empty when the post has no images.
    pub gallery_markup: String,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl PostView {
    /// Slot assignments as `(region, slot, value)`.
    pub fn slots(&self) -> Vec<(&'static str, &'static str, String)> {
        vec![
            ("post.show", "content", self.post.content.clone()),
            ("post.show", "postbyuser", self.post.author_name.clone()),
            ("post.show", "postdate", self.display_date.clone()),
            ("post.show", "subject", self.post.subject.clone()),
            ("post.show", "gallery", self.gallery_markup.clone()),
            ("header", "pagetitle", format!(" - {}", self.post.subject)),
            ("post.next", "nextpost", self.next_url.clone().unwrap_or_default()),
            (
                "post.previous",
                "previouspost",
                self.previous_url.clone().unwrap_or_default(),
            ),
        ]
    }
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Shown(Box<PostView>),
    Empty,
    Invalid,
}

impl Outcome {
    pub fn template(&self) -> Template {
        match self {
            Outcome::Shown(_) => Template::Show,
            Outcome::Empty => Template::Empty,
            Outcome::Invalid => Template::Invalid,
        }
    }

    pub fn view(&self) -> Option<&PostView> {
        match self {
            Outcome::Shown(view) => Some(&**view),
            _ => None,
        }
    }
}

pub struct PostPresenter<R, B> {
    repo: R,
    gallery: GalleryBuilder<B>,
    base_url: String,
}

impl<R: PostRepository, B: ImageBackend> PostPresenter<R, B> {
    pub fn new(site: &SiteConfig, repo: R, backend: B) -> Self {
        Self {
            repo,
            gallery: GalleryBuilder::new(site, backend),
            base_url: site.base_url().to_string(),
        }
    }

    /// Resolve a route token and serve the matching template.
    ///
    /// An empty token, or one without a `/`, shows the latest post.
    pub fn process(
        &self,
        route_token: &str,
        templates: &mut impl Templates,
    ) -> Result<Outcome, PresentError> {
        let link = match permalink::decode(route_token) {
            Ok(link) => link,
            Err(DecodeError::MissingSeparator) => return self.show_latest(templates),
            Err(err) => {
                tracing::debug!(route_token, error = %err, "undecodable permalink");
                return Self::serve(Outcome::Invalid, templates);
            }
        };

        match self.repo.by_date_and_subject(link.date, &link.subject)? {
            Some(post) => self.render_post(Some(post), templates),
            None => {
                tracing::debug!(date = %link.date, subject = %link.subject, "no post at permalink");
                Self::serve(Outcome::Invalid, templates)
            }
        }
    }

    /// Show the most recent post, or the empty page when there are none.
    pub fn show_latest(&self, templates: &mut impl Templates) -> Result<Outcome, PresentError> {
        let post = self.repo.latest(1)?.into_iter().next();
        self.render_post(post, templates)
    }

    /// Fill the slots for `post` and serve `post.show`.
    pub fn render_post(
        &self,
        post: Option<Post>,
        templates: &mut impl Templates,
    ) -> Result<Outcome, PresentError> {
        let Some(post) = post else {
            return Self::serve(Outcome::Empty, templates);
        };

        let view = self.build_view(post)?;
        for (region, slot, value) in view.slots() {
            templates.set_slot(region, slot, value);
        }
        Self::serve(Outcome::Shown(Box::new(view)), templates)
    }

    /// Assemble the view for a resolved post without serving it.
    pub fn build_view(&self, post: Post) -> Result<PostView, PresentError> {
        tracing::debug!(post_id = post.id, subject = %post.subject, "rendering post");

        let neighbors = self.repo.neighbors(post.id)?;
        let gallery = self.gallery.build(post.id)?;
        let gallery_markup = gallery::render(&gallery, &self.base_url).into_string();

        Ok(PostView {
            display_date: permalink::humanize(post.post_date),
            previous_url: neighbors
                .previous
                .map(|p| permalink::encode(p.post_date, &p.subject)),
            next_url: neighbors
                .next
                .map(|p| permalink::encode(p.post_date, &p.subject)),
            gallery,
            gallery_markup,
            post,
        })
    }

    fn serve(outcome: Outcome, templates: &mut impl Templates) -> Result<Outcome, PresentError> {
        templates.serve(outcome.template())?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::repository::MemoryRepository;
    use crate::templates::RecordingTemplates;
    use crate::test_helpers::{post, site_config};
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> MemoryRepository {
        MemoryRepository::new(vec![
            post(1, "first post", "2024-01-10 08:00:00"),
            post(2, "hello world", "2024-03-05 18:30:00"),
            post(3, "latest & greatest", "2024-04-03 07:15:00"),
        ])
    }

    fn presenter(tmp: &TempDir, repo: MemoryRepository) -> PostPresenter<MemoryRepository, MockBackend> {
        PostPresenter::new(&site_config(tmp.path()), repo, MockBackend::new())
    }

    #[test]
    fn permalink_resolves_post_and_neighbors() {
        let tmp = TempDir::new().unwrap();
        let mut templates = RecordingTemplates::new();

        let outcome = presenter(&tmp, repo())
            .process("2024-03-05/hello%20world", &mut templates)
            .unwrap();

        let view = outcome.view().expect("post shown");
        assert_eq!(view.post.id, 2);
        assert_eq!(view.display_date, "5th Mar, 2024");
        assert_eq!(view.previous_url.as_deref(), Some("2024-01-10/first+post"));
        assert_eq!(view.next_url.as_deref(), Some("2024-04-03/latest+%26+greatest"));
        assert!(view.gallery.is_empty());
        assert_eq!(view.gallery_markup, "");
        assert_eq!(templates.served, Some(Template::Show));
    }

    #[test]
    fn slots_are_filled_for_show() {
        let tmp = TempDir::new().unwrap();
        let mut templates = RecordingTemplates::new();

        presenter(&tmp, repo())
            .process("2024-03-05/hello+world", &mut templates)
            .unwrap();

        assert_eq!(templates.slot("post.show", "subject"), "hello world");
        assert_eq!(templates.slot("post.show", "content"), "<p>hello world</p>");
        assert_eq!(templates.slot("post.show", "postbyuser"), "chris");
        assert_eq!(templates.slot("post.show", "postdate"), "5th Mar, 2024");
        assert_eq!(templates.slot("post.show", "gallery"), "");
        assert_eq!(templates.slot("header", "pagetitle"), " - hello world");
        assert_eq!(templates.slot("post.previous", "previouspost"), "2024-01-10/first+post");
        assert_eq!(
            templates.slot("post.next", "nextpost"),
            "2024-04-03/latest+%26+greatest"
        );
    }

    #[test]
    fn empty_token_shows_latest() {
        let tmp = TempDir::new().unwrap();
        let mut templates = RecordingTemplates::new();

        let outcome = presenter(&tmp, repo()).process("", &mut templates).unwrap();
        let view = outcome.view().unwrap();
        assert_eq!(view.post.id, 3);
        assert!(view.next_url.is_none());
        assert_eq!(templates.slot("post.next", "nextpost"), "");
    }

    #[test]
    fn token_without_separator_shows_latest() {
        let tmp = TempDir::new().unwrap();
        let p = presenter(&tmp, repo());

        let garbage = p.process("garbage", &mut RecordingTemplates::new()).unwrap();
        let empty = p.process("", &mut RecordingTemplates::new()).unwrap();
        assert_eq!(garbage, empty);
    }

    #[test]
    fn latest_ignores_id_order() {
        let tmp = TempDir::new().unwrap();
        // Highest id is not the newest post.
        let repo = MemoryRepository::new(vec![
            post(1, "newest", "2024-06-01 00:00:00"),
            post(2, "older", "2024-01-01 00:00:00"),
        ]);
        let outcome = presenter(&tmp, repo)
            .process("", &mut RecordingTemplates::new())
            .unwrap();
        assert_eq!(outcome.view().unwrap().post.subject, "newest");
    }

    #[test]
    fn unknown_permalink_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let mut templates = RecordingTemplates::new();

        let outcome = presenter(&tmp, repo())
            .process("2024-03-06/hello%20world", &mut templates)
            .unwrap();
        assert_eq!(outcome, Outcome::Invalid);
        assert_eq!(templates.served, Some(Template::Invalid));
        assert!(templates.slots.is_empty());
    }

    #[test]
    fn undecodable_permalink_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let p = presenter(&tmp, repo());
        for token in ["not-a-date/hello", "2024-03-05/%FF"] {
            let outcome = p.process(token, &mut RecordingTemplates::new()).unwrap();
            assert_eq!(outcome, Outcome::Invalid, "token {token:?}");
        }
    }

    #[test]
    fn no_posts_is_empty() {
        let tmp = TempDir::new().unwrap();
        let mut templates = RecordingTemplates::new();

        let outcome = presenter(&tmp, MemoryRepository::default())
            .process("", &mut templates)
            .unwrap();
        assert_eq!(outcome, Outcome::Empty);
        assert_eq!(templates.served, Some(Template::Empty));
    }

    #[test]
    fn render_post_none_is_empty() {
        let tmp = TempDir::new().unwrap();
        let outcome = presenter(&tmp, repo())
            .render_post(None, &mut RecordingTemplates::new())
            .unwrap();
        assert_eq!(outcome.template(), Template::Empty);
    }

    #[test]
    fn gallery_failure_is_a_hard_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("post/2");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("1.jpg"), "fake image").unwrap();

        let mut templates = RecordingTemplates::new();
        let result = presenter(&tmp, repo()).process("2024-03-05/hello+world", &mut templates);

        assert!(matches!(result, Err(PresentError::Gallery(_))));
        assert_eq!(templates.served, None);
    }

    #[test]
    fn gallery_markup_reaches_the_slot() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("post/2");
        fs::create_dir_all(dir.join("thumbs")).unwrap();
        fs::write(dir.join("1.jpg"), "fake image").unwrap();
        fs::write(dir.join("thumbs/1.jpg"), "fake image").unwrap();
        let backend = MockBackend::new()
            .with(dir.join("1.jpg"), 640, 480)
            .with(dir.join("thumbs/1.jpg"), 64, 48);

        let p = PostPresenter::new(&site_config(tmp.path()), repo(), backend);
        let mut templates = RecordingTemplates::new();
        let outcome = p.process("2024-03-05/hello+world", &mut templates).unwrap();

        let view = outcome.view().unwrap();
        assert_eq!(view.gallery.len(), 1);
        let markup = templates.slot("post.show", "gallery");
        assert_eq!(markup, view.gallery_markup);
        assert!(markup.contains(r#"src="http://blog.test/data/post/2/1.jpg" width="640" height="480""#));
        assert!(markup.contains("http://blog.test/web/images/prev.png"));
    }
}
