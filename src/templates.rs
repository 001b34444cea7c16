//! The templating collaborator.
//!
//! The presenter never builds pages itself. It fills named slots, grouped by
//! template region, and then asks for one of three templates to be served:
//!
//! | Template | When |
//! |---|---|
//! | `post.show` | a post was resolved |
//! | `post.empty` | there are no posts at all |
//! | `post.invalid` | a permalink matched nothing |
//!
//! [`HtmlTemplates`] renders complete documents with maud. Slots named
//! `content` and `gallery` carry markup and are inserted as-is; every other
//! slot is text and gets escaped. [`RecordingTemplates`] keeps the slots and
//! the served template in memory for callers that want the data instead of
//! a page.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The named templates a request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Template {
    #[serde(rename = "post.show")]
    Show,
    #[serde(rename = "post.empty")]
    Empty,
    #[serde(rename = "post.invalid")]
    Invalid,
}

impl Template {
    pub fn name(self) -> &'static str {
        match self {
            Template::Show => "post.show",
            Template::Empty => "post.empty",
            Template::Invalid => "post.invalid",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slot assignment plus a final serve.
pub trait Templates {
    fn set_slot(&mut self, region: &str, slot: &str, value: String);

    fn serve(&mut self, template: Template) -> Result<(), TemplateError>;
}

/// Slot values keyed by region, then slot name.
pub type Slots = BTreeMap<String, BTreeMap<String, String>>;

fn slot<'a>(slots: &'a Slots, region: &str, name: &str) -> &'a str {
    slots
        .get(region)
        .and_then(|r| r.get(name))
        .map(String::as_str)
        .unwrap_or("")
}

// ============================================================================
// Recording
// ============================================================================

/// Keeps everything it is given. Serving does not write anywhere.
#[derive(Debug, Default, Serialize)]
pub struct RecordingTemplates {
    pub slots: Slots,
    pub served: Option<Template>,
}

impl RecordingTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, region: &str, name: &str) -> &str {
        slot(&self.slots, region, name)
    }
}

impl Templates for RecordingTemplates {
    fn set_slot(&mut self, region: &str, slot: &str, value: String) {
        self.slots
            .entry(region.to_string())
            .or_default()
            .insert(slot.to_string(), value);
    }

    fn serve(&mut self, template: Template) -> Result<(), TemplateError> {
        self.served = Some(template);
        Ok(())
    }
}

// ============================================================================
// HTML
// ============================================================================

/// Renders served templates as HTML documents into `out`.
pub struct HtmlTemplates<W> {
    site_title: String,
    base_url: String,
    slots: Slots,
    out: W,
}

impl<W: Write> HtmlTemplates<W> {
    pub fn new(site_title: &str, base_url: &str, out: W) -> Self {
        Self {
            site_title: site_title.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            slots: Slots::new(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn slot(&self, region: &str, name: &str) -> &str {
        slot(&self.slots, region, name)
    }

    fn post_link(&self, permalink: &str) -> String {
        format!("{}/post/{}", self.base_url, permalink)
    }

    fn document(&self, title: &str, body: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (title) }
                }
                body {
                    header.site-header {
                        a href={ (self.base_url) "/" } { (self.site_title) }
                    }
                    (body)
                }
            }
        }
    }

    fn render_show(&self) -> Markup {
        let previous = self.slot("post.previous", "previouspost");
        let next = self.slot("post.next", "nextpost");
        let title = format!("{}{}", self.site_title, self.slot("header", "pagetitle"));

        let body = html! {
            main.post {
                article {
                    h1 { (self.slot("post.show", "subject")) }
                    p.byline {
                        "Posted by " (self.slot("post.show", "postbyuser"))
                        " on " (self.slot("post.show", "postdate"))
                    }
                    div.content { (PreEscaped(self.slot("post.show", "content"))) }
                    (PreEscaped(self.slot("post.show", "gallery")))
                }
                nav.post-nav {
                    @if !previous.is_empty() {
                        a.previous href=(self.post_link(previous)) { "Previous" }
                    }
                    @if !next.is_empty() {
                        a.next href=(self.post_link(next)) { "Next" }
                    }
                }
            }
        };
        self.document(&title, body)
    }

    fn render_notice(&self, message: &str) -> Markup {
        let body = html! {
            main.notice {
                p { (message) }
            }
        };
        self.document(&self.site_title, body)
    }
}

impl<W: Write> Templates for HtmlTemplates<W> {
    fn set_slot(&mut self, region: &str, slot: &str, value: String) {
        self.slots
            .entry(region.to_string())
            .or_default()
            .insert(slot.to_string(), value);
    }

    fn serve(&mut self, template: Template) -> Result<(), TemplateError> {
        let page = match template {
            Template::Show => self.render_show(),
            Template::Empty => self.render_notice("Nothing has been posted yet."),
            Template::Invalid => self.render_notice("That post could not be found."),
        };
        self.out.write_all(page.into_string().as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_templates() -> HtmlTemplates<Vec<u8>> {
        HtmlTemplates::new("Blog", "http://blog.test/", Vec::new())
    }

    fn output(t: HtmlTemplates<Vec<u8>>) -> String {
        String::from_utf8(t.into_inner()).unwrap()
    }

    #[test]
    fn template_names() {
        assert_eq!(Template::Show.to_string(), "post.show");
        assert_eq!(Template::Empty.name(), "post.empty");
        assert_eq!(Template::Invalid.name(), "post.invalid");
        assert_eq!(
            serde_json::to_string(&Template::Invalid).unwrap(),
            "\"post.invalid\""
        );
    }

    #[test]
    fn recording_keeps_slots_and_template() {
        let mut t = RecordingTemplates::new();
        t.set_slot("post.show", "subject", "Hi".to_string());
        t.set_slot("post.show", "subject", "Hello".to_string());
        t.serve(Template::Show).unwrap();

        assert_eq!(t.slot("post.show", "subject"), "Hello");
        assert_eq!(t.slot("post.show", "missing"), "");
        assert_eq!(t.served, Some(Template::Show));
    }

    #[test]
    fn show_page_fills_slots() {
        let mut t = html_templates();
        t.set_slot("post.show", "subject", "Fish & chips".to_string());
        t.set_slot("post.show", "content", "<p>Lunch</p>".to_string());
        t.set_slot("post.show", "postbyuser", "chris".to_string());
        t.set_slot("post.show", "postdate", "3rd Apr, 2024".to_string());
        t.set_slot("post.show", "gallery", r#"<div id="gallery"></div>"#.to_string());
        t.set_slot("header", "pagetitle", " - Fish & chips".to_string());
        t.set_slot("post.previous", "previouspost", "2024-04-01/older".to_string());
        t.set_slot("post.next", "nextpost", String::new());
        t.serve(Template::Show).unwrap();

        let html = output(t);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Blog - Fish &amp; chips</title>"));
        assert!(html.contains("<h1>Fish &amp; chips</h1>"));
        assert!(html.contains(r#"<div class="content"><p>Lunch</p></div>"#));
        assert!(html.contains(r#"<div id="gallery"></div>"#));
        assert!(html.contains("Posted by chris on 3rd Apr, 2024"));
        assert!(html.contains(
            r#"<a class="previous" href="http://blog.test/post/2024-04-01/older">Previous</a>"#
        ));
        assert!(!html.contains(r#"class="next""#));
    }

    #[test]
    fn empty_and_invalid_pages() {
        let mut t = html_templates();
        t.serve(Template::Empty).unwrap();
        assert!(output(t).contains("Nothing has been posted yet."));

        let mut t = html_templates();
        t.serve(Template::Invalid).unwrap();
        let html = output(t);
        assert!(html.contains("That post could not be found."));
        assert!(html.contains("<title>Blog</title>"));
    }
}
