//! Page Chrome and Static Pages
//!
//! Markup shared by every route: the document head with styles, the landing
//! page, and the tutorial rendered from markdown. No protocol logic lives
//! here; the streamed payloads come from `inflow_core::wire`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pulldown_cmark::{html, Options, Parser};

/// Stylesheet shared by all pages.
const STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 800px; margin: 0 auto; padding: 2rem; }\n\
a { color: #0b66c3; }\n\
.loading { padding: 1rem; background-color: #f3f4f6; border-radius: 0.375rem; margin: 1rem 0; }\n\
.content { padding: 1rem; border: 1px solid #e5e7eb; border-radius: 0.375rem; margin: 1rem 0; }\n\
.explanation { background-color: #fffbeb; padding: 1rem; border-radius: 0.375rem; margin: 1rem 0; }\n\
.card { border: 1px solid #ddd; border-radius: 8px; padding: 20px; margin: 20px 0; background: #f9f9f9; }\n\
.button { display: inline-block; padding: 10px 20px; background: #0b66c3; color: white; text-decoration: none; border-radius: 5px; margin-top: 10px; }\n\
.comparison { display: flex; gap: 20px; }\n\
.comparison > div { flex: 1; }\n\
.user-profile, .posts-list { padding: 15px; border: 1px solid #ddd; border-radius: 8px; margin-bottom: 20px; }\n\
.post-item { margin: 10px 0; padding: 10px; border: 1px solid #eee; border-radius: 4px; }\n\
.post-title { font-weight: bold; margin-right: 10px; }\n\
pre { background-color: #f6f8fa; border-radius: 5px; padding: 1rem; overflow-x: auto; }\n\
code { font-family: ui-monospace, monospace; font-size: 0.9em; background-color: #f6f8fa; padding: 0.2em 0.4em; border-radius: 3px; }\n\
blockquote { margin: 1rem 0; padding: 0.5rem 1rem; border-left: 4px solid #0b66c3; background-color: #f6f8fa; }\n";

/// Open a streamed page: doctype, head with styles plus any extra head
/// markup, body, heading, and the site nav. The stream appends content and
/// eventually [`stream_page_close`].
#[must_use]
pub fn stream_page_open(title: &str, head_extra: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>{STYLE}</style>\n\
         {head_extra}\n\
         </head>\n<body>\n\
         <h1>{title}</h1>\n\
         <a href=\"/\">Home</a> | <a href=\"/blog\">Bare patch demo</a> | \
         <a href=\"/feed\">Instruction queue demo</a> | <a href=\"/guide\">Tutorial</a>\n"
    )
}

/// Close a streamed page.
#[must_use]
pub fn stream_page_close() -> String {
    "</body></html>\n".to_string()
}

/// A complete non-streamed page.
#[must_use]
pub fn chrome(title: &str, body: &str) -> String {
    format!("{}{body}{}", stream_page_open(title, ""), stream_page_close())
}

/// The landing page: what the two demos do and where the tutorial is.
#[must_use]
pub fn landing() -> String {
    chrome(
        "Streamed boundary replacement",
        "<p>Two renditions of the same idea: stream a page shell immediately, \
         then fill its placeholder regions as data becomes ready, without a reload.</p>\n\
         <div class=\"comparison\">\n\
         <div class=\"card\">\n\
         <h2>Bare patch</h2>\n\
         <p>Later chunks carry finished markup and an inline patch call that \
         splices it between the boundary sentinels.</p>\n\
         <ul>\n\
         <li>Simple and direct</li>\n\
         <li>Replaces markup only, no interactivity</li>\n\
         <li>Nested boundaries supported</li>\n\
         </ul>\n\
         <a href=\"/blog\" class=\"button\">Open the bare patch demo</a>\n\
         </div>\n\
         <div class=\"card\">\n\
         <h2>Instruction queue</h2>\n\
         <p>Later chunks push structured instructions into a queue; the \
         processor constructs registered components and wires their behavior \
         before patching.</p>\n\
         <ul>\n\
         <li>Carries component data, not markup</li>\n\
         <li>Constructed components are interactive</li>\n\
         <li>At-most-once replacement per boundary</li>\n\
         </ul>\n\
         <a href=\"/feed\" class=\"button\">Open the instruction queue demo</a>\n\
         </div>\n\
         </div>\n\
         <div class=\"card\">\n\
         <h2>Tutorial</h2>\n\
         <p>How the sentinel protocol, the patcher, and the queue processor fit together.</p>\n\
         <a href=\"/guide\" class=\"button\">Read the tutorial</a>\n\
         </div>\n",
    )
}

/// Render the tutorial document to a full HTML page.
///
/// # Errors
///
/// Fails when the document cannot be read from `path`.
pub fn render_guide(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read tutorial document: {}", path.display()))?;

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(&source, options);
    let mut rendered = String::with_capacity(source.len() * 2);
    html::push_html(&mut rendered, parser);

    Ok(chrome("How streamed boundary replacement works", &rendered))
}
