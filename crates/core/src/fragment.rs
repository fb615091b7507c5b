//! HTML fragment rendering for annotation lists and the editor panel.
//!
//! Everything here is pure string building; author resolution and storage
//! access happen upstream. The produced markup is a client contract: the
//! admin screen's script and stylesheet address entries by the `aec-`
//! ids and classes emitted here, so the vocabulary is load-bearing even
//! where it looks decorative.

use std::borrow::Cow;

use crate::annotation::{Annotation, StatusChange, Subtype, AVATAR_SIZE};
use crate::filters::FilterChain;
use crate::labels::{
    resolve_status_label, Catalog, MSG_CONTENT_CHANGED, MSG_HEADING_COMMENTS,
    MSG_HEADING_REVISIONS, MSG_HEADING_STATUS, MSG_NO_COMMENTS, MSG_SEND,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Where a fragment is headed; the overview column hides delete controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Full panel on the item's edit screen.
    Edit,
    /// Compact preview in the list-view column.
    Column,
}

/// One annotation plus everything resolved about it for display.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub annotation: Annotation,
    /// Author display name; empty when the account no longer resolves.
    pub author_name: String,
    pub avatar_url: Option<String>,
    /// Whether the viewing user wrote this annotation.
    pub is_viewer: bool,
}

/// Display-time configuration shared by every entry of one fragment.
pub struct RenderContext<'a> {
    /// Advisory annotation ceiling; at or above it the fragment is flagged.
    pub cap: usize,
    /// Prefix for revision diff links; the revision id is appended.
    pub revision_link_base: &'a str,
    pub catalog: &'a Catalog,
    /// Deployment rewrites applied to resolved status labels.
    pub status_label: &'a FilterChain<String>,
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Render the annotation list fragment for one content item.
///
/// With no entries this is just the translated empty-state message, not
/// markup. Otherwise the fragment carries the accordion scaffolding, a
/// hidden `aec_limit` flag set to `exceeds` once the entry count reaches
/// the cap, and one `<article>` per annotation in the given order.
pub fn render_annotations(
    parent_id: DbId,
    entries: &[EntryView],
    mode: RenderMode,
    ctx: &RenderContext<'_>,
) -> String {
    if entries.is_empty() {
        return ctx.catalog.translate(MSG_NO_COMMENTS).to_string();
    }

    let count = entries.len();
    let multi_class = if count > 1 { " has_multiple_item" } else { "" };
    let limit_flag = if count >= ctx.cap { "exceeds" } else { "" };

    let mut html = format!(
        "<div class=\"aec-column-wrap{multi_class}\">\n\
         <input type=\"hidden\" name=\"aec_limit\" value=\"{limit_flag}\">\n\
         <input type=\"checkbox\" id=\"aec-accordion-switch_{parent_id}\">\n\
         <label for=\"aec-accordion-switch_{parent_id}\" class=\"dashicons\"></label>\n\
         <div class=\"aec-data-wrap\" data-posts-num=\"{count}\">\n"
    );
    for entry in entries {
        html.push_str(&render_entry(entry, mode, ctx));
        html.push('\n');
    }
    html.push_str("</div></div>");
    html
}

/// Render one annotation entry.
pub fn render_entry(entry: &EntryView, mode: RenderMode, ctx: &RenderContext<'_>) -> String {
    let annotation = &entry.annotation;
    let token = annotation.subtype.as_str();

    let class = if entry.is_viewer {
        format!("{token} aec-single")
    } else {
        format!("{token} others aec-single")
    };

    // Only an author's own free-text comments are deletable, and only from
    // the edit screen.
    let delete_button = if entry.is_viewer
        && annotation.subtype == Subtype::Comment
        && mode == RenderMode::Edit
    {
        format!(
            " <span class=\"aec_delete dashicons dashicons-trash\" comment_id=\"{}\"></span>",
            annotation.id
        )
    } else {
        String::new()
    };

    let author_name = esc(&entry.author_name);
    let date = annotation.created_at.format("%Y-%m-%d %H:%M:%S");
    let text = entry_text(annotation, ctx);

    match annotation.subtype {
        Subtype::Comment => {
            let avatar = entry
                .avatar_url
                .as_deref()
                .map(|url| {
                    format!(
                        "<img class=\"avatar\" src=\"{}\" width=\"{AVATAR_SIZE}\" \
                         height=\"{AVATAR_SIZE}\" alt=\"\">",
                        esc(url)
                    )
                })
                .unwrap_or_default();
            format!(
                "<article id=\"aec-{id}\" class=\"{class}\">\
                 <picture class=\"aec-avatar\">{avatar}</picture>\
                 <div class=\"aec-content\">\
                 <header class=\"aec-header\">\
                 <div class=\"aec-author\"><strong class=\"aec-author_name\">{author_name}</strong></div>\
                 </header>\
                 <div class=\"aec-content-body\">{text}\
                 <div class=\"aec-content-footer\"><span class=\"aec-content-date\">{date}</span>{delete_button}</div>\
                 </div>\
                 </div>\
                 </article>",
                id = annotation.id,
            )
        }
        Subtype::Revision | Subtype::Status => {
            let icon_label = esc(ctx.catalog.translate(token));
            format!(
                "<article id=\"aec-{id}\" class=\"{class}\">\
                 <div class=\"aec-content\">\
                 <div class=\"aec-content-body\"><span class=\"{token} excerpt-icon\">{icon_label}</span> {text}</div>\
                 <div class=\"aec-content-footer\"><strong class=\"aec-author_name\">{author_name}</strong> \
                 <span class=\"aec-content-date\">{date}</span>{delete_button}</div>\
                 </div>\
                 </article>",
                id = annotation.id,
            )
        }
    }
}

/// Render the body text of one annotation, per subtype.
///
/// Comments escape and convert newlines to `<br />`. Revision markers
/// become a link to the host's revision diff screen. Status markers render
/// `old » new` with resolved display labels, degrading to whatever tokens
/// the stored body actually has.
pub fn entry_text(annotation: &Annotation, ctx: &RenderContext<'_>) -> String {
    match annotation.subtype {
        Subtype::Revision => format!(
            "<a href=\"{}{}\">{}</a>",
            esc(ctx.revision_link_base),
            esc(&annotation.body),
            esc(ctx.catalog.translate(MSG_CONTENT_CHANGED)),
        ),
        Subtype::Status => {
            let change = StatusChange::parse(&annotation.body);
            let old_label = resolve_status_label(ctx.catalog, ctx.status_label, &change.old);
            match change.new {
                Some(new) => {
                    let resolved = resolve_status_label(ctx.catalog, ctx.status_label, &new);
                    let new_label = ctx.catalog.translate(&resolved);
                    format!(
                        "{} <span class=\"raquo\">&raquo;</span> <strong>{}</strong>",
                        esc(&old_label),
                        esc(new_label),
                    )
                }
                None => esc(&old_label).into_owned(),
            }
        }
        Subtype::Comment => nl2br(esc(&annotation.body).as_ref()),
    }
}

/// Render the edit-screen panel: subtype toggles, the annotation list, the
/// input area, and the submit button.
///
/// The revisions toggle only appears when the parent's content type keeps
/// revisions at all.
pub fn render_panel(fragment: &str, revisions_supported: bool, catalog: &Catalog) -> String {
    let mut toggles = format!(
        "<label><input type=\"checkbox\" id=\"aec_checkbox_{}\" checked>{}</label>",
        Subtype::Comment.as_str(),
        esc(catalog.translate_host(MSG_HEADING_COMMENTS)),
    );
    if revisions_supported {
        toggles.push_str(&format!(
            "<label><input type=\"checkbox\" id=\"aec_checkbox_{}\" checked>{}</label>",
            Subtype::Revision.as_str(),
            esc(catalog.translate_host(MSG_HEADING_REVISIONS)),
        ));
    }
    toggles.push_str(&format!(
        "<label><input type=\"checkbox\" id=\"aec_checkbox_{}\" checked>{}</label>",
        Subtype::Status.as_str(),
        esc(catalog.translate(MSG_HEADING_STATUS)),
    ));

    format!(
        "<div id=\"aec_checkbox_wrap\">{toggles}</div>\n\
         <div id=\"aec_comment_wrap\">{fragment}</div>\n\
         <div id=\"aec_text_area_wrap\"><textarea name=\"aec_comment_text_area\" placeholder=\"\" rows=\"3\"></textarea></div>\n\
         <div id=\"aec_submit_wrap\"><input class=\"button button-primary\" type=\"button\" name=\"aec_submit\" value=\"{send}\"></div>",
        send = esc(catalog.translate(MSG_SEND)),
    )
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Escape text for interpolation into markup or a quoted attribute.
fn esc(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Insert `<br />` before every newline sequence, keeping the newline.
///
/// `\r\n` and `\n\r` pairs count as a single break.
pub fn nl2br(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                out.push_str("<br />");
                out.push(c);
                if chars.peek() == Some(&'\r') {
                    out.push('\r');
                    chars.next();
                }
            }
            '\r' => {
                out.push_str("<br />");
                out.push(c);
                if chars.peek() == Some(&'\n') {
                    out.push('\n');
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
