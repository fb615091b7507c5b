//! Display strings and status label resolution.
//!
//! All user-visible text flows through a [`Catalog`] so deployments can
//! swap translations in at composition time. Two namespaces exist: the
//! host's own strings (publication status names the host already
//! translates) and this service's strings. Lookups fall back to the msgid
//! itself, so an empty catalog yields the stock English wording.

use std::collections::HashMap;

use crate::filters::FilterChain;

// ---------------------------------------------------------------------------
// Message ids
// ---------------------------------------------------------------------------

// Wording is part of the client contract; the admin script matches on some
// of these verbatim.

pub const MSG_PARAMETER_MISSING: &str = "Oops! Failed to get necessary parameter.";
pub const MSG_PARAMETER_MISSING_DELETE: &str = "WTH! Failed to get necessary parameter.";
pub const MSG_INSERT_REFUSED: &str = "Insert comment refused.";
pub const MSG_DELETE_FAILED: &str = "Failed to delete comment.";
pub const MSG_NO_COMMENTS: &str = "No comments yet.";
pub const MSG_CONTENT_CHANGED: &str = "Content has changed.";

// Strings bundled for the admin-screen script.
pub const MSG_DELETE_FAILED_SHORT: &str = "Delete failed.";
pub const MSG_UPDATE_FAILED_SHORT: &str = "Update failed.";
pub const MSG_COMMENTS_LIMIT: &str = "The number of comments exceeds the limit.";
pub const MSG_NO_EMPTY: &str = "No empty.";

// Panel chrome. "Comments" and "Revisions" come from the host namespace;
// the host already ships translations for them.
pub const MSG_HEADING_COMMENTS: &str = "Comments";
pub const MSG_HEADING_REVISIONS: &str = "Revisions";
pub const MSG_HEADING_STATUS: &str = "Changed Status";
pub const MSG_SEND: &str = "Send";
pub const MSG_COLUMN_NAME: &str = "Recent Edit Comments";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Translation catalog with host and service namespaces.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    host: HashMap<String, String>,
    service: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a translation in the host namespace.
    pub fn set_host(&mut self, msgid: impl Into<String>, text: impl Into<String>) {
        self.host.insert(msgid.into(), text.into());
    }

    /// Register a translation in the service namespace.
    pub fn set(&mut self, msgid: impl Into<String>, text: impl Into<String>) {
        self.service.insert(msgid.into(), text.into());
    }

    /// Look up a service-namespace string, falling back to the msgid.
    pub fn translate<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.service.get(msgid).map(String::as_str).unwrap_or(msgid)
    }

    /// Look up a host-namespace string, falling back to the msgid.
    pub fn translate_host<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.host.get(msgid).map(String::as_str).unwrap_or(msgid)
    }
}

// ---------------------------------------------------------------------------
// Status labels
// ---------------------------------------------------------------------------

/// Uppercase the first character of a token.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolve a raw status token into its display label.
///
/// The three builtin publication statuses capitalize and resolve through
/// the host namespace; `trash` capitalizes and resolves through the service
/// namespace; anything else passes through the service namespace as-is, so
/// statuses registered by other plugins keep whatever label their own
/// translations provide.
pub fn status_label(catalog: &Catalog, token: &str) -> String {
    if token == "trash" {
        catalog.translate(&ucfirst(token)).to_string()
    } else if matches!(token, "publish" | "draft" | "private") {
        catalog.translate_host(&ucfirst(token)).to_string()
    } else {
        catalog.translate(token).to_string()
    }
}

/// [`status_label`] with the deployment's rewrite chain applied on top.
pub fn resolve_status_label(
    catalog: &Catalog,
    chain: &FilterChain<String>,
    token: &str,
) -> String {
    chain.apply(status_label(catalog, token))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
