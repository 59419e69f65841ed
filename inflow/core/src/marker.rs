//! Marker Protocol
//!
//! The shared vocabulary for placeholder regions. A boundary is present in
//! the tree from initial render as a *marker pair*: an opening sentinel
//! carrying the boundary id and its state, the fallback content, and a
//! closing sentinel. The real content arrives later in a hidden staging
//! container and replaces everything strictly between the pair.
//!
//! # Sentinel codes
//!
//! On the wire, sentinels are comment nodes whose data is a short code:
//!
//! | Code | Meaning                          |
//! |------|----------------------------------|
//! | `$$` | opening sentinel, still pending  |
//! | `$`  | opening sentinel, resolved       |
//! | `$!` | opening sentinel, errored        |
//! | `/$` | closing sentinel                 |
//!
//! Every opening sentinel has exactly one matching closing sentinel at the
//! same nesting depth; the fallback content and any nested boundaries live
//! strictly between them until resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::{Document, NodeId};

/// Identifier of a boundary region.
///
/// The server picks these: `B:<n>` in the bare variant, descriptive strings
/// like `profile-boundary` in the instruction-queue variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundaryId(pub String);

impl BoundaryId {
    /// Create a boundary id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BoundaryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Resolution state carried by an opening sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryState {
    /// Fallback content is showing; the real content has not arrived.
    Pending,
    /// The region was replaced with its real content.
    Resolved,
    /// The producer signalled an error; the fallback stays up.
    Errored,
}

impl BoundaryState {
    /// The wire code for this state.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pending => "$$",
            Self::Resolved => "$",
            Self::Errored => "$!",
        }
    }

    /// Parse a wire code back into a state.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "$$" => Some(Self::Pending),
            "$" => Some(Self::Resolved),
            "$!" => Some(Self::Errored),
            _ => None,
        }
    }
}

/// Whether a sentinel opens or closes a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// Opening sentinel with the boundary's current state.
    Open(BoundaryState),
    /// Closing sentinel.
    Close,
}

/// Wire code of the closing sentinel.
pub const CLOSE_CODE: &str = "/$";

impl MarkerKind {
    /// The wire code for this sentinel.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open(state) => state.code(),
            Self::Close => CLOSE_CODE,
        }
    }

    /// Parse a wire code back into a sentinel kind.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        if code == CLOSE_CODE {
            return Some(Self::Close);
        }
        BoundaryState::from_code(code).map(Self::Open)
    }

    /// Whether this sentinel opens a region, in any state. The balance walk
    /// counts pending, resolved, and errored openers alike.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Derive the staging-container id the queue processor tags constructed
/// content with.
#[must_use]
pub fn staging_container_id(boundary: &BoundaryId) -> String {
    format!("container-{boundary}")
}

/// Install a pending placeholder region at the end of `parent`:
/// opening sentinel, a `loading`-classed fallback with the given text, and
/// the closing sentinel, as three consecutive siblings.
///
/// Returns the opening sentinel's node.
pub fn install_placeholder(
    doc: &mut Document,
    parent: NodeId,
    boundary: &BoundaryId,
    fallback_text: &str,
) -> NodeId {
    let open = doc.create_marker(
        MarkerKind::Open(BoundaryState::Pending),
        Some(boundary.clone()),
    );
    doc.append_child(parent, open);

    let fallback = doc.create_element("div");
    doc.set_class(fallback, "loading");
    let text = doc.create_text(fallback_text);
    doc.append_child(fallback, text);
    doc.append_child(parent, fallback);

    let close = doc.create_marker(MarkerKind::Close, None);
    doc.append_child(parent, close);

    open
}
