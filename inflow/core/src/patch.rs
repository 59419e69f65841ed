//! Boundary Patcher
//!
//! Pure tree surgery: given a boundary id and the id of a staging container
//! holding the real content, excise everything between the boundary's
//! sentinel pair and splice the staged content in its place.
//!
//! The excision walk is depth-balanced. Scanning forward from the opening
//! sentinel's next sibling, any opening-class sentinel (pending, resolved,
//! or errored) increments a counter and a closing sentinel decrements it;
//! the matching closer is the one reached with the counter at zero. This
//! skips over nested boundaries instead of terminating early on their
//! closing markers.
//!
//! Every miss is an outcome, not an error: a patch against a missing
//! container or missing boundary is a no-op, which is what makes the
//! operation idempotent in effect.

use tracing::{debug, warn};

use crate::marker::{BoundaryId, BoundaryState, MarkerKind};
use crate::tree::{Document, NodeId, NodeKind};

/// What a patch invocation did to the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The region was excised and the staged content spliced in.
    Replaced,
    /// An error token was attached; the fallback stays up.
    Errored,
    /// No staging container with that id is attached. Nothing happened.
    MissingContainer,
    /// No opening sentinel for that boundary is attached. The container was
    /// consumed but nothing was spliced.
    MissingBoundary,
    /// The boundary had already left the pending state; a late signal was
    /// ignored.
    Stale,
}

/// Replace a boundary's placeholder region with staged content, or mark it
/// errored.
///
/// The staging container must already be in the tree; it is detached
/// immediately and never reattached. With `error_token` present the region
/// is left alone and the opening sentinel records the token as its digest.
pub fn patch(
    doc: &mut Document,
    boundary: &BoundaryId,
    container_id: &str,
    error_token: Option<&str>,
) -> PatchOutcome {
    let Some(container) = doc.element_by_id(container_id) else {
        debug!(boundary = %boundary, container = container_id, "no staging container, skipping");
        return PatchOutcome::MissingContainer;
    };
    doc.detach(container);

    let Some(open) = doc.open_marker_for(boundary) else {
        debug!(boundary = %boundary, "no opening sentinel, skipping");
        return PatchOutcome::MissingBoundary;
    };

    if let Some(token) = error_token {
        if !is_pending(doc, open) {
            debug!(boundary = %boundary, "late error token for settled boundary, ignoring");
            return PatchOutcome::Stale;
        }
        doc.set_marker_state(open, BoundaryState::Errored);
        doc.set_marker_digest(open, token);
        debug!(boundary = %boundary, token, "boundary errored, fallback stays");
        return PatchOutcome::Errored;
    }

    let Some(close) = find_matching_close(doc, open) else {
        warn!(boundary = %boundary, "unbalanced sentinel pair, refusing to splice");
        return PatchOutcome::MissingBoundary;
    };

    // Excise everything strictly between the pair: the fallback content and
    // any residue of nested, independently resolved sub-markers.
    while let Some(next) = doc.next_sibling(open) {
        if next == close {
            break;
        }
        doc.detach(next);
    }

    // Move the staged children, in original order, into the vacated region.
    let staged: Vec<NodeId> = doc.children(container).to_vec();
    for child in staged {
        doc.insert_before(close, child);
    }

    doc.set_marker_state(open, BoundaryState::Resolved);
    doc.notify_resolved(boundary.clone());
    debug!(boundary = %boundary, "region replaced");
    PatchOutcome::Replaced
}

fn is_pending(doc: &Document, open: NodeId) -> bool {
    matches!(
        doc.kind(open),
        NodeKind::Marker {
            kind: MarkerKind::Open(BoundaryState::Pending),
            ..
        }
    )
}

/// Find the closing sentinel matching `open` among its following siblings,
/// skipping complete nested pairs. Read-only; the caller excises afterwards.
fn find_matching_close(doc: &Document, open: NodeId) -> Option<NodeId> {
    let mut depth = 0u32;
    let mut current = doc.next_sibling(open);
    while let Some(node) = current {
        if let NodeKind::Marker { kind, .. } = doc.kind(node) {
            match kind {
                MarkerKind::Open(_) => depth += 1,
                MarkerKind::Close => {
                    if depth == 0 {
                        return Some(node);
                    }
                    depth -= 1;
                }
            }
        }
        current = doc.next_sibling(node);
    }
    None
}
