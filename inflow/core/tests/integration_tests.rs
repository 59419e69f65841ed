//! Integration tests for the boundary-replacement protocol
//!
//! These tests verify that the tree, patcher, queue processor, and registry
//! work together across realistic streamed-page scenarios:
//! - at-most-once replacement under duplicate and repeated patch calls
//! - nested boundaries resolving out of order
//! - FIFO dispatch of queued instructions
//! - malformed payloads not halting the queue
//! - the full shell-to-resolved-profile flow of the instruction variant

use pretty_assertions::assert_eq;
use serde_json::json;

use inflow_core::{
    install_placeholder, patch, staging_container_id, BoundaryId, ClientRuntime, Directive,
    Document, NodeId, PatchOutcome, QueueEntry,
};

/// Build a shell document with one pending boundary per (id, fallback),
/// each wrapped in its own div the way the stream emits them.
fn shell(boundaries: &[(&str, &str)]) -> Document {
    let mut doc = Document::new();
    for (id, fallback) in boundaries {
        let wrapper = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, wrapper);
        install_placeholder(&mut doc, wrapper, &BoundaryId::from(*id), fallback);
    }
    doc
}

/// Append a hidden staging container with a single text child.
fn stage_text(doc: &mut Document, container_id: &str, text: &str) -> NodeId {
    let container = doc.create_element("div");
    doc.set_id(container, container_id);
    doc.set_hidden(container, true);
    let content = doc.create_text(text);
    doc.append_child(container, content);
    let body = doc.body();
    doc.append_child(body, container);
    container
}

// =============================================================================
// Test 1: Patch idempotence
// =============================================================================

/// A second patch call for a boundary whose staging container is gone must
/// leave the tree untouched.
#[test]
fn test_patch_twice_second_call_is_noop() {
    let mut doc = shell(&[("B:0", "loading")]);
    stage_text(&mut doc, "S:0", "article body");

    let boundary = BoundaryId::from("B:0");
    assert_eq!(patch(&mut doc, &boundary, "S:0", None), PatchOutcome::Replaced);
    let settled = doc.to_html(doc.body());

    assert_eq!(
        patch(&mut doc, &boundary, "S:0", None),
        PatchOutcome::MissingContainer
    );
    assert_eq!(doc.to_html(doc.body()), settled);
}

// =============================================================================
// Test 2: Nested boundaries resolving inner-first
// =============================================================================

/// With outer boundary A and inner boundary B sharing a parent, resolving B
/// first must leave A's pair balanced, and resolving A afterwards must
/// excise the stale inner residue along with A's fallback while the staged
/// replacement (which carries B's resolved content) survives.
#[test]
fn test_nested_boundaries_inner_then_outer() {
    let mut doc = Document::new();
    let outer = BoundaryId::from("A");
    let inner = BoundaryId::from("B");

    // body: openA "waiting-a" openB "waiting-b" /B /A
    let body = doc.body();
    install_placeholder(&mut doc, body, &outer, "waiting-a");
    let close_a = *doc.children(body).last().expect("outer closer");
    install_placeholder(&mut doc, body, &inner, "waiting-b");
    let inner_nodes: Vec<NodeId> = doc.children(body)[3..6].to_vec();
    for node in inner_nodes {
        doc.insert_before(close_a, node);
    }

    stage_text(&mut doc, &staging_container_id(&inner), "inner ready");
    assert_eq!(
        patch(&mut doc, &inner, &staging_container_id(&inner), None),
        PatchOutcome::Replaced
    );
    assert_eq!(doc.text_content(doc.body()), "waiting-ainner ready");

    // A's replacement arrives carrying the inner region in resolved form.
    let container = doc.create_element("div");
    doc.set_id(container, &staging_container_id(&outer));
    doc.set_hidden(container, true);
    let lead = doc.create_text("outer ready ");
    doc.append_child(container, lead);
    let inner_open = doc.create_marker(
        inflow_core::MarkerKind::Open(inflow_core::BoundaryState::Resolved),
        Some(inner.clone()),
    );
    doc.append_child(container, inner_open);
    let inner_body = doc.create_text("inner ready");
    doc.append_child(container, inner_body);
    let inner_close = doc.create_marker(inflow_core::MarkerKind::Close, None);
    doc.append_child(container, inner_close);
    let body = doc.body();
    doc.append_child(body, container);

    assert_eq!(
        patch(&mut doc, &outer, &staging_container_id(&outer), None),
        PatchOutcome::Replaced
    );

    assert_eq!(doc.text_content(doc.body()), "outer ready inner ready");
    let html = doc.to_html(doc.body());
    assert!(!html.contains("waiting"), "no fallback residue: {html}");
    assert!(html.contains("<!--$ A-->"), "outer marked resolved: {html}");
}

// =============================================================================
// Test 3: FIFO dispatch
// =============================================================================

/// Instructions enqueued as [1, 2, 3] are dispatched in exactly that order,
/// however many were queued before the first drain.
#[test]
fn test_instructions_dispatch_in_enqueue_order() {
    let doc = shell(&[("b1", "one"), ("b2", "two"), ("b3", "three")]);
    let mut rt = ClientRuntime::with_document(doc);

    for (index, id) in [(1u64, "b1"), (2, "b2"), (3, "b3")] {
        rt.enqueue(QueueEntry::raw(
            index,
            json!({
                "id": id,
                "component": "UserProfile",
                "props": {"userId": id},
                "data": {"name": format!("name-{id}"), "bio": "-"}
            })
            .to_string(),
        ));
    }
    rt.drain();
    rt.run_until_idle();

    // Patches run in dispatch order, so the resolve notifications come out
    // as b1, b2, b3.
    let order = rt.document_mut().take_notifications();
    assert_eq!(
        order,
        vec![
            BoundaryId::from("b1"),
            BoundaryId::from("b2"),
            BoundaryId::from("b3")
        ]
    );
}

// =============================================================================
// Test 4: At-most-once per boundary id
// =============================================================================

/// Two instructions for the same boundary produce exactly one tree
/// mutation; the second is dropped by the resolved-set check.
#[test]
fn test_duplicate_boundary_patched_once() {
    let doc = shell(&[("profile-boundary", "loading profile")]);
    let mut rt = ClientRuntime::with_document(doc);

    for (index, name) in [(1u64, "First"), (2, "Second")] {
        rt.enqueue(QueueEntry::raw(
            index,
            json!({
                "id": "profile-boundary",
                "component": "UserProfile",
                "props": {},
                "data": {"name": name, "bio": "-"}
            })
            .to_string(),
        ));
    }
    rt.drain();
    rt.run_until_idle();

    let text = rt.document().text_content(rt.document().body());
    assert!(text.contains("First"));
    assert!(!text.contains("Second"));
    assert_eq!(rt.document_mut().take_notifications().len(), 1);
}

// =============================================================================
// Test 5: Malformed payloads do not halt processing
// =============================================================================

/// A non-parseable payload is dropped and the following valid instruction
/// still resolves its boundary.
#[test]
fn test_malformed_payload_then_valid_instruction() {
    let doc = shell(&[("posts-boundary", "loading posts")]);
    let mut rt = ClientRuntime::with_document(doc);

    rt.enqueue(QueueEntry::raw(1, "][ not json at all"));
    rt.enqueue(QueueEntry::raw(
        2,
        json!({
            "id": "posts-boundary",
            "component": "PostsList",
            "props": {"userId": "u1"},
            "data": [{"id": 1, "title": "Chunked transfer", "upvotes": 9}]
        })
        .to_string(),
    ));
    rt.drain();
    rt.run_until_idle();

    assert!(rt.is_resolved(&BoundaryId::from("posts-boundary")));
    let text = rt.document().text_content(rt.document().body());
    assert!(text.contains("Chunked transfer"));
    assert!(!text.contains("loading posts"));
}

// =============================================================================
// Test 6: End-to-end instruction variant
// =============================================================================

/// Shell with pending `B:0` showing "loading"; a UserProfile instruction is
/// enqueued and drained; afterwards the rendered profile sits where the
/// fallback used to be and the staging container is gone from the tree.
#[test]
fn test_end_to_end_profile_resolution() {
    let doc = shell(&[("B:0", "loading")]);
    let mut rt = ClientRuntime::with_document(doc);
    assert_eq!(rt.document().text_content(rt.document().body()), "loading");

    rt.apply(Directive::Push {
        index: 1,
        payload: Some(
            json!({
                "id": "B:0",
                "component": "UserProfile",
                "props": {"userId": "u1"},
                "data": {"name": "Ann", "bio": "x"}
            })
            .to_string(),
        ),
    });
    rt.drain();
    rt.run_until_idle();

    let body = rt.document().body();
    let text = rt.document().text_content(body);
    assert!(text.contains("Ann"), "profile rendered: {text}");
    assert!(!text.contains("loading"), "fallback replaced: {text}");
    assert_eq!(
        rt.document()
            .element_by_id(&staging_container_id(&BoundaryId::from("B:0"))),
        None,
        "staging container must not stay attached"
    );

    // The spliced profile is interactive: find the like button and click it.
    let html = rt.document().to_html(body);
    assert!(html.contains("like-button"), "button present: {html}");
}

// =============================================================================
// Test 7: Bare variant driven by directives
// =============================================================================

/// The bare variant's two-step stream: staged content plus an immediate
/// patch directive, twice, with the second region nested inside content
/// delivered by the first.
#[test]
fn test_bare_variant_directive_sequence() {
    let doc = shell(&[("B:0", "loading blog content")]);
    let mut rt = ClientRuntime::with_document(doc);

    // Chunk 2: staging container whose content carries a nested pending
    // boundary, then the patch call.
    {
        let doc = rt.document_mut();
        let container = doc.create_element("div");
        doc.set_id(container, "S:0");
        doc.set_hidden(container, true);
        let article = doc.create_element("div");
        doc.set_class(article, "content");
        let lead = doc.create_text("first layer ");
        doc.append_child(article, lead);
        install_placeholder(doc, article, &BoundaryId::from("B:1"), "loading comments");
        doc.append_child(container, article);
        let body = doc.body();
        doc.append_child(body, container);
    }
    assert_eq!(
        rt.apply(Directive::Patch {
            boundary: BoundaryId::from("B:0"),
            container: "S:0".to_string(),
            error: None,
        }),
        Some(PatchOutcome::Replaced)
    );
    let text = rt.document().text_content(rt.document().body());
    assert!(text.contains("first layer"));
    assert!(text.contains("loading comments"));

    // Chunk 3: comments arrive for the nested boundary.
    stage_text(rt.document_mut(), "S:1", "two comments");
    assert_eq!(
        rt.apply(Directive::Patch {
            boundary: BoundaryId::from("B:1"),
            container: "S:1".to_string(),
            error: None,
        }),
        Some(PatchOutcome::Replaced)
    );

    let text = rt.document().text_content(rt.document().body());
    assert!(text.contains("two comments"));
    assert!(!text.contains("loading"));
}

// =============================================================================
// Test 8: Error token sustains the fallback
// =============================================================================

/// An errored patch keeps the fallback up and leaves the boundary
/// unresolved forever; no retry happens.
#[test]
fn test_error_token_sustains_fallback() {
    let mut doc = shell(&[("B:0", "still loading")]);
    stage_text(&mut doc, "S:0", "never seen");
    let mut rt = ClientRuntime::with_document(doc);

    assert_eq!(
        rt.apply(Directive::Patch {
            boundary: BoundaryId::from("B:0"),
            container: "S:0".to_string(),
            error: Some("UPSTREAM_TIMEOUT".to_string()),
        }),
        Some(PatchOutcome::Errored)
    );

    let html = rt.document().to_html(rt.document().body());
    assert!(html.contains("still loading"));
    assert!(html.contains("<!--$! B:0 dgst=UPSTREAM_TIMEOUT-->"));
    assert!(rt.document_mut().take_notifications().is_empty());
}
