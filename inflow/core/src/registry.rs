//! Component Registry
//!
//! The closed set of components an instruction can name, behind a single
//! dispatch surface. Each variant constructs a node tree from
//! `(props, data)` and wires its interactive behavior into a [`Bindings`]
//! store as a side effect of construction.
//!
//! Constructors are pure with respect to their inputs: all per-instance
//! state (like counts, upvote counts) lives in the binding created for that
//! instance. No persistence, no cross-instance sharing; a counter displays
//! exactly the number of interactions observed on that instance.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::tree::{Document, NodeId};

/// A component the registry knows how to construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    /// A user profile card with a like button.
    UserProfile,
    /// A list of posts with upvote and comment buttons.
    PostsList,
}

impl ComponentKind {
    /// Resolve a registry name. `None` means the component is unknown and
    /// the instruction naming it will be dropped.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UserProfile" => Some(Self::UserProfile),
            "PostsList" => Some(Self::PostsList),
            _ => None,
        }
    }

    /// The registry name of this component.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserProfile => "UserProfile",
            Self::PostsList => "PostsList",
        }
    }

    /// Construct the component, returning the root of the new subtree. The
    /// subtree is detached; the caller stages it.
    pub fn construct(
        self,
        doc: &mut Document,
        bindings: &mut Bindings,
        props: &serde_json::Map<String, Value>,
        data: &Value,
    ) -> NodeId {
        debug!(component = self.name(), "constructing component");
        match self {
            Self::UserProfile => construct_user_profile(doc, bindings, props, data),
            Self::PostsList => construct_posts_list(doc, bindings, props, data),
        }
    }
}

/// Interactive behavior attached to constructed nodes.
///
/// The abstract-tree equivalent of event listeners: a node id maps to an
/// action closing over its per-instance counter, and [`Bindings::click`]
/// performs the mutation a click would.
#[derive(Debug, Default)]
pub struct Bindings {
    actions: HashMap<NodeId, Action>,
    notices: Vec<String>,
}

#[derive(Debug)]
enum Action {
    /// Increment a like counter and rewrite its display text.
    Like {
        count_node: NodeId,
        clicks: u32,
    },
    /// Increment an upvote count shown inside the button label itself.
    Upvote {
        label_node: NodeId,
        count: u32,
    },
    /// Record a "commenting on" notice for the post title.
    Comment {
        title: String,
    },
}

impl Bindings {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a node has interactive behavior attached.
    #[must_use]
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.actions.contains_key(&node)
    }

    /// Deliver a click to a node. Returns false when the node has no
    /// binding.
    pub fn click(&mut self, doc: &mut Document, node: NodeId) -> bool {
        match self.actions.get_mut(&node) {
            Some(Action::Like { count_node, clicks }) => {
                *clicks += 1;
                doc.set_text(*count_node, &clicks.to_string());
                true
            }
            Some(Action::Upvote { label_node, count }) => {
                *count += 1;
                let label = format!("\u{1F44D} {count}");
                doc.set_text(*label_node, &label);
                true
            }
            Some(Action::Comment { title }) => {
                self.notices.push(format!("commenting on \"{title}\""));
                true
            }
            None => false,
        }
    }

    /// Notices recorded by comment interactions, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    #[serde(default = "loading_text")]
    name: String,
    #[serde(default = "loading_text")]
    bio: String,
}

fn loading_text() -> String {
    "Loading...".to_string()
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            name: loading_text(),
            bio: loading_text(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: u64,
    title: String,
    #[serde(default)]
    upvotes: u32,
}

fn construct_user_profile(
    doc: &mut Document,
    bindings: &mut Bindings,
    props: &serde_json::Map<String, Value>,
    data: &Value,
) -> NodeId {
    let profile: ProfileData = serde_json::from_value(data.clone()).unwrap_or_default();
    let user_id = props.get("userId").and_then(Value::as_str).unwrap_or("");

    let root = doc.create_element("div");
    doc.set_class(root, "user-profile");

    let heading = doc.create_element("h2");
    let name = doc.create_text(&profile.name);
    doc.append_child(heading, name);
    doc.append_child(root, heading);

    let bio = doc.create_element("p");
    let bio_text = doc.create_text(&profile.bio);
    doc.append_child(bio, bio_text);
    doc.append_child(root, bio);

    let button = doc.create_element("button");
    doc.set_class(button, "like-button");
    doc.set_attr(button, "data-user-id", user_id);
    let button_label = doc.create_text("Like \u{1F44D}");
    doc.append_child(button, button_label);
    doc.append_child(root, button);

    let count = doc.create_element("span");
    doc.set_class(count, "like-count");
    let count_text = doc.create_text("0");
    doc.append_child(count, count_text);
    doc.append_child(root, count);

    bindings.actions.insert(
        button,
        Action::Like {
            count_node: count_text,
            clicks: 0,
        },
    );

    root
}

fn construct_posts_list(
    doc: &mut Document,
    bindings: &mut Bindings,
    _props: &serde_json::Map<String, Value>,
    data: &Value,
) -> NodeId {
    let posts: Vec<PostData> = serde_json::from_value(data.clone()).unwrap_or_default();

    let root = doc.create_element("div");
    doc.set_class(root, "posts-list");

    let heading = doc.create_element("h3");
    let heading_text = doc.create_text("User posts");
    doc.append_child(heading, heading_text);
    doc.append_child(root, heading);

    let list = doc.create_element("ul");
    for post in posts {
        let item = doc.create_element("li");
        doc.set_class(item, "post-item");

        let title = doc.create_element("span");
        doc.set_class(title, "post-title");
        let title_text = doc.create_text(&post.title);
        doc.append_child(title, title_text);
        doc.append_child(item, title);

        let upvote = doc.create_element("button");
        doc.set_class(upvote, "upvote-button");
        doc.set_attr(upvote, "data-post-id", &post.id.to_string());
        let upvote_label = doc.create_text(&format!("\u{1F44D} {}", post.upvotes));
        doc.append_child(upvote, upvote_label);
        doc.append_child(item, upvote);
        bindings.actions.insert(
            upvote,
            Action::Upvote {
                label_node: upvote_label,
                count: post.upvotes,
            },
        );

        let comment = doc.create_element("button");
        doc.set_class(comment, "comment-button");
        doc.set_attr(comment, "data-post-id", &post.id.to_string());
        let comment_label = doc.create_text("\u{1F4AC} Comment");
        doc.append_child(comment, comment_label);
        doc.append_child(item, comment);
        bindings.actions.insert(
            comment,
            Action::Comment {
                title: post.title.clone(),
            },
        );

        doc.append_child(list, item);
    }
    doc.append_child(root, list);

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_name_closed_set() {
        assert_eq!(
            ComponentKind::from_name("UserProfile"),
            Some(ComponentKind::UserProfile)
        );
        assert_eq!(
            ComponentKind::from_name("PostsList"),
            Some(ComponentKind::PostsList)
        );
        assert_eq!(ComponentKind::from_name("Sidebar"), None);
        assert_eq!(ComponentKind::UserProfile.name(), "UserProfile");
    }

    #[test]
    fn test_user_profile_like_counter() {
        let mut doc = Document::new();
        let mut bindings = Bindings::new();
        let props = serde_json::Map::new();
        let data = json!({"name": "Ann", "bio": "writes Rust"});

        let root =
            ComponentKind::UserProfile.construct(&mut doc, &mut bindings, &props, &data);
        let body = doc.body();
        doc.append_child(body, root);

        assert!(doc.text_content(root).contains("Ann"));
        assert!(doc.text_content(root).contains("writes Rust"));

        // The like button is the third child; two clicks show "2".
        let button = doc.children(root)[2];
        assert!(bindings.is_bound(button));
        assert!(bindings.click(&mut doc, button));
        assert!(bindings.click(&mut doc, button));
        let count_span = doc.children(root)[3];
        assert_eq!(doc.text_content(count_span), "2");
    }

    #[test]
    fn test_user_profile_defaults_without_data() {
        let mut doc = Document::new();
        let mut bindings = Bindings::new();
        let props = serde_json::Map::new();

        let root = ComponentKind::UserProfile.construct(
            &mut doc,
            &mut bindings,
            &props,
            &Value::Null,
        );
        assert!(doc.text_content(root).contains("Loading..."));
    }

    #[test]
    fn test_posts_list_upvotes_seed_from_data() {
        let mut doc = Document::new();
        let mut bindings = Bindings::new();
        let props = serde_json::Map::new();
        let data = json!([
            {"id": 1, "title": "Streaming in depth", "upvotes": 42},
            {"id": 2, "title": "Boundary tricks"}
        ]);

        let root = ComponentKind::PostsList.construct(&mut doc, &mut bindings, &props, &data);

        let list = doc.children(root)[1];
        let first = doc.children(list)[0];
        let second = doc.children(list)[1];

        let first_upvote = doc.children(first)[1];
        assert_eq!(doc.text_content(first_upvote), "\u{1F44D} 42");
        bindings.click(&mut doc, first_upvote);
        assert_eq!(doc.text_content(first_upvote), "\u{1F44D} 43");

        // Counters are per instance: the second post stays untouched.
        let second_upvote = doc.children(second)[1];
        assert_eq!(doc.text_content(second_upvote), "\u{1F44D} 0");
    }

    #[test]
    fn test_posts_list_comment_notice() {
        let mut doc = Document::new();
        let mut bindings = Bindings::new();
        let props = serde_json::Map::new();
        let data = json!([{"id": 7, "title": "Hello"}]);

        let root = ComponentKind::PostsList.construct(&mut doc, &mut bindings, &props, &data);
        let list = doc.children(root)[1];
        let item = doc.children(list)[0];
        let comment = doc.children(item)[2];

        bindings.click(&mut doc, comment);
        assert_eq!(bindings.notices(), &["commenting on \"Hello\"".to_string()]);
    }

    #[test]
    fn test_click_on_unbound_node() {
        let mut doc = Document::new();
        let mut bindings = Bindings::new();
        let stray = doc.create_element("div");
        assert!(!bindings.click(&mut doc, stray));
    }
}
