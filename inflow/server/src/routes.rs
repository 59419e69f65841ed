//! Route Surface
//!
//! The stream-emission simulator: four routes over the protocol engine.
//! Each streaming endpoint responds with `text/html`, writes its chunks in
//! order with simulated delays between them, and closes the stream after
//! the final chunk. The delays model asynchronous data availability, not
//! real I/O latency; tests run with them at zero.
//!
//! The route layer decides *when* to emit and *what data* to synthesize.
//! Everything about the bytes themselves comes from `inflow_core::wire`.

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info};

use inflow_core::wire::{self, Directive};
use inflow_core::BoundaryId;

use crate::pages;

/// Timing knobs for the simulated streams.
#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Pause before each content chunk after the shell.
    pub chunk_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_delay: Duration::from_millis(3000),
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct ServerState {
    /// Stream timing.
    pub stream: StreamConfig,
    /// Location of the tutorial document served at `/guide`.
    pub guide_path: PathBuf,
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/blog", get(blog))
        .route("/feed", get(feed))
        .route("/guide", get(guide))
        .with_state(state)
}

async fn landing() -> Html<String> {
    Html(pages::landing())
}

async fn blog(State(state): State<ServerState>) -> Response {
    info!("streaming bare-variant response");
    stream_chunks(blog_chunks(state.stream.chunk_delay))
}

async fn feed(State(state): State<ServerState>) -> Response {
    info!("streaming instruction-queue response");
    stream_chunks(feed_chunks(state.stream.chunk_delay))
}

async fn guide(State(state): State<ServerState>) -> Result<Html<String>, (StatusCode, String)> {
    match pages::render_guide(&state.guide_path) {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            error!(error = %e, "tutorial rendering failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to render tutorial: {e:#}"),
            ))
        }
    }
}

/// Turn an ordered chunk plan into a streaming `text/html` response. A
/// writer task sleeps out each chunk's delay and sends it; dropping the
/// receiver (client gone) stops the writer early.
fn stream_chunks(chunks: Vec<(Duration, String)>) -> Response {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(4);
    tokio::spawn(async move {
        for (delay, chunk) in chunks {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if tx.send(Ok(Bytes::from(chunk))).await.is_err() {
                debug!("client disconnected, abandoning stream");
                return;
            }
        }
        debug!("stream complete");
    });

    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

/// The bare-variant chunk plan: shell with a pending boundary and the
/// inline patcher; article content carrying a nested pending boundary plus
/// its patch call; then the comments and theirs.
fn blog_chunks(delay: Duration) -> Vec<(Duration, String)> {
    let outer = BoundaryId::from("B:0");
    let inner = BoundaryId::from("B:1");

    let shell = format!(
        "{}\
         <div class=\"explanation\">\n\
         <h3>Bare patch streaming</h3>\n\
         <p>Finished markup arrives in hidden containers and an inline patch \
         call splices each one between its boundary sentinels. No queue, no \
         component data, no interactivity.</p>\n\
         </div>\n\
         {}\n{}\n",
        pages::stream_page_open("Bare patch streaming demo", ""),
        wire::placeholder(&outer, "Loading the article..."),
        wire::inline_patcher(),
    );

    let article = format!(
        "<div class=\"content\">\n\
         <h2>The first layer</h2>\n\
         <p>This part of the page took one simulated round trip to produce. \
         In a real application it would be the result of a database query or \
         an upstream API call.</p>\n\
         {}\n\
         </div>",
        wire::placeholder(&inner, "Loading comments...")
    );
    let first = format!(
        "{}\n{}\n",
        wire::staging("S:0", &article),
        Directive::Patch {
            boundary: outer,
            container: "S:0".to_string(),
            error: None,
        }
        .to_script()
    );

    let comments = "<div class=\"content\">\n\
         <h3>Comments</h3>\n\
         <ul>\n\
         <li>Great walkthrough of the sentinel protocol.</li>\n\
         <li>The nesting counter finally makes sense to me.</li>\n\
         </ul>\n\
         </div>";
    let second = format!(
        "{}\n{}\n\
         <div class=\"explanation\">\n\
         <h3>What just happened</h3>\n\
         <p>Each hidden container was detached, its content moved between the \
         matching sentinel pair, and the opening sentinel flipped to resolved. \
         The nested comments boundary rode in with the first replacement.</p>\n\
         </div>\n{}",
        wire::staging("S:1", comments),
        Directive::Patch {
            boundary: inner,
            container: "S:1".to_string(),
            error: None,
        }
        .to_script(),
        pages::stream_page_close()
    );

    vec![
        (Duration::ZERO, shell),
        (delay, first),
        (delay, second),
    ]
}

/// The instruction-queue chunk plan: shell declaring the queue and two
/// pending boundaries; then one component instruction per chunk.
fn feed_chunks(delay: Duration) -> Vec<(Duration, String)> {
    let profile = BoundaryId::from("profile-boundary");
    let posts = BoundaryId::from("posts-boundary");

    let shell = format!(
        "{}\
         <div class=\"explanation\">\n\
         <h3>Instruction queue streaming</h3>\n\
         <p>Later chunks push structured instructions into the page's queue. \
         The processor decodes each one, constructs the named component with \
         its data, and patches the boundary it resolves, exactly once.</p>\n\
         </div>\n\
         <div class=\"content\">\n\
         <h2>Profile and posts</h2>\n\
         {}\n{}\n\
         </div>\n",
        pages::stream_page_open("Instruction queue streaming demo", &wire::queue_bootstrap()),
        wire::placeholder(&profile, "Loading the profile..."),
        wire::placeholder(&posts, "Loading the post list..."),
    );

    let profile_push = Directive::Push {
        index: 1,
        payload: Some(wire::instruction_json(
            &profile,
            "UserProfile",
            json!({"userId": "user123"}),
            json!({
                "name": "Mara Voss",
                "bio": "Backend engineer writing about streamed rendering and protocol design."
            }),
        )),
    }
    .to_script();

    let posts_push = format!(
        "{}\n\
         <div class=\"explanation\">\n\
         <h3>What just happened</h3>\n\
         <p>Both instructions travelled as data, not markup. The constructed \
         components carry their own interaction state; try the like and \
         upvote buttons.</p>\n\
         </div>\n{}",
        Directive::Push {
            index: 2,
            payload: Some(wire::instruction_json(
                &posts,
                "PostsList",
                json!({"userId": "user123"}),
                json!([
                    {"id": 1, "title": "Server components from first principles", "upvotes": 42},
                    {"id": 2, "title": "Chunked transfer, explained with sentinels", "upvotes": 18},
                    {"id": 3, "title": "Why the resolved-set is checked at schedule time", "upvotes": 27}
                ]),
            )),
        }
        .to_script(),
        pages::stream_page_close()
    );

    vec![
        (Duration::ZERO, shell),
        (delay, format!("{profile_push}\n")),
        (delay, posts_push),
    ]
}
