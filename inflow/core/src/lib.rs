//! Inflow Core - Headless Boundary-Replacement Engine
//!
//! This crate implements the protocol that lets a server stream a document
//! in chunks while a client progressively fills in placeholder regions,
//! without a reload. It is completely independent of any HTTP framework or
//! real page: the document is an abstract ordered tree, and everything here
//! can run headless for testing and automation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Stream Emitter (server)                  │
//! │   shell chunk          completion chunks                     │
//! │   placeholders ──────► staging content + patch directives    │
//! │                        queue pushes (index, json)            │
//! └───────────────────────────────┬──────────────────────────────┘
//! │                               │  raw chunk bytes
//! ┌───────────────────────────────▼──────────────────────────────┐
//! │                        CLIENT RUNTIME                        │
//! │  ┌───────────────┐   ┌────────────┐   ┌───────────────────┐  │
//! │  │  Instruction  │──►│  Component │──►│  Boundary Patcher │  │
//! │  │    Queue      │   │  Registry  │   │  (tree surgery)   │  │
//! │  └───────────────┘   └────────────┘   └─────────┬─────────┘  │
//! │          ▲                                      │            │
//! │          │ deferred tasks                       ▼            │
//! │  ┌───────┴───────┐                     ┌─────────────────┐   │
//! │  │   Scheduler   │                     │  Document Tree  │   │
//! │  └───────────────┘                     └─────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Document`]: the ordered tree of elements, text, and sentinel markers
//! - [`patch`](patch()): the boundary patcher, tree surgery with
//!   marker-balance accounting
//! - [`ClientRuntime`]: the instruction queue processor
//! - [`ComponentKind`]: the closed registry of constructible components
//! - [`Directive`]: the machine-readable form of streamed inline scripts
//!
//! # Module Overview
//!
//! - [`tree`]: arena document tree and traversal
//! - [`marker`]: the sentinel vocabulary and placeholder construction
//! - [`patch`]: boundary replacement
//! - [`registry`]: component constructors and interaction bindings
//! - [`queue`]: instruction queue and payload decode
//! - [`schedule`]: the cooperative deferred-task queue
//! - [`runtime`]: the client runtime tying the above together
//! - [`wire`]: the chunked response formats of both stream variants
//!
//! # No I/O Dependencies
//!
//! The client side of the protocol is single-threaded and cooperative, so
//! this crate carries no async runtime and no HTTP stack; those live in the
//! server crate.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod marker;
pub mod patch;
pub mod queue;
pub mod registry;
pub mod runtime;
pub mod schedule;
pub mod tree;
pub mod wire;

// Re-exports for convenience
pub use marker::{
    install_placeholder, staging_container_id, BoundaryId, BoundaryState, MarkerKind, CLOSE_CODE,
};
pub use patch::{patch, PatchOutcome};
pub use queue::{decode, Instruction, InstructionQueue, Payload, ProcessError, QueueEntry};
pub use registry::{Bindings, ComponentKind};
pub use runtime::ClientRuntime;
pub use schedule::{Scheduler, Task};
pub use tree::{Document, NodeId, NodeKind};
pub use wire::Directive;
