//! Client Runtime
//!
//! The instruction queue processor. Owns the document, the process-wide
//! instruction queue, the resolved-set, the interaction bindings, and the
//! deferred-task scheduler; everything on the client side of the protocol
//! flows through here.
//!
//! # Ordering guarantees
//!
//! - every enqueued instruction is dispatched exactly once, in enqueue
//!   order;
//! - a boundary is patched at most once even if several instructions
//!   reference it: the resolved-set is consulted and updated synchronously
//!   at the moment of committing to a patch, before the patch itself runs;
//! - patches triggered by dispatch are deferred one scheduling turn, so the
//!   staging-container insertion that precedes them is complete in the tree
//!   by the time the patcher looks the container up.
//!
//! Draining treats "queue empty" as a dynamic condition re-checked after
//! every removal, so entries pushed during the drain itself are not lost.
//! After the initial drain the runtime is hooked: every later enqueue
//! defers another drain instead of running one on the producer's stack.

use std::collections::HashSet;

use tracing::{debug, error, trace};

use crate::marker::{staging_container_id, BoundaryId};
use crate::patch::{patch, PatchOutcome};
use crate::queue::{decode, InstructionQueue, Instruction, ProcessError, QueueEntry};
use crate::registry::{Bindings, ComponentKind};
use crate::schedule::{Scheduler, Task};
use crate::tree::{Document, NodeId};
use crate::wire::Directive;

/// The client-side engine driving a [`Document`] from streamed directives
/// and queued instructions.
#[derive(Debug, Default)]
pub struct ClientRuntime {
    doc: Document,
    queue: InstructionQueue,
    scheduler: Scheduler,
    bindings: Bindings,
    resolved: HashSet<BoundaryId>,
    hooked: bool,
}

impl ClientRuntime {
    /// Create a runtime over an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime over an already-built document, e.g. one holding
    /// the initial shell with its pending placeholders.
    #[must_use]
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc,
            ..Self::default()
        }
    }

    /// Create a runtime over a document and a queue that producers already
    /// pushed into before the processor existed.
    #[must_use]
    pub fn attach(doc: Document, queue: InstructionQueue) -> Self {
        Self {
            doc,
            queue,
            ..Self::default()
        }
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The document, mutably. Shell construction goes through this.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// The interaction bindings of constructed components.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Deliver a click to a node of the document.
    pub fn click(&mut self, node: NodeId) -> bool {
        self.bindings.click(&mut self.doc, node)
    }

    /// Whether a boundary has been committed to patch.
    #[must_use]
    pub fn is_resolved(&self, boundary: &BoundaryId) -> bool {
        self.resolved.contains(boundary)
    }

    /// Append an entry to the instruction queue. Once the runtime is
    /// hooked, each push also defers a drain; it never drains on the
    /// caller's stack.
    pub fn enqueue(&mut self, entry: QueueEntry) {
        trace!(index = entry.index, "instruction enqueued");
        self.queue.enqueue(entry);
        if self.hooked {
            self.scheduler.defer(Task::Drain);
        }
    }

    /// Drain the instruction queue, dispatching each entry in order.
    /// Entries pushed while the drain runs are picked up by the same drain.
    pub fn drain(&mut self) {
        while let Some(entry) = self.queue.pop() {
            self.dispatch(entry);
        }
        if !self.hooked {
            debug!("initial drain complete, observation hook installed");
            self.hooked = true;
        }
    }

    /// Pump deferred tasks until the scheduler is idle.
    pub fn run_until_idle(&mut self) {
        while let Some(task) = self.scheduler.take_next() {
            match task {
                Task::Drain => self.drain(),
                Task::Patch {
                    boundary,
                    container,
                    error,
                } => {
                    let outcome = patch(&mut self.doc, &boundary, &container, error.as_deref());
                    debug!(boundary = %boundary, ?outcome, "deferred patch ran");
                }
            }
        }
    }

    /// Apply a stream directive: an inline patch call runs immediately, a
    /// queue push enqueues.
    pub fn apply(&mut self, directive: Directive) -> Option<PatchOutcome> {
        match directive {
            Directive::Patch {
                boundary,
                container,
                error,
            } => Some(patch(&mut self.doc, &boundary, &container, error.as_deref())),
            Directive::Push { index, payload } => {
                let entry = match payload {
                    Some(json) => QueueEntry::raw(index, json),
                    None => QueueEntry::control(index),
                };
                self.enqueue(entry);
                None
            }
        }
    }

    fn dispatch(&mut self, entry: QueueEntry) {
        let Some(payload) = entry.payload else {
            trace!(index = entry.index, "control entry, skipping");
            return;
        };
        match decode(&payload) {
            Ok(Some(instruction)) => self.handle_component(instruction),
            Ok(None) => {
                trace!(index = entry.index, "unrecognized instruction shape, dropped");
            }
            Err(e) => {
                error!(index = entry.index, error = %e, "instruction dropped");
            }
        }
    }

    fn handle_component(&mut self, instruction: Instruction) {
        let boundary = BoundaryId::new(instruction.id.clone());
        if self.resolved.contains(&boundary) {
            debug!(boundary = %boundary, "boundary already resolved, instruction dropped");
            return;
        }
        let Some(kind) = ComponentKind::from_name(&instruction.component) else {
            let e = ProcessError::UnknownComponent(instruction.component);
            error!(boundary = %boundary, error = %e, "instruction dropped");
            return;
        };

        let content = kind.construct(
            &mut self.doc,
            &mut self.bindings,
            &instruction.props,
            &instruction.data,
        );

        let container_id = staging_container_id(&boundary);
        let container = self.doc.create_element("div");
        self.doc.set_id(container, &container_id);
        self.doc.set_hidden(container, true);
        self.doc.append_child(container, content);
        let body = self.doc.body();
        self.doc.append_child(body, container);

        self.scheduler.defer(Task::Patch {
            boundary: boundary.clone(),
            container: container_id,
            error: None,
        });
        // Committed: recorded at schedule time so a second instruction for
        // the same id cannot pass the check before this patch runs.
        self.resolved.insert(boundary);
    }
}
