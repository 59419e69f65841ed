//! Instruction Queue
//!
//! The process-wide queue of `(index, payload)` instructions pushed by the
//! stream. Producers may push before any consumer exists; the runtime is
//! handed a queue that can already contain entries. The queue exposes only
//! its two mutation points, enqueue and pop; nothing outside the engine can
//! iterate or clear it.
//!
//! Payloads are either opaque strings still needing a JSON decode or
//! already-structured values. The first entry of a stream is typically a
//! bare control entry with no payload at all; those are skipped during the
//! drain.

use std::collections::VecDeque;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why an instruction was dropped.
///
/// None of these are fatal; the processor logs them and keeps draining.
/// A dropped instruction is permanently lost, the server never resends.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The payload string was not parseable as JSON.
    #[error("undecodable instruction payload: {0}")]
    MalformedPayload(String),
    /// The payload decoded but is missing a required field or has a field
    /// of the wrong shape.
    #[error("invalid component instruction: {0}")]
    InvalidInstruction(String),
    /// The named component is not in the registry.
    #[error("component not registered: {0}")]
    UnknownComponent(String),
}

/// An instruction payload awaiting decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// An opaque string, JSON-decoded at dispatch time.
    Raw(String),
    /// An already-structured value.
    Parsed(Value),
}

/// One queued `(index, payload)` unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    /// Sequence index assigned by the producer.
    pub index: u64,
    /// The payload, or nothing for control entries.
    pub payload: Option<Payload>,
}

impl QueueEntry {
    /// A control entry with no payload, like the `[0]` a stream opens with.
    #[must_use]
    pub fn control(index: u64) -> Self {
        Self {
            index,
            payload: None,
        }
    }

    /// An entry carrying an undecoded string payload.
    pub fn raw(index: u64, payload: impl Into<String>) -> Self {
        Self {
            index,
            payload: Some(Payload::Raw(payload.into())),
        }
    }

    /// An entry carrying an already-structured payload.
    #[must_use]
    pub fn parsed(index: u64, payload: Value) -> Self {
        Self {
            index,
            payload: Some(Payload::Parsed(payload)),
        }
    }
}

/// A decoded component instruction.
///
/// The schema on the wire is `{id, component, props, data}`. `props`
/// defaults to an empty map and `data` to null when absent.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Instruction {
    /// The boundary this instruction resolves.
    pub id: String,
    /// Registry name of the component to construct.
    pub component: String,
    /// Construction properties.
    #[serde(default)]
    pub props: serde_json::Map<String, Value>,
    /// Structured data handed to the constructor.
    #[serde(default)]
    pub data: Value,
}

/// Decode a payload into a component instruction.
///
/// Returns `Ok(None)` for payloads that decode fine but do not describe a
/// component; unknown instruction kinds must not crash the processor.
///
/// # Errors
///
/// [`ProcessError::MalformedPayload`] when a string payload is not JSON,
/// [`ProcessError::InvalidInstruction`] when a component instruction is
/// missing `id` or `component`.
pub fn decode(payload: &Payload) -> Result<Option<Instruction>, ProcessError> {
    let value = match payload {
        Payload::Raw(text) => serde_json::from_str::<Value>(text)
            .map_err(|e| ProcessError::MalformedPayload(e.to_string()))?,
        Payload::Parsed(value) => value.clone(),
    };

    let Some(object) = value.as_object() else {
        return Ok(None);
    };
    if !object.contains_key("component") {
        return Ok(None);
    }

    serde_json::from_value::<Instruction>(value)
        .map(Some)
        .map_err(|e| ProcessError::InvalidInstruction(e.to_string()))
}

/// The process-wide instruction queue.
///
/// Owned exclusively by the runtime once one exists; until then, producers
/// can push into a standalone queue and hand it over.
#[derive(Debug, Default)]
pub struct InstructionQueue {
    entries: VecDeque<QueueEntry>,
}

impl InstructionQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn enqueue(&mut self, entry: QueueEntry) {
        self.entries.push_back(entry);
    }

    /// Remove and return the oldest entry. Engine-internal: emptiness is a
    /// dynamic condition re-checked after every removal.
    pub(crate) fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
