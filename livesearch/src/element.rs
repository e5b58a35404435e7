use crate::errors::HostError;
use crate::events::{InputEvent, SyntheticKeyEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::instrument;

/// Represents an element in the host document
#[derive(Debug)]
pub struct HostElement {
    inner: Box<dyn HostElementImpl>,
}

/// Helper functions for clean serialization
fn is_empty_string(opt: &Option<String>) -> bool {
    match opt {
        Some(s) => s.is_empty(),
        None => true,
    }
}

fn is_empty_properties(props: &HashMap<String, Option<serde_json::Value>>) -> bool {
    props.is_empty() || props.values().all(|v| v.is_none())
}

/// Attributes associated with a host element
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElementAttributes {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_properties")]
    pub properties: HashMap<String, Option<serde_json::Value>>,
}

/// Interface for host-specific element implementations
pub trait HostElementImpl: Send + Sync + Debug {
    fn object_id(&self) -> usize;
    fn id(&self) -> Option<String>;
    fn role(&self) -> String;
    fn attributes(&self) -> ElementAttributes;
    fn label(&self) -> Option<String> {
        self.attributes().label
    }
    fn value(&self) -> Result<String, HostError>;
    fn set_value(&self, value: &str) -> Result<(), HostError>;
    fn type_text(&self, text: &str) -> Result<(), HostError>;
    fn subscribe_input(&self) -> broadcast::Receiver<InputEvent>;
    fn dispatch_key(&self, event: &SyntheticKeyEvent) -> Result<(), HostError>;

    // Add a method to clone the box
    fn clone_box(&self) -> Box<dyn HostElementImpl>;
}

impl HostElement {
    /// Create a new host element from a host-specific implementation
    pub fn new(impl_: Box<dyn HostElementImpl>) -> Self {
        Self { inner: impl_ }
    }

    /// Get the element's ID
    pub fn id(&self) -> Option<String> {
        self.inner.id()
    }

    /// Get the element's role (e.g., "textbox")
    pub fn role(&self) -> String {
        self.inner.role()
    }

    /// Get the element's accessibility label
    pub fn label(&self) -> Option<String> {
        self.inner.label()
    }

    /// Get all attributes of the element
    pub fn attributes(&self) -> ElementAttributes {
        self.inner.attributes()
    }

    /// Get the element's current value
    pub fn value(&self) -> Result<String, HostError> {
        self.inner.value()
    }

    /// Set the element's value, firing a single input-change event
    pub fn set_value(&self, value: &str) -> Result<(), HostError> {
        self.inner.set_value(value)
    }

    /// Type text into the element, firing one input-change event per character
    pub fn type_text(&self, text: &str) -> Result<(), HostError> {
        self.inner.type_text(text)
    }

    /// Subscribe to the element's input-change events
    pub fn subscribe_input(&self) -> broadcast::Receiver<InputEvent> {
        self.inner.subscribe_input()
    }

    /// Dispatch a synthetic keyboard event on this element
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch_key(&self, event: &SyntheticKeyEvent) -> Result<(), HostError> {
        self.inner.dispatch_key(event)
    }

    /// Get a stream of input-change events
    pub fn input_stream(&self) -> impl Stream<Item = InputEvent> {
        let mut rx = self.subscribe_input();
        Box::pin(async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Log but continue - don't terminate stream on lag
                        tracing::warn!("Input stream lagged, skipped {} events", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // Channel closed, end stream
                        break;
                    }
                }
            }
        })
    }
}

impl PartialEq for HostElement {
    fn eq(&self, other: &Self) -> bool {
        self.inner.object_id() == other.inner.object_id()
    }
}

impl Eq for HostElement {}

impl std::hash::Hash for HostElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.object_id().hash(state);
    }
}

impl Clone for HostElement {
    fn clone(&self) -> Self {
        // We can't clone the inner Box<dyn HostElementImpl> directly, but a
        // new handle with the same identity behaves the same way
        Self {
            inner: self.inner.clone_box(),
        }
    }
}
