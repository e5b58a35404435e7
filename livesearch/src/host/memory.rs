use crate::element::{ElementAttributes, HostElement, HostElementImpl};
use crate::errors::HostError;
use crate::events::{InputEvent, SyntheticKeyEvent};
use crate::host::{DocumentAccessor, HostDocument};
use crate::selector::Selector;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::broadcast;

// Buffer size for per-element input channels
const INPUT_CHANNEL_CAPACITY: usize = 64;

/// A synthetic event dispatch, stamped with the runtime clock so timing
/// assertions stay exact under a paused test clock
#[derive(Debug, Clone)]
pub struct DispatchRecord {
    pub event: SyntheticKeyEvent,
    pub at: tokio::time::Instant,
}

#[derive(Debug)]
struct ElementState {
    id: Option<String>,
    role: String,
    label: Option<String>,
    value: Mutex<String>,
    input_tx: broadcast::Sender<InputEvent>,
    dispatched: Mutex<Vec<DispatchRecord>>,
    document: Weak<DocumentState>,
    detached: AtomicBool,
}

#[derive(Debug)]
struct DocumentState {
    elements: Mutex<Vec<Arc<ElementState>>>,
    bubbled: Mutex<Vec<DispatchRecord>>,
    deny_access: AtomicBool,
}

/// An in-process host document with fully deterministic behavior.
///
/// This is the substitutable stand-in for a real embedding host: elements are
/// registered by accessibility label, input events fan out over a broadcast
/// channel, and every synthetic dispatch is recorded so a test can assert
/// exactly what an ancestor listener would have observed.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    state: Arc<DocumentState>,
}

fn element_handle(state: Arc<ElementState>) -> HostElement {
    HostElement::new(Box::new(MemoryElement { state }))
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            state: Arc::new(DocumentState {
                elements: Mutex::new(Vec::new()),
                bubbled: Mutex::new(Vec::new()),
                deny_access: AtomicBool::new(false),
            }),
        }
    }

    /// Wrap this document in the generic entry point
    pub fn document(&self) -> HostDocument {
        HostDocument::new(Arc::new(self.clone()))
    }

    /// Register a text input with the given accessibility label
    pub fn add_input(&self, label: &str) -> HostElement {
        self.insert_element(None, "textbox", Some(label))
    }

    /// Register a text input with an explicit id and accessibility label
    pub fn add_input_with_id(&self, id: &str, label: &str) -> HostElement {
        self.insert_element(Some(id), "textbox", Some(label))
    }

    /// Remove the input with the given label, as a host re-render tearing the
    /// node down would. Outstanding handles turn stale and report `Detached`.
    /// Returns true when an element was removed.
    pub fn remove_input(&self, label: &str) -> bool {
        if let Ok(mut elements) = self.state.elements.lock() {
            let before = elements.len();
            elements.retain(|element| {
                let matches = element.label.as_deref() == Some(label);
                if matches {
                    element.detached.store(true, Ordering::SeqCst);
                }
                !matches
            });
            before != elements.len()
        } else {
            false
        }
    }

    /// Deny or restore document access, as a cross-origin frame boundary would
    pub fn set_deny_access(&self, deny: bool) {
        self.state.deny_access.store(deny, Ordering::SeqCst);
    }

    /// Synthetic events that bubbled up to the document level
    pub fn bubbled_events(&self) -> Vec<DispatchRecord> {
        self.state
            .bubbled
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Synthetic events dispatched on the element with the given label
    pub fn dispatched_on(&self, label: &str) -> Vec<DispatchRecord> {
        self.with_element(label, |element| {
            element
                .dispatched
                .lock()
                .map(|events| events.clone())
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }

    /// Number of live input subscriptions on the element with the given label
    pub fn input_subscriber_count(&self, label: &str) -> usize {
        self.with_element(label, |element| element.input_tx.receiver_count())
            .unwrap_or(0)
    }

    fn insert_element(&self, id: Option<&str>, role: &str, label: Option<&str>) -> HostElement {
        let (input_tx, _) = broadcast::channel(INPUT_CHANNEL_CAPACITY);
        let element = Arc::new(ElementState {
            id: id.map(str::to_string),
            role: role.to_string(),
            label: label.map(str::to_string),
            value: Mutex::new(String::new()),
            input_tx,
            dispatched: Mutex::new(Vec::new()),
            document: Arc::downgrade(&self.state),
            detached: AtomicBool::new(false),
        });

        if let Ok(mut elements) = self.state.elements.lock() {
            elements.push(element.clone());
        }

        element_handle(element)
    }

    fn with_element<T>(&self, label: &str, f: impl FnOnce(&ElementState) -> T) -> Option<T> {
        self.state.elements.lock().ok().and_then(|elements| {
            elements
                .iter()
                .find(|element| element.label.as_deref() == Some(label))
                .map(|element| f(element))
        })
    }

    fn ensure_allowed(&self) -> Result<(), HostError> {
        if self.state.deny_access.load(Ordering::SeqCst) {
            return Err(HostError::AccessDenied(
                "the embedding frame blocks cross-origin document access".to_string(),
            ));
        }
        Ok(())
    }

    fn matching(&self, selector: &Selector) -> Result<Vec<HostElement>, HostError> {
        let matches = match selector {
            Selector::Label(label) => {
                self.collect(|element| element.label.as_deref() == Some(label.as_str()))
            }
            Selector::Id(id) => self.collect(|element| element.id.as_deref() == Some(id.as_str())),
            Selector::Role { role, name } => self.collect(|element| {
                element.role == *role
                    && name
                        .as_ref()
                        .map_or(true, |n| element.label.as_deref() == Some(n.as_str()))
            }),
            Selector::Invalid(reason) => {
                return Err(HostError::InvalidSelector(reason.clone()));
            }
        };
        Ok(matches)
    }

    fn collect(&self, keep: impl Fn(&ElementState) -> bool) -> Vec<HostElement> {
        self.state
            .elements
            .lock()
            .map(|elements| {
                elements
                    .iter()
                    .filter(|element| keep(element))
                    .cloned()
                    .map(element_handle)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAccessor for MemoryDocument {
    fn find_element(&self, selector: &Selector) -> Result<HostElement, HostError> {
        self.ensure_allowed()?;
        self.matching(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| HostError::ElementNotFound(format!("no element matches {selector:?}")))
    }

    fn find_elements(&self, selector: &Selector) -> Result<Vec<HostElement>, HostError> {
        self.ensure_allowed()?;
        self.matching(selector)
    }
}

/// Element handle backed by a [`MemoryDocument`]
#[derive(Debug, Clone)]
struct MemoryElement {
    state: Arc<ElementState>,
}

impl MemoryElement {
    fn current_value(&self) -> String {
        self.state
            .value
            .lock()
            .map(|value| value.clone())
            .unwrap_or_default()
    }

    fn ensure_attached(&self) -> Result<(), HostError> {
        if self.state.detached.load(Ordering::SeqCst) {
            return Err(HostError::Detached(format!(
                "element {:?} was removed from the document",
                self.state.label.as_deref().unwrap_or("")
            )));
        }
        Ok(())
    }

    fn notify_input(&self) {
        // Send only fails when nobody is subscribed, which is fine
        let _ = self
            .state
            .input_tx
            .send(InputEvent::now(self.current_value()));
    }
}

impl HostElementImpl for MemoryElement {
    fn object_id(&self) -> usize {
        Arc::as_ptr(&self.state) as usize
    }

    fn id(&self) -> Option<String> {
        self.state.id.clone()
    }

    fn role(&self) -> String {
        self.state.role.clone()
    }

    fn attributes(&self) -> ElementAttributes {
        let mut properties = HashMap::new();
        if let Some(label) = &self.state.label {
            properties.insert(
                "aria-label".to_string(),
                Some(serde_json::Value::String(label.clone())),
            );
        }

        ElementAttributes {
            role: self.state.role.clone(),
            label: self.state.label.clone(),
            value: Some(self.current_value()),
            properties,
        }
    }

    fn value(&self) -> Result<String, HostError> {
        self.ensure_attached()?;
        Ok(self.current_value())
    }

    fn set_value(&self, value: &str) -> Result<(), HostError> {
        self.ensure_attached()?;
        if let Ok(mut current) = self.state.value.lock() {
            value.clone_into(&mut current);
        }
        self.notify_input();
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), HostError> {
        self.ensure_attached()?;
        for ch in text.chars() {
            if let Ok(mut current) = self.state.value.lock() {
                current.push(ch);
            }
            self.notify_input();
        }
        Ok(())
    }

    fn subscribe_input(&self) -> broadcast::Receiver<InputEvent> {
        self.state.input_tx.subscribe()
    }

    fn dispatch_key(&self, event: &SyntheticKeyEvent) -> Result<(), HostError> {
        self.ensure_attached()?;
        let record = DispatchRecord {
            event: event.clone(),
            at: tokio::time::Instant::now(),
        };

        if let Ok(mut dispatched) = self.state.dispatched.lock() {
            dispatched.push(record.clone());
        }

        // Bubbling events propagate to the document level, where the host
        // application's own listeners live
        if event.bubbles {
            if let Some(document) = self.state.document.upgrade() {
                if let Ok(mut bubbled) = document.bubbled.lock() {
                    bubbled.push(record);
                }
            }
        }

        Ok(())
    }

    fn clone_box(&self) -> Box<dyn HostElementImpl> {
        Box::new(self.clone())
    }
}
