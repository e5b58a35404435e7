use crate::element::HostElement;
use crate::errors::HostError;
use crate::locator::Locator;
use crate::selector::Selector;
use std::sync::Arc;
use tracing::instrument;

pub mod memory;

/// The common trait that all host-specific document accessors must implement.
///
/// The accessor is the only way this crate reaches the embedding host's
/// document. Embedders inject a real accessor; tests inject
/// [`memory::MemoryDocument`](crate::host::memory::MemoryDocument).
pub trait DocumentAccessor: Send + Sync {
    /// Find the first element matching a selector
    fn find_element(&self, selector: &Selector) -> Result<HostElement, HostError>;

    /// Find all elements matching a selector
    fn find_elements(&self, selector: &Selector) -> Result<Vec<HostElement>, HostError>;
}

/// The main entry point to an embedding host's document
pub struct HostDocument {
    accessor: Arc<dyn DocumentAccessor>,
}

impl HostDocument {
    pub fn new(accessor: Arc<dyn DocumentAccessor>) -> Self {
        Self { accessor }
    }

    #[instrument(skip(self, selector))]
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        let selector = selector.into();
        Locator::new(self.accessor.clone(), selector)
    }

    /// Find the first matching element with a single immediate lookup
    #[instrument(skip(self))]
    pub fn find_element(&self, selector: &Selector) -> Result<HostElement, HostError> {
        self.accessor.find_element(selector)
    }

    /// Find all matching elements with a single immediate lookup
    #[instrument(skip(self))]
    pub fn find_elements(&self, selector: &Selector) -> Result<Vec<HostElement>, HostError> {
        self.accessor.find_elements(selector)
    }
}

impl Clone for HostDocument {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
        }
    }
}
