use tracing::{debug, instrument};

use crate::element::HostElement;
use crate::errors::HostError;
use crate::host::DocumentAccessor;
use crate::selector::Selector;
use std::sync::Arc;
use std::time::Duration;

// Default timeout if none is specified on the locator itself
const DEFAULT_LOCATOR_TIMEOUT: Duration = Duration::from_secs(30);

// Poll cadence for waiting operations
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A high-level API for finding elements in the host document
///
/// For maximum precision, prefer the role|label format (e.g.,
/// "role:textbox|label:Search") over broad selectors like "role:textbox"
/// that could match multiple elements.
#[derive(Clone)]
pub struct Locator {
    accessor: Arc<dyn DocumentAccessor>,
    selector: Selector,
    timeout: Duration, // Default timeout for this locator instance
}

impl Locator {
    /// Create a new locator with the given selector
    pub(crate) fn new(accessor: Arc<dyn DocumentAccessor>, selector: Selector) -> Self {
        Self {
            accessor,
            selector,
            timeout: DEFAULT_LOCATOR_TIMEOUT, // Use default
        }
    }

    /// Set a default timeout for waiting operations on this locator instance.
    /// This timeout is used if no specific timeout is passed to `wait`.
    pub fn set_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Find the first matching element with a single immediate lookup
    pub fn try_first(&self) -> Result<HostElement, HostError> {
        self.accessor.find_element(&self.selector)
    }

    /// Get all elements matching this locator with a single immediate lookup
    pub fn all(&self) -> Result<Vec<HostElement>, HostError> {
        self.accessor.find_elements(&self.selector)
    }

    /// Wait for an element matching the locator to appear, up to the specified timeout.
    /// If no timeout is provided, uses the locator's default timeout.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<HostElement, HostError> {
        debug!("Waiting for element matching selector: {:?}", self.selector);
        let effective_timeout = timeout.unwrap_or(self.timeout);
        let selector_string = self.selector_string();
        let deadline = tokio::time::Instant::now() + effective_timeout;

        loop {
            match self.accessor.find_element(&self.selector) {
                Ok(element) => return Ok(element),
                Err(HostError::ElementNotFound(inner_msg)) => {
                    // The accessor returns ElementNotFound while the element is
                    // absent. At expiry we convert it to a more specific Timeout
                    // error here.
                    if tokio::time::Instant::now() >= deadline {
                        return Err(HostError::Timeout(format!(
                            "Timed out after {effective_timeout:?} waiting for element {selector_string:?}. Original error: {inner_msg}"
                        )));
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                // Denials and invalid selectors do not resolve with time
                Err(e) => return Err(e),
            }
        }
    }

    pub fn selector_string(&self) -> String {
        format!("{:?}", self.selector)
    }
}
