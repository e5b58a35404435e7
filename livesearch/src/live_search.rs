use crate::element::HostElement;
use crate::errors::HostError;
use crate::events::{InputEvent, SyntheticKeyEvent};
use crate::host::HostDocument;
use crate::selector::Selector;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tracing::{debug, info, instrument, warn};

/// Quiet period after the last keystroke before the Enter simulation fires
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Accessibility label the search input is looked up by
pub const DEFAULT_SEARCH_LABEL: &str = "Search";

/// Configuration for the live-search component
#[derive(Debug, Clone)]
pub struct LiveSearchConfig {
    /// How the search input is located in the host document
    pub selector: Selector,

    /// Quiet period after the last input event before Enter is simulated
    pub debounce: Duration,

    /// How long `attach` may wait for the search input to appear. `None`
    /// looks the element up exactly once, for hosts that render it up front.
    pub wait_for_target: Option<Duration>,
}

impl Default for LiveSearchConfig {
    fn default() -> Self {
        Self {
            selector: Selector::Label(DEFAULT_SEARCH_LABEL.to_string()),
            debounce: DEFAULT_DEBOUNCE,
            wait_for_target: None,
        }
    }
}

/// The observable result of an [`attach`](LiveSearch::attach) call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The component subscribed to the search input and the debounce worker runs
    Attached,
    /// A previous attach already subscribed; nothing was registered again
    AlreadyAttached,
    /// The host document has no matching search input; nothing was registered
    TargetMissing,
}

/// Debounces keystrokes in an embedded search input and simulates an Enter
/// keypress after each quiet period, so the embedding host re-queries.
///
/// The component holds all of its own state: the target element reference,
/// the worker handle, and the attached flag. Attaching twice is an observable
/// no-op, and at most one Enter simulation is ever pending.
pub struct LiveSearch {
    document: HostDocument,
    config: LiveSearchConfig,
    target: Option<HostElement>,
    worker: Option<JoinHandle<()>>,
    attached: bool,
}

impl LiveSearch {
    /// Create a component with the default configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use livesearch::{LiveSearch, MemoryDocument};
    ///
    /// # async fn run() -> Result<(), livesearch::HostError> {
    /// let host = MemoryDocument::new();
    /// host.add_input("Search");
    ///
    /// let mut live = LiveSearch::new(host.document());
    /// live.attach().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(document: HostDocument) -> Self {
        Self::with_config(document, LiveSearchConfig::default())
    }

    /// Create a component with an explicit configuration
    pub fn with_config(document: HostDocument, config: LiveSearchConfig) -> Self {
        Self {
            document,
            config,
            target: None,
            worker: None,
            attached: false,
        }
    }

    /// Whether the component currently observes a search input
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The element the component attached to, if any
    pub fn target(&self) -> Option<&HostElement> {
        self.target.as_ref()
    }

    /// Attach to the search input and start debouncing its keystrokes.
    ///
    /// Looks the target up via the configured selector, subscribes to its
    /// input-change events, and spawns the debounce worker. A missing target
    /// and a repeated attach are both deliberate no-ops, reported through
    /// [`AttachOutcome`]; a denied host document is a real error.
    #[instrument(skip(self))]
    pub async fn attach(&mut self) -> Result<AttachOutcome, HostError> {
        if self.attached {
            debug!("Already attached, skipping listener registration");
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let target = match self.find_target().await? {
            Some(element) => element,
            None => {
                debug!(
                    "No element matching {:?}, nothing to attach to",
                    self.config.selector
                );
                return Ok(AttachOutcome::TargetMissing);
            }
        };

        // Subscribe before handing the stream to the worker so no keystroke
        // between spawn and first poll is lost
        let events = target.input_stream();
        let worker = tokio::spawn(Self::debounce_worker(
            target.clone(),
            events,
            self.config.debounce,
        ));

        info!("Attached to search input, debounce {:?}", self.config.debounce);
        self.target = Some(target);
        self.worker = Some(worker);
        self.attached = true;
        Ok(AttachOutcome::Attached)
    }

    /// Stop observing the search input.
    ///
    /// Cancels any pending Enter simulation without firing it and drops the
    /// input subscription. A later [`attach`](Self::attach) starts over.
    #[instrument(skip(self))]
    pub fn detach(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
            info!("Detached from search input");
        }
        self.target = None;
        self.attached = false;
    }

    async fn find_target(&self) -> Result<Option<HostElement>, HostError> {
        let locator = self.document.locator(self.config.selector.clone());

        match self.config.wait_for_target {
            Some(timeout) => match locator.wait(Some(timeout)).await {
                Ok(element) => Ok(Some(element)),
                Err(HostError::Timeout(_)) => Ok(None),
                Err(e) => Err(e),
            },
            None => match locator.try_first() {
                Ok(element) => Ok(Some(element)),
                Err(HostError::ElementNotFound(_)) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    /// Consume the input stream, resetting the deadline on every keystroke
    /// and simulating Enter once a full quiet period has elapsed
    async fn debounce_worker(
        element: HostElement,
        mut events: impl Stream<Item = InputEvent> + Unpin,
        debounce: Duration,
    ) {
        let mut deadline: Option<tokio::time::Instant> = None;

        loop {
            match deadline {
                None => match events.next().await {
                    Some(_) => deadline = Some(tokio::time::Instant::now() + debounce),
                    None => break,
                },
                Some(when) => {
                    tokio::select! {
                        biased;
                        maybe_event = events.next() => match maybe_event {
                            // Each keystroke cancels the pending simulation
                            // and schedules a fresh one
                            Some(_) => deadline = Some(tokio::time::Instant::now() + debounce),
                            None => break,
                        },
                        _ = tokio::time::sleep_until(when) => {
                            Self::press_enter(&element);
                            deadline = None;
                        }
                    }
                }
            }
        }
    }

    /// Dispatch the three-event Enter sequence on the target element
    fn press_enter(element: &HostElement) {
        for event in SyntheticKeyEvent::enter_sequence() {
            if let Err(e) = element.dispatch_key(&event) {
                // The host may have torn the element down; log and move on
                warn!("Failed to dispatch synthetic {} event: {e}", event.phase);
                break;
            }
        }
    }
}

impl Drop for LiveSearch {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
