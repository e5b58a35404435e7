//! Debounced Enter-key simulation for embedded dashboard search inputs
//!
//! This crate watches a search field inside an embedding host's document,
//! waits for typing to go quiet, then dispatches synthetic Enter keyboard
//! events that the host cannot tell from real user input, forcing it to
//! re-run its query.

pub mod element;
pub mod errors;
pub mod events;
pub mod host;
pub mod live_search;
pub mod locator;
pub mod selector;
#[cfg(test)]
mod tests;

pub use element::{ElementAttributes, HostElement, HostElementImpl};
pub use errors::HostError;
pub use events::{InputEvent, KeyPhase, SyntheticKeyEvent};
pub use host::{DocumentAccessor, HostDocument};
pub use host::memory::{DispatchRecord, MemoryDocument};
pub use live_search::{
    AttachOutcome, LiveSearch, LiveSearchConfig, DEFAULT_DEBOUNCE, DEFAULT_SEARCH_LABEL,
};
pub use locator::Locator;
pub use selector::Selector;
