use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Access to host document denied: {0}")]
    AccessDenied(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Element is detached from the document: {0}")]
    Detached(String),
}
