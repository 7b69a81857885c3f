/*!
 * Call Error Types
 * Recoverable caller-contract errors and the fatal contract-violation path
 */

use thiserror::Error;

/// Errors reachable from normal (if incorrect) host usage.
///
/// These can arise from races between independent call sites holding the same
/// handle, so they are reported to the immediate caller instead of
/// terminating the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CallError {
    /// Operation name not registered in this deployment variant
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Top-level argument was not an object
    #[error("{op}: arguments must be provided as an object")]
    MalformedArguments { op: &'static str },

    /// Named field missing or of the wrong kind (fallible extraction mode)
    #[error("{op}: {field} must be provided as {expected}")]
    MissingOrWrongType {
        op: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    /// `start`/`stop`/`close` on a handle that is closed or closing
    #[error("poll handle already closed")]
    HandleClosed,

    /// The OS poller rejected a registration change
    #[error("poll registration failed: {0}")]
    PollFailed(String),

    /// Input buffer shorter than the fixed structure it must contain
    #[error("{0}: buffer too small")]
    BufferTooSmall(&'static str),
}

/// Terminate the process on a broken internal contract.
///
/// Reserved for conditions that cannot occur when every call site honors the
/// calling convention: a required field missing from an asserted extraction,
/// an unsupported address family, poll-handle state corruption. These signal
/// a defect in the binding or its invocation, never a runtime condition to
/// recover from, so they must not be downgraded to a recoverable error.
pub fn fatal(context: &str) -> ! {
    log::error!("contract violation: {context}");
    panic!("contract violation: {context}");
}
