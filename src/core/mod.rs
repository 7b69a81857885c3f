/*!
 * Core Module
 * Fundamental types, the host value boundary, and error handling
 */

pub mod errors;
pub mod types;
pub mod value;

// Re-export for convenience
pub use errors::{fatal, CallError};
pub use types::{last_errno, Errno, Fd};
pub use value::{Buffer, Object, ReadinessCallback, Value};
