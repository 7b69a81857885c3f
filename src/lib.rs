/*!
 * SCTP Native Layer
 * Low-level SCTP/TCP socket control and readiness notification for a
 * managed host runtime
 */

pub mod args;
pub mod core;
pub mod encode;
pub mod ops;
pub mod poll;
pub mod sockaddr;
pub mod sys;

// Re-exports
pub use crate::core::errors::CallError;
pub use crate::core::types::{Errno, Fd};
pub use crate::core::value::{Buffer, Object, ReadinessCallback, Value};
pub use ops::{Dispatcher, ModuleContext};
pub use poll::{InterestSet, Poller, ReadinessEvent, Reactor};
