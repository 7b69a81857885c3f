/*!
 * Poll Module
 * Readiness watches with coordinated three-party teardown
 */

mod handle;
mod reactor;

pub use handle::{InterestSet, PollHandle, ReadinessEvent};
pub use reactor::Reactor;

use std::rc::Rc;

use crate::core::errors::CallError;
use crate::core::types::Fd;
use crate::core::value::ReadinessCallback;

/// Host-facing poller object.
///
/// Owns one poll handle on behalf of the host wrapper. Dropping the last
/// reference plays the role of the wrapper's finalizer: if the watch was
/// closed beforehand the native state is released once the close completes;
/// if not, the reactor recovers the leak by forcing the close itself.
pub struct Poller {
    handle: Rc<PollHandle>,
    reactor: Rc<Reactor>,
}

impl Poller {
    pub fn create(reactor: &Rc<Reactor>, fd: Fd, callback: ReadinessCallback) -> Rc<Self> {
        let handle = reactor.create_handle(fd, callback);
        Rc::new(Self {
            handle,
            reactor: Rc::clone(reactor),
        })
    }

    /// Watch for `events`; replaces any previous registration outright.
    pub fn start(&self, events: InterestSet) -> Result<(), CallError> {
        self.reactor.start(&self.handle, events)
    }

    /// Suspend event delivery without tearing the handle down.
    pub fn stop(&self) -> Result<(), CallError> {
        self.reactor.stop(&self.handle)
    }

    /// Begin the asynchronous close; accepted exactly once.
    pub fn close(&self) -> Result<(), CallError> {
        self.reactor.close(&self.handle)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    #[must_use]
    pub fn interest(&self) -> InterestSet {
        self.handle.interest()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.reactor.finalize(&self.handle);
    }
}
