/*!
 * Poll Handle
 * Lifecycle state for one registered descriptor watch
 */

use std::cell::{Cell, RefCell};

use mio::Token;

use crate::core::errors::fatal;
use crate::core::types::Fd;
use crate::core::value::ReadinessCallback;

/// Event kinds a handle is watching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterestSet {
    pub readable: bool,
    pub writable: bool,
}

impl InterestSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.readable && !self.writable
    }
}

/// One readiness delivery to a handle's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessEvent {
    pub readable: bool,
    pub writable: bool,
    /// 0 on normal delivery; reserved for delivery-failure reporting.
    pub status: i32,
}

/// Native state for one descriptor watch.
///
/// The descriptor itself is borrowed: closing it stays the host's separate
/// responsibility through `close_fd`. Teardown is coordinated between three
/// independent parties that may act in any order: the explicit `close`
/// request, the reactor's asynchronous close completion, and the owner
/// finalizer. The handle is freed (dropped from the reactor registry) only
/// once the finalizer has run and the close has completed.
pub struct PollHandle {
    fd: Fd,
    token: Token,
    close_pending: Cell<bool>,
    closed: Cell<bool>,
    finalizer_called: Cell<bool>,
    interest: Cell<InterestSet>,
    in_registry: Cell<bool>,
    callback: RefCell<Option<ReadinessCallback>>,
}

impl PollHandle {
    pub(crate) fn new(fd: Fd, token: Token, callback: ReadinessCallback) -> Self {
        Self {
            fd,
            token,
            close_pending: Cell::new(false),
            closed: Cell::new(false),
            finalizer_called: Cell::new(false),
            interest: Cell::new(InterestSet::default()),
            in_registry: Cell::new(false),
            callback: RefCell::new(Some(callback)),
        }
    }

    #[inline]
    pub fn fd(&self) -> Fd {
        self.fd
    }

    #[inline]
    pub(crate) fn token(&self) -> Token {
        self.token
    }

    /// Neither closing nor closed: `start`/`stop`/`close` are accepted.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.close_pending.get() && !self.closed.get()
    }

    #[inline]
    pub fn interest(&self) -> InterestSet {
        self.interest.get()
    }

    pub(crate) fn set_interest(&self, interest: InterestSet) {
        self.interest.set(interest);
    }

    pub(crate) fn is_close_pending(&self) -> bool {
        self.close_pending.get()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn finalizer_called(&self) -> bool {
        self.finalizer_called.get()
    }

    pub(crate) fn mark_finalized(&self) {
        self.finalizer_called.set(true);
    }

    pub(crate) fn in_registry(&self) -> bool {
        self.in_registry.get()
    }

    pub(crate) fn set_in_registry(&self, registered: bool) {
        self.in_registry.set(registered);
    }

    /// Clone of the callback, `None` once the close sequence has begun.
    pub(crate) fn callback(&self) -> Option<ReadinessCallback> {
        self.callback.borrow().clone()
    }

    /// Enter ClosePending: the callback is released immediately, before the
    /// completion runs, so no delivery can race the teardown.
    pub(crate) fn begin_close(&self) {
        self.callback.borrow_mut().take();
        self.interest.set(InterestSet::default());
        self.close_pending.set(true);
    }

    /// Close completion. Running it in any state other than ClosePending
    /// means the lifecycle flags are corrupt.
    pub(crate) fn complete_close(&self) {
        if !self.close_pending.get() {
            fatal("poll close completed without a pending close");
        }
        if self.closed.get() {
            fatal("poll close completed twice");
        }
        self.close_pending.set(false);
        self.closed.set(true);
    }
}
