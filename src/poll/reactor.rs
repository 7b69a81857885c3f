/*!
 * Reactor
 * Single-threaded readiness loop with deferred watch teardown
 */

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, trace, warn};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Registry, Token};

use super::handle::{InterestSet, PollHandle, ReadinessEvent};
use crate::core::errors::{fatal, CallError};
use crate::core::types::Fd;
use crate::core::value::ReadinessCallback;

fn to_interest(events: InterestSet) -> Interest {
    match (events.readable, events.writable) {
        (true, true) => Interest::READABLE | Interest::WRITABLE,
        (true, false) => Interest::READABLE,
        (false, true) => Interest::WRITABLE,
        (false, false) => fatal("registering a poll watch with no events"),
    }
}

/// Event reactor owning every live poll watch.
///
/// All callbacks run on the thread turning the reactor. Close requests only
/// flag the handle; their completions are drained at the end of each turn,
/// which is what makes `close` asynchronous. Callbacks must not re-enter
/// [`Reactor::turn`].
pub struct Reactor {
    poll: RefCell<Poll>,
    registry: Registry,
    events: RefCell<Events>,
    next_token: Cell<usize>,
    handles: RefCell<HashMap<Token, Rc<PollHandle>>>,
    closing: RefCell<VecDeque<Token>>,
}

impl Reactor {
    pub fn new() -> io::Result<Rc<Self>> {
        let poll = Poll::new()?;
        let registry = poll.registry().try_clone()?;
        Ok(Rc::new(Self {
            poll: RefCell::new(poll),
            registry,
            events: RefCell::new(Events::with_capacity(256)),
            next_token: Cell::new(1),
            handles: RefCell::new(HashMap::new()),
            closing: RefCell::new(VecDeque::new()),
        }))
    }

    /// Live (not yet freed) poll handles, closing ones included.
    pub fn handle_count(&self) -> usize {
        self.handles.borrow().len()
    }

    pub(crate) fn create_handle(&self, fd: Fd, callback: ReadinessCallback) -> Rc<PollHandle> {
        let token = Token(self.next_token.get());
        self.next_token.set(token.0 + 1);
        let handle = Rc::new(PollHandle::new(fd, token, callback));
        self.handles.borrow_mut().insert(token, Rc::clone(&handle));
        debug!("poll handle created for fd {fd} (token {})", token.0);
        handle
    }

    /// (Re)register the watch; the last accepted call wins entirely.
    /// An empty event set behaves like `stop` but the handle stays active.
    pub(crate) fn start(&self, handle: &PollHandle, events: InterestSet) -> Result<(), CallError> {
        if !handle.is_active() {
            return Err(CallError::HandleClosed);
        }
        if events.is_empty() {
            self.deregister(handle);
            handle.set_interest(events);
            return Ok(());
        }
        let fd = handle.fd();
        let mut source = SourceFd(&fd);
        let result = if handle.in_registry() {
            self.registry.reregister(&mut source, handle.token(), to_interest(events))
        } else {
            self.registry.register(&mut source, handle.token(), to_interest(events))
        };
        match result {
            Ok(()) => {
                handle.set_in_registry(true);
                handle.set_interest(events);
                trace!(
                    "poll watch for fd {fd}: readable={} writable={}",
                    events.readable,
                    events.writable
                );
                Ok(())
            }
            Err(err) => Err(CallError::PollFailed(err.to_string())),
        }
    }

    pub(crate) fn stop(&self, handle: &PollHandle) -> Result<(), CallError> {
        if !handle.is_active() {
            return Err(CallError::HandleClosed);
        }
        self.deregister(handle);
        handle.set_interest(InterestSet::default());
        Ok(())
    }

    fn deregister(&self, handle: &PollHandle) {
        if handle.in_registry() {
            let fd = handle.fd();
            // the descriptor may already have been closed by the host
            let _ = self.registry.deregister(&mut SourceFd(&fd));
            handle.set_in_registry(false);
        }
    }

    /// Begin the asynchronous close. Accepted exactly once; the callback is
    /// released here, and the completion runs at the end of a later turn.
    pub(crate) fn close(&self, handle: &PollHandle) -> Result<(), CallError> {
        if !handle.is_active() {
            return Err(CallError::HandleClosed);
        }
        self.deregister(handle);
        handle.begin_close();
        self.closing.borrow_mut().push_back(handle.token());
        trace!("poll close requested for fd {} (token {})", handle.fd(), handle.token().0);
        Ok(())
    }

    /// Run one reactor turn: poll for readiness, dispatch callbacks, then
    /// drain completed closes. Returns the number of callbacks dispatched.
    pub fn turn(&self, timeout: Option<Duration>) -> io::Result<usize> {
        // pending closes must complete promptly even when no I/O arrives
        let timeout = if self.closing.borrow().is_empty() {
            timeout
        } else {
            Some(Duration::ZERO)
        };

        let mut ready: Vec<(Rc<PollHandle>, ReadinessEvent)> = Vec::new();
        {
            let mut events = self.events.borrow_mut();
            match self.poll.borrow_mut().poll(&mut events, timeout) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
            let handles = self.handles.borrow();
            for event in events.iter() {
                let Some(handle) = handles.get(&event.token()) else {
                    continue;
                };
                // error conditions surface as both kinds so the host notices
                let failed = event.is_error() || event.is_read_closed() || event.is_write_closed();
                ready.push((
                    Rc::clone(handle),
                    ReadinessEvent {
                        readable: event.is_readable() || failed,
                        writable: event.is_writable() || failed,
                        status: 0,
                    },
                ));
            }
        }

        let mut dispatched = 0;
        for (handle, event) in ready {
            // a close requested before this turn suppresses queued events
            let Some(callback) = handle.callback() else {
                continue;
            };
            // mask against the current registration: the last start() wins
            // even over events that were queued under an older one
            let interest = handle.interest();
            let event = ReadinessEvent {
                readable: event.readable && interest.readable,
                writable: event.writable && interest.writable,
                status: event.status,
            };
            if event.readable || event.writable {
                callback(&event);
                dispatched += 1;
            }
        }

        self.drain_closing();
        Ok(dispatched)
    }

    fn drain_closing(&self) {
        loop {
            let token = self.closing.borrow_mut().pop_front();
            let Some(token) = token else { break };
            let handle = self.handles.borrow().get(&token).cloned();
            let Some(handle) = handle else {
                fatal("close completion for an unknown poll handle");
            };
            handle.complete_close();
            trace!("poll close completed for fd {} (token {})", handle.fd(), token.0);
            self.maybe_free(&handle);
        }
    }

    /// Free-check: drop the handle from the registry once both the finalizer
    /// and the close sequence are done. Idempotent, callable from either
    /// release event in any order.
    fn maybe_free(&self, handle: &Rc<PollHandle>) {
        if !handle.finalizer_called() {
            // close completed first; the finalizer will re-run the check
            return;
        }
        if handle.is_close_pending() {
            // finalizer ran first; the completion will re-run the check
            return;
        }
        if !handle.is_closed() {
            // still active at finalization: nothing outside can close it
            // anymore, so force the teardown from here
            warn!("poll handle for fd {} not closed at finalization", handle.fd());
            self.deregister(handle);
            handle.begin_close();
            self.closing.borrow_mut().push_back(handle.token());
            return;
        }
        self.handles.borrow_mut().remove(&handle.token());
        debug!("poll handle freed for fd {} (token {})", handle.fd(), handle.token().0);
    }

    /// Owner-drop notification for a handle.
    pub(crate) fn finalize(&self, handle: &Rc<PollHandle>) {
        handle.mark_finalized();
        self.maybe_free(handle);
    }
}
