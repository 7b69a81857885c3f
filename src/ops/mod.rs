/*!
 * Operation Dispatch
 * Maps host operation names onto decode, syscall, and encode pipelines
 */

mod message;
mod multihome;
mod notify;
mod poller;
mod socket;
mod sockopt;

use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::poll::Reactor;

/// Shared state handed to every operation.
pub struct ModuleContext {
    pub reactor: Rc<Reactor>,
}

type OpHandler = fn(&ModuleContext, &Args<'_>) -> Result<Value, CallError>;

/// Operation registry; one instance per deployment variant.
///
/// Two variants of the same registry are shipped, differing only in their
/// connection-establishment surface: the single-homed variant exposes plain
/// `bind_ipv4`/`connect`, the multi-homed variant exposes the address-list
/// operations instead. Everything else is common.
pub struct Dispatcher {
    ctx: ModuleContext,
    ops: HashMap<&'static str, OpHandler>,
}

impl Dispatcher {
    /// Variant with single-address bind and connect.
    #[must_use]
    pub fn single_homed(reactor: Rc<Reactor>) -> Self {
        let mut dispatcher = Self::common(reactor);
        dispatcher.register("bind_ipv4", socket::bind_ipv4);
        dispatcher.register("connect", socket::connect);
        dispatcher
    }

    /// Variant with the multi-homed address-list operations.
    #[must_use]
    pub fn multi_homed(reactor: Rc<Reactor>) -> Self {
        let mut dispatcher = Self::common(reactor);
        dispatcher.register("sctp_bindx", multihome::sctp_bindx);
        dispatcher.register("sctp_connectx", multihome::sctp_connectx);
        dispatcher.register("sctp_getladdrs", multihome::sctp_getladdrs);
        dispatcher.register("sctp_getpaddrs", multihome::sctp_getpaddrs);
        dispatcher
    }

    fn common(reactor: Rc<Reactor>) -> Self {
        let mut dispatcher = Self {
            ctx: ModuleContext { reactor },
            ops: HashMap::new(),
        };
        dispatcher.register("create_socket", socket::create_socket);
        dispatcher.register("close_fd", socket::close_fd);
        dispatcher.register("shutdown", socket::shutdown);
        dispatcher.register("listen", socket::listen);
        dispatcher.register("accept", socket::accept);
        dispatcher.register("get_socket_error", socket::get_socket_error);
        dispatcher.register("getsockname", socket::getsockname);
        dispatcher.register("getpeername", socket::getpeername);
        dispatcher.register("setsockopt_sack_info", sockopt::set_sack_info);
        dispatcher.register("setsockopt_sctp_initmsg", sockopt::set_sctp_initmsg);
        dispatcher.register("setsockopt_sctp_recvrcvinfo", sockopt::set_sctp_recvrcvinfo);
        dispatcher.register("setsockopt_linger", sockopt::set_linger);
        dispatcher.register("setsockopt_nodelay", sockopt::set_nodelay);
        dispatcher.register("setsockopt_sctp_event", sockopt::set_sctp_event);
        dispatcher.register("getsockopt_sctp_status", sockopt::get_sctp_status);
        dispatcher.register("sctp_sendv", message::sctp_sendv);
        dispatcher.register("sctp_recvv", message::sctp_recvv);
        dispatcher.register("parse_sctp_notification", notify::parse_sctp_notification);
        dispatcher.register("create_poller", poller::create_poller);
        dispatcher
    }

    fn register(&mut self, name: &'static str, handler: OpHandler) {
        self.ops.insert(name, handler);
    }

    /// Whether this variant exposes `name`.
    #[must_use]
    pub fn supports(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Dispatch one named operation against its argument object.
    pub fn dispatch(&self, op: &str, args: &Value) -> Result<Value, CallError> {
        let Some((name, handler)) = self.ops.get_key_value(op) else {
            return Err(CallError::UnknownOperation(op.to_string()));
        };
        let args = Args::from_value(name, args)?;
        trace!("dispatching {op}");
        handler(&self.ctx, &args)
    }
}
