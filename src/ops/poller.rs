/*!
 * Poller Operation
 * Creation of readiness watches bound to host callbacks
 */

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::poll::Poller;

use super::ModuleContext;

/// Create a poll handle for a descriptor. The returned poller is the host's
/// sole grip on the watch; dropping it finalizes the native state.
pub(super) fn create_poller(ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let callback = args.require_callback("callback");
    Ok(Value::Poller(Poller::create(&ctx.reactor, fd, callback)))
}
