/*!
 * Multi-Homed Operations
 * Address-list bind, connect, and queries
 */

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::encode;
use crate::sockaddr;
use crate::sys;

use super::ModuleContext;

pub(super) fn sctp_bindx(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let records = args.require_buffer_list("sockaddrs");
    let flags = args.require_i32("flags");
    let packed = sockaddr::pack(&records);
    Ok(encode::errno_result(sys::bindx(fd, &packed, flags)))
}

pub(super) fn sctp_connectx(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let records = args.require_buffer_list("sockaddrs");
    let packed = sockaddr::pack(&records);
    Ok(encode::errno_result(sys::connectx(fd, &packed)))
}

pub(super) fn sctp_getladdrs(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    Ok(addrs_result(sys::local_addrs(fd)))
}

pub(super) fn sctp_getpaddrs(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    Ok(addrs_result(sys::peer_addrs(fd)))
}

fn addrs_result(result: sys::SysResult<(usize, Vec<u8>)>) -> Value {
    match result {
        Ok((count, packed)) => {
            let records = sockaddr::unpack(&packed, count)
                .into_iter()
                .map(Value::Bytes)
                .collect();
            encode::success().array("sockaddrs", records).build()
        }
        Err(errno) => encode::failure(errno),
    }
}
