/*!
 * Socket Operations
 * Creation, connection management, and name queries
 */

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::encode;
use crate::sys;

use super::ModuleContext;

pub(super) fn create_socket(_ctx: &ModuleContext, _args: &Args<'_>) -> Result<Value, CallError> {
    Ok(match sys::create_socket() {
        Ok(fd) => encode::success().int32("fd", fd).build(),
        Err(errno) => encode::failure(errno),
    })
}

pub(super) fn close_fd(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    Ok(encode::errno_result(sys::close(fd)))
}

pub(super) fn shutdown(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let how = args.require_i32("how");
    Ok(encode::errno_result(sys::shutdown(fd, how)))
}

pub(super) fn listen(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let backlog = args.require_i32("backlog");
    Ok(encode::errno_result(sys::listen(fd, backlog)))
}

/// Accept one connection; the peer address lands in the caller's buffer.
pub(super) fn accept(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let sockaddr = args.require_buffer("sockaddr");
    let result = sys::accept(fd, &mut sockaddr.borrow_mut());
    Ok(match result {
        Ok(conn_fd) => encode::success().int32("fd", conn_fd).build(),
        Err(errno) => encode::failure(errno),
    })
}

pub(super) fn bind_ipv4(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let sockaddr = args.require_buffer("sockaddr");
    let result = encode::errno_result(sys::bind(fd, &sockaddr.borrow()));
    Ok(result)
}

pub(super) fn connect(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let sockaddr = args.require_buffer("sockaddr");
    let result = encode::errno_result(sys::connect(fd, &sockaddr.borrow()));
    Ok(result)
}

pub(super) fn get_socket_error(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    Ok(match sys::socket_error(fd) {
        Ok(error) => encode::success().int32("socketError", error).build(),
        Err(errno) => encode::failure(errno),
    })
}

pub(super) fn getsockname(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let sockaddr = args.require_buffer("sockaddr");
    let result = encode::errno_result(sys::getsockname(fd, &mut sockaddr.borrow_mut()));
    Ok(result)
}

pub(super) fn getpeername(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let sockaddr = args.require_buffer("sockaddr");
    let result = encode::errno_result(sys::getpeername(fd, &mut sockaddr.borrow_mut()));
    Ok(result)
}
