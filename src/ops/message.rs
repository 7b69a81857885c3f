/*!
 * Message Operations
 * Vectored send and receive with SCTP ancillary data
 */

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::encode;
use crate::sys;
use crate::sys::sctp::SctpSndInfo;

use super::ModuleContext;

pub(super) fn sctp_sendv(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let message = args.require_buffer("message");
    let info = args.require_object("sndinfo");
    let flags = args.require_u32("flags");
    let sndinfo = SctpSndInfo {
        snd_sid: info.require_u32("sid") as u16,
        snd_flags: info.require_u32("flags") as u16,
        // payload protocol id travels in network byte order
        snd_ppid: info.require_u32("ppid").to_be(),
        snd_context: info.require_u32("context"),
        snd_assoc_id: 0,
    };
    let result = sys::sendv(fd, &message.borrow(), &sndinfo, flags as i32);
    Ok(match result {
        Ok(sent) => encode::success().int32("bytesSent", sent as i32).build(),
        Err(errno) => encode::failure(errno),
    })
}

pub(super) fn sctp_recvv(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let message = args.require_buffer("messageBuffer");
    let sockaddr = args.require_buffer("sockaddr");
    let outcome = {
        let mut message = message.borrow_mut();
        let mut sockaddr = sockaddr.borrow_mut();
        match sys::recvv(fd, &mut message, &mut sockaddr) {
            Ok(outcome) => outcome,
            Err(errno) => return Ok(encode::failure(errno)),
        }
    };
    let mut result = encode::success()
        .int32("bytesReceived", outcome.bytes_received as i32)
        .int32("flags", outcome.flags);
    // rcvinfo is attached only when the kernel supplied the ancillary data
    if let Some(info) = outcome.rcvinfo {
        let rcvinfo = encode::object()
            .uint64("sid", u64::from(info.rcv_sid))
            .uint64("ssn", u64::from(info.rcv_ssn))
            .uint64("flags", u64::from(info.rcv_flags))
            .uint64("ppid", u64::from(u32::from_be(info.rcv_ppid)))
            .uint64("context", u64::from(info.rcv_context))
            .build();
        result = result.field("rcvinfo", rcvinfo);
    }
    Ok(result.build())
}
