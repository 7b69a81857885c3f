/*!
 * Socket Option Operations
 * Marshalling of host argument objects into SCTP option structures
 */

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::encode;
use crate::sys;
use crate::sys::sctp::{SctpEvent, SctpInitMsg, SctpSackInfo};

use super::ModuleContext;

pub(super) fn set_sack_info(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let info = SctpSackInfo {
        sack_assoc_id: args.require_u32("sack_assoc_id") as i32,
        sack_delay: args.require_u32("sack_delay"),
        sack_freq: args.require_u32("sack_freq"),
    };
    Ok(encode::errno_result(sys::set_sack_info(fd, &info)))
}

pub(super) fn set_sctp_initmsg(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let initmsg = SctpInitMsg {
        sinit_num_ostreams: args.require_u32("sinit_num_ostreams") as u16,
        sinit_max_instreams: args.require_u32("sinit_max_instreams") as u16,
        sinit_max_attempts: args.require_u32("sinit_max_attempts") as u16,
        sinit_max_init_timeo: args.require_u32("sinit_max_init_timeo") as u16,
    };
    Ok(encode::errno_result(sys::set_initmsg(fd, &initmsg)))
}

pub(super) fn set_sctp_recvrcvinfo(
    _ctx: &ModuleContext,
    args: &Args<'_>,
) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let value = args.require_i32("value");
    Ok(encode::errno_result(sys::set_recv_rcvinfo(fd, value)))
}

pub(super) fn set_linger(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let onoff = args.require_i32("onoff");
    let linger = args.require_i32("linger");
    Ok(encode::errno_result(sys::set_linger(fd, onoff, linger)))
}

pub(super) fn set_nodelay(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let value = args.require_i32("value");
    Ok(encode::errno_result(sys::set_nodelay(fd, value)))
}

pub(super) fn set_sctp_event(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    // se_assoc_id stays 0: options apply to future associations
    let event = SctpEvent {
        se_assoc_id: 0,
        se_type: args.require_i32("se_type") as u16,
        se_on: args.require_i32("se_on") as u8,
    };
    Ok(encode::errno_result(sys::set_event(fd, &event)))
}

/// Association status snapshot. Counters are reported as unsigned 64-bit so
/// none of them can lose precision at the host boundary.
pub(super) fn get_sctp_status(_ctx: &ModuleContext, args: &Args<'_>) -> Result<Value, CallError> {
    let fd = args.require_i32("fd");
    let info = match sys::sctp_status(fd) {
        Ok(info) => info,
        Err(errno) => return Ok(encode::failure(errno)),
    };
    let status = encode::object()
        .uint64("sctpi_tag", u64::from(info.sctpi_tag))
        .uint64("sctpi_state", u64::from(info.sctpi_state))
        .uint64("sctpi_rwnd", u64::from(info.sctpi_rwnd))
        .uint64("sctpi_unackdata", u64::from(info.sctpi_unackdata))
        .uint64("sctpi_penddata", u64::from(info.sctpi_penddata))
        .uint64("sctpi_instrms", u64::from(info.sctpi_instrms))
        .uint64("sctpi_outstrms", u64::from(info.sctpi_outstrms))
        .uint64(
            "sctpi_fragmentation_point",
            u64::from(info.sctpi_fragmentation_point),
        )
        .uint64("sctpi_inqueue", u64::from(info.sctpi_inqueue))
        .uint64("sctpi_outqueue", u64::from(info.sctpi_outqueue))
        .uint64("sctpi_overall_error", u64::from(info.sctpi_overall_error))
        .uint64("sctpi_max_burst", u64::from(info.sctpi_max_burst))
        .uint64("sctpi_maxseg", u64::from(info.sctpi_maxseg))
        .uint64("sctpi_peer_rwnd", u64::from(info.sctpi_peer_rwnd))
        .uint64("sctpi_peer_tag", u64::from(info.sctpi_peer_tag))
        .uint64("sctpi_peer_capable", u64::from(info.sctpi_peer_capable))
        .uint64("sctpi_peer_sack", u64::from(info.sctpi_peer_sack))
        .build();
    Ok(encode::success().field("info", status).build())
}
