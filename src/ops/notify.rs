/*!
 * Notification Decoding
 * Tagged decoding of SCTP event notification buffers
 */

use crate::args::Args;
use crate::core::errors::CallError;
use crate::core::value::Value;
use crate::encode;
use crate::sys::sctp::{
    ASSOC_CHANGE_LEN, AUTHKEY_EVENT_LEN, SCTP_ASSOC_CHANGE, SCTP_AUTHENTICATION_EVENT,
};

use super::ModuleContext;

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Decode a notification buffer read off an SCTP socket.
///
/// Unlike the syscall-backed operations this takes caller-provided binary
/// data, so a buffer shorter than the structure it claims to hold is a
/// recoverable error, not a contract violation. Types beyond the decoded
/// variants yield only `sn_type`.
pub(super) fn parse_sctp_notification(
    _ctx: &ModuleContext,
    args: &Args<'_>,
) -> Result<Value, CallError> {
    let buffer = args.require_buffer("notification");
    let bytes = buffer.borrow();
    if bytes.len() < 2 {
        return Err(CallError::BufferTooSmall("parse_sctp_notification"));
    }
    let sn_type = read_u16(&bytes, 0);
    let result = encode::object().int32("sn_type", i32::from(sn_type));

    let result = match sn_type {
        SCTP_ASSOC_CHANGE => {
            if bytes.len() < ASSOC_CHANGE_LEN {
                return Err(CallError::BufferTooSmall("parse_sctp_notification"));
            }
            let change = encode::object()
                .int32("sac_type", i32::from(read_u16(&bytes, 0)))
                .int32("sac_flags", i32::from(read_u16(&bytes, 2)))
                .int32("sac_state", i32::from(read_u16(&bytes, 8)))
                .int32("sac_error", i32::from(read_u16(&bytes, 10)))
                .int32("sac_outbound_streams", i32::from(read_u16(&bytes, 12)))
                .int32("sac_inbound_streams", i32::from(read_u16(&bytes, 14)))
                .build();
            result.field("sn_assoc_change", change)
        }
        SCTP_AUTHENTICATION_EVENT => {
            if bytes.len() < AUTHKEY_EVENT_LEN {
                return Err(CallError::BufferTooSmall("parse_sctp_notification"));
            }
            let event = encode::object()
                .int32("auth_type", i32::from(read_u16(&bytes, 0)))
                .int32("auth_flags", i32::from(read_u16(&bytes, 2)))
                .int32("auth_keynumber", i32::from(read_u16(&bytes, 8)))
                .int32("auth_indication", read_u32(&bytes, 12) as i32)
                .build();
            result.field("sn_authkey_event", event)
        }
        _ => result,
    };
    Ok(result.build())
}
