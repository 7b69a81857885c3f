/*!
 * SCTP ABI
 * Kernel structures and constants from the Linux SCTP socket API
 *
 * The `libc` crate stops at `IPPROTO_SCTP`; everything SCTP-specific below
 * mirrors `uapi/linux/sctp.h` directly.
 */

use libc::c_int;

/// Option level for SCTP socket options (equal to the protocol number).
pub const SOL_SCTP: c_int = 132;

// Socket option names
pub const SCTP_INITMSG: c_int = 2;
pub const SCTP_NODELAY: c_int = 3;
pub const SCTP_STATUS: c_int = 14;
pub const SCTP_DELAYED_ACK_TIME: c_int = 16;
pub const SCTP_RECVRCVINFO: c_int = 32;
pub const SCTP_EVENT: c_int = 127;

// Option numbers private to the library interface: multi-homed bind/connect
// and address queries go through [gs]etsockopt rather than dedicated syscalls
pub const SCTP_SOCKOPT_BINDX_ADD: c_int = 100;
pub const SCTP_SOCKOPT_BINDX_REM: c_int = 101;
pub const SCTP_GET_PEER_ADDRS: c_int = 108;
pub const SCTP_GET_LOCAL_ADDRS: c_int = 109;
pub const SCTP_SOCKOPT_CONNECTX: c_int = 110;

// sctp_bindx() flag values, as exposed to callers
pub const SCTP_BINDX_ADD_ADDR: c_int = 0x01;
pub const SCTP_BINDX_REM_ADDR: c_int = 0x02;

// Ancillary-data types on sendmsg/recvmsg (cmsg_level = IPPROTO_SCTP)
pub const SCTP_SNDINFO: c_int = 2;
pub const SCTP_RCVINFO: c_int = 3;

// Notification types (sctp_notification.sn_header.sn_type)
pub const SCTP_ASSOC_CHANGE: u16 = 0x8001;
pub const SCTP_AUTHENTICATION_EVENT: u16 = 0x8008;

/// `struct sctp_initmsg`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SctpInitMsg {
    pub sinit_num_ostreams: u16,
    pub sinit_max_instreams: u16,
    pub sinit_max_attempts: u16,
    pub sinit_max_init_timeo: u16,
}

/// `struct sctp_sack_info`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SctpSackInfo {
    pub sack_assoc_id: i32,
    pub sack_delay: u32,
    pub sack_freq: u32,
}

/// `struct sctp_event`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SctpEvent {
    pub se_assoc_id: i32,
    pub se_type: u16,
    pub se_on: u8,
}

/// `struct sctp_sndinfo`, carried as send-side ancillary data
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SctpSndInfo {
    pub snd_sid: u16,
    pub snd_flags: u16,
    pub snd_ppid: u32,
    pub snd_context: u32,
    pub snd_assoc_id: i32,
}

/// `struct sctp_rcvinfo`, delivered as receive-side ancillary data when
/// `SCTP_RECVRCVINFO` is enabled
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SctpRcvInfo {
    pub rcv_sid: u16,
    pub rcv_ssn: u16,
    pub rcv_flags: u16,
    pub rcv_ppid: u32,
    pub rcv_tsn: u32,
    pub rcv_cumtsn: u32,
    pub rcv_context: u32,
    pub rcv_assoc_id: i32,
}

/// `struct sctp_info`, the `SCTP_STATUS` query structure
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SctpInfo {
    pub sctpi_tag: u32,
    pub sctpi_state: u32,
    pub sctpi_rwnd: u32,
    pub sctpi_unackdata: u16,
    pub sctpi_penddata: u16,
    pub sctpi_instrms: u16,
    pub sctpi_outstrms: u16,
    pub sctpi_fragmentation_point: u32,
    pub sctpi_inqueue: u32,
    pub sctpi_outqueue: u32,
    pub sctpi_overall_error: u32,
    pub sctpi_max_burst: u32,
    pub sctpi_maxseg: u32,
    pub sctpi_peer_rwnd: u32,
    pub sctpi_peer_tag: u32,
    pub sctpi_peer_capable: u8,
    pub sctpi_peer_sack: u8,
    pub __reserved1: u16,
    pub sctpi_isacks: u64,
    pub sctpi_osacks: u64,
    pub sctpi_opackets: u64,
    pub sctpi_ipackets: u64,
    pub sctpi_rtxchunks: u64,
    pub sctpi_outofseqtsns: u64,
    pub sctpi_idupchunks: u64,
    pub sctpi_gapcnt: u64,
    pub sctpi_ouodchunks: u64,
    pub sctpi_iuodchunks: u64,
    pub sctpi_oodchunks: u64,
    pub sctpi_iodchunks: u64,
    pub sctpi_octrlchunks: u64,
    pub sctpi_ictrlchunks: u64,
    pub sctpi_p_address: [u8; 128],
    pub sctpi_p_state: i32,
    pub sctpi_p_cwnd: u32,
    pub sctpi_p_srtt: u32,
    pub sctpi_p_rto: u32,
    pub sctpi_p_hbinterval: u32,
    pub sctpi_p_pathmaxrxt: u32,
    pub sctpi_p_sackdelay: u32,
    pub sctpi_p_sackfreq: u32,
    pub sctpi_p_ssthresh: u32,
    pub sctpi_p_peer_rwnd: u32,
    pub sctpi_p_flight_size: u32,
    pub sctpi_p_error: u16,
    pub __reserved2: u16,
    pub sctpi_s_autoclose: u32,
    pub sctpi_s_adaptation_ind: u32,
    pub sctpi_s_pd_point: u32,
    pub sctpi_s_nodelay: u8,
    pub sctpi_s_disable_fragments: u8,
    pub sctpi_s_v4mapped: u8,
    pub sctpi_s_frag_interleave: u8,
    pub sctpi_s_type: u32,
    pub __reserved3: u32,
}

// Fixed sizes of the notification variants we decode. Buffers shorter than
// these cannot be reinterpreted as the structure.
pub const ASSOC_CHANGE_LEN: usize = 20;
pub const AUTHKEY_EVENT_LEN: usize = 20;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn structure_layouts_match_the_kernel_abi() {
        assert_eq!(size_of::<SctpInitMsg>(), 8);
        assert_eq!(size_of::<SctpSackInfo>(), 12);
        assert_eq!(size_of::<SctpSndInfo>(), 16);
        assert_eq!(size_of::<SctpRcvInfo>(), 28);
        assert_eq!(offset_of!(SctpInfo, sctpi_isacks), 56);
        assert_eq!(offset_of!(SctpInfo, sctpi_p_address), 168);
    }
}
