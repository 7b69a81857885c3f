/*!
 * Syscall Layer
 * Thin errno-or-value wrappers over the raw socket syscalls
 *
 * Every wrapper issues exactly one syscall and reports its outcome verbatim:
 * no retries, no errno translation, no logging. Policy lives in the
 * operations layer.
 */

pub mod sctp;

use std::mem::{self, offset_of};
use std::ptr;

use libc::{c_int, c_void, socklen_t};

use crate::core::errors::fatal;
use crate::core::types::{last_errno, Errno, Fd};
use sctp::{
    SctpEvent, SctpInfo, SctpInitMsg, SctpRcvInfo, SctpSackInfo, SctpSndInfo,
    SCTP_BINDX_ADD_ADDR, SCTP_BINDX_REM_ADDR, SCTP_DELAYED_ACK_TIME, SCTP_EVENT,
    SCTP_GET_LOCAL_ADDRS, SCTP_GET_PEER_ADDRS, SCTP_INITMSG, SCTP_NODELAY, SCTP_RCVINFO,
    SCTP_RECVRCVINFO, SCTP_SNDINFO, SCTP_SOCKOPT_BINDX_ADD, SCTP_SOCKOPT_BINDX_REM,
    SCTP_SOCKOPT_CONNECTX, SCTP_STATUS, SOL_SCTP,
};

/// Raw syscall outcome: the success value, or the platform errno.
pub type SysResult<T> = Result<T, Errno>;

fn cvt(rc: c_int) -> SysResult<c_int> {
    if rc < 0 {
        Err(last_errno())
    } else {
        Ok(rc)
    }
}

/// Non-blocking, close-on-exec one-to-one SCTP socket.
pub fn create_socket() -> SysResult<Fd> {
    let fd = unsafe {
        libc::socket(
            libc::AF_INET,
            libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            libc::IPPROTO_SCTP,
        )
    };
    cvt(fd)
}

pub fn close(fd: Fd) -> SysResult<()> {
    cvt(unsafe { libc::close(fd) }).map(drop)
}

pub fn shutdown(fd: Fd, how: c_int) -> SysResult<()> {
    cvt(unsafe { libc::shutdown(fd, how) }).map(drop)
}

pub fn listen(fd: Fd, backlog: c_int) -> SysResult<()> {
    cvt(unsafe { libc::listen(fd, backlog) }).map(drop)
}

/// Accept one connection, writing the peer address into `sockaddr`.
pub fn accept(fd: Fd, sockaddr: &mut [u8]) -> SysResult<Fd> {
    let mut len = sockaddr.len() as socklen_t;
    let rc = unsafe {
        libc::accept(fd, sockaddr.as_mut_ptr() as *mut libc::sockaddr, &mut len)
    };
    cvt(rc)
}

pub fn bind(fd: Fd, sockaddr: &[u8]) -> SysResult<()> {
    let rc = unsafe {
        libc::bind(
            fd,
            sockaddr.as_ptr() as *const libc::sockaddr,
            sockaddr.len() as socklen_t,
        )
    };
    cvt(rc).map(drop)
}

pub fn connect(fd: Fd, sockaddr: &[u8]) -> SysResult<()> {
    let rc = unsafe {
        libc::connect(
            fd,
            sockaddr.as_ptr() as *const libc::sockaddr,
            sockaddr.len() as socklen_t,
        )
    };
    cvt(rc).map(drop)
}

pub fn getsockname(fd: Fd, sockaddr: &mut [u8]) -> SysResult<()> {
    let mut len = sockaddr.len() as socklen_t;
    let rc = unsafe {
        libc::getsockname(fd, sockaddr.as_mut_ptr() as *mut libc::sockaddr, &mut len)
    };
    cvt(rc).map(drop)
}

pub fn getpeername(fd: Fd, sockaddr: &mut [u8]) -> SysResult<()> {
    let mut len = sockaddr.len() as socklen_t;
    let rc = unsafe {
        libc::getpeername(fd, sockaddr.as_mut_ptr() as *mut libc::sockaddr, &mut len)
    };
    cvt(rc).map(drop)
}

/// Pending asynchronous error, retrieved and cleared via `SO_ERROR`.
pub fn socket_error(fd: Fd) -> SysResult<c_int> {
    let mut error: c_int = 0;
    let mut len = mem::size_of::<c_int>() as socklen_t;
    let rc = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_ERROR,
            &mut error as *mut c_int as *mut c_void,
            &mut len,
        )
    };
    cvt(rc)?;
    Ok(error)
}

fn setsockopt_struct<T>(fd: Fd, level: c_int, optname: c_int, value: &T) -> SysResult<()> {
    let rc = unsafe {
        libc::setsockopt(
            fd,
            level,
            optname,
            value as *const T as *const c_void,
            mem::size_of::<T>() as socklen_t,
        )
    };
    cvt(rc).map(drop)
}

fn setsockopt_bytes(fd: Fd, level: c_int, optname: c_int, data: &[u8]) -> SysResult<()> {
    let rc = unsafe {
        libc::setsockopt(
            fd,
            level,
            optname,
            data.as_ptr() as *const c_void,
            data.len() as socklen_t,
        )
    };
    cvt(rc).map(drop)
}

pub fn set_sack_info(fd: Fd, info: &SctpSackInfo) -> SysResult<()> {
    setsockopt_struct(fd, SOL_SCTP, SCTP_DELAYED_ACK_TIME, info)
}

pub fn set_initmsg(fd: Fd, initmsg: &SctpInitMsg) -> SysResult<()> {
    setsockopt_struct(fd, SOL_SCTP, SCTP_INITMSG, initmsg)
}

pub fn set_recv_rcvinfo(fd: Fd, enabled: c_int) -> SysResult<()> {
    setsockopt_struct(fd, SOL_SCTP, SCTP_RECVRCVINFO, &enabled)
}

pub fn set_linger(fd: Fd, onoff: c_int, linger: c_int) -> SysResult<()> {
    let value = libc::linger {
        l_onoff: onoff,
        l_linger: linger,
    };
    setsockopt_struct(fd, libc::SOL_SOCKET, libc::SO_LINGER, &value)
}

pub fn set_nodelay(fd: Fd, enabled: c_int) -> SysResult<()> {
    setsockopt_struct(fd, SOL_SCTP, SCTP_NODELAY, &enabled)
}

pub fn set_event(fd: Fd, event: &SctpEvent) -> SysResult<()> {
    setsockopt_struct(fd, SOL_SCTP, SCTP_EVENT, event)
}

/// `SCTP_STATUS` query. A kernel that returns fewer bytes than the offset of
/// the association statistics has violated the ABI this layer was built
/// against, which is not recoverable.
pub fn sctp_status(fd: Fd) -> SysResult<SctpInfo> {
    let mut info: SctpInfo = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<SctpInfo>() as socklen_t;
    let rc = unsafe {
        libc::getsockopt(
            fd,
            SOL_SCTP,
            SCTP_STATUS,
            &mut info as *mut SctpInfo as *mut c_void,
            &mut len,
        )
    };
    cvt(rc)?;
    if (len as usize) < offset_of!(SctpInfo, sctpi_isacks) {
        fatal("sctp_status returned a truncated sctp_info structure");
    }
    Ok(info)
}

/// Add or remove bound addresses; `packed` is a contiguous record list.
pub fn bindx(fd: Fd, packed: &[u8], flags: c_int) -> SysResult<()> {
    let optname = match flags {
        SCTP_BINDX_ADD_ADDR => SCTP_SOCKOPT_BINDX_ADD,
        SCTP_BINDX_REM_ADDR => SCTP_SOCKOPT_BINDX_REM,
        _ => return Err(libc::EINVAL),
    };
    setsockopt_bytes(fd, SOL_SCTP, optname, packed)
}

/// Initiate an association over a contiguous record list of peer addresses.
pub fn connectx(fd: Fd, packed: &[u8]) -> SysResult<()> {
    setsockopt_bytes(fd, SOL_SCTP, SCTP_SOCKOPT_CONNECTX, packed)
}

// The address queries share one getsockopt shape: a struct sctp_getaddrs
// header (assoc_id + addr_num) followed by the packed record list.
const GETADDRS_HEADER: usize = 8;
const GETADDRS_BUF: usize = 4096;

fn addrs_query(fd: Fd, optname: c_int) -> SysResult<(usize, Vec<u8>)> {
    let mut buf = vec![0u8; GETADDRS_BUF];
    let mut len = buf.len() as socklen_t;
    let rc = unsafe {
        libc::getsockopt(fd, SOL_SCTP, optname, buf.as_mut_ptr() as *mut c_void, &mut len)
    };
    cvt(rc)?;
    let used = len as usize;
    if used < GETADDRS_HEADER || used > buf.len() {
        fatal("sctp address query returned an invalid length");
    }
    let count = u32::from_ne_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    buf.truncate(used);
    buf.drain(..GETADDRS_HEADER);
    Ok((count, buf))
}

pub fn local_addrs(fd: Fd) -> SysResult<(usize, Vec<u8>)> {
    addrs_query(fd, SCTP_GET_LOCAL_ADDRS)
}

pub fn peer_addrs(fd: Fd) -> SysResult<(usize, Vec<u8>)> {
    addrs_query(fd, SCTP_GET_PEER_ADDRS)
}

/// Send one message with `SCTP_SNDINFO` ancillary data.
pub fn sendv(fd: Fd, message: &[u8], sndinfo: &SctpSndInfo, flags: c_int) -> SysResult<usize> {
    let info_len = mem::size_of::<SctpSndInfo>();
    unsafe {
        let mut iov = libc::iovec {
            iov_base: message.as_ptr() as *mut c_void,
            iov_len: message.len(),
        };
        let mut control = vec![0u8; libc::CMSG_SPACE(info_len as u32) as usize];
        let mut msg: libc::msghdr = mem::zeroed();
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;
        msg.msg_control = control.as_mut_ptr() as *mut c_void;
        msg.msg_controllen = control.len();

        let cmsg = libc::CMSG_FIRSTHDR(&msg);
        (*cmsg).cmsg_level = libc::IPPROTO_SCTP;
        (*cmsg).cmsg_type = SCTP_SNDINFO;
        (*cmsg).cmsg_len = libc::CMSG_LEN(info_len as u32) as usize;
        ptr::copy_nonoverlapping(
            sndinfo as *const SctpSndInfo as *const u8,
            libc::CMSG_DATA(cmsg),
            info_len,
        );

        let sent = libc::sendmsg(fd, &msg, flags);
        if sent < 0 {
            Err(last_errno())
        } else {
            Ok(sent as usize)
        }
    }
}

/// Outcome of one `recvmsg` with SCTP ancillary data.
pub struct RecvOutcome {
    pub bytes_received: usize,
    pub flags: c_int,
    /// Present only when the kernel attached an `SCTP_RCVINFO` cmsg
    /// (requires `SCTP_RECVRCVINFO` on the socket).
    pub rcvinfo: Option<SctpRcvInfo>,
}

/// Receive one message, filling `message` with the payload and `from` with
/// the sender address.
pub fn recvv(fd: Fd, message: &mut [u8], from: &mut [u8]) -> SysResult<RecvOutcome> {
    unsafe {
        let mut iov = libc::iovec {
            iov_base: message.as_mut_ptr() as *mut c_void,
            iov_len: message.len(),
        };
        let mut control = vec![0u8; libc::CMSG_SPACE(mem::size_of::<SctpRcvInfo>() as u32) as usize];
        let mut msg: libc::msghdr = mem::zeroed();
        msg.msg_name = from.as_mut_ptr() as *mut c_void;
        msg.msg_namelen = from.len() as socklen_t;
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;
        msg.msg_control = control.as_mut_ptr() as *mut c_void;
        msg.msg_controllen = control.len();

        let received = libc::recvmsg(fd, &mut msg, 0);
        if received < 0 {
            return Err(last_errno());
        }

        let mut rcvinfo = None;
        let mut cmsg = libc::CMSG_FIRSTHDR(&msg);
        while !cmsg.is_null() {
            if (*cmsg).cmsg_level == libc::IPPROTO_SCTP && (*cmsg).cmsg_type == SCTP_RCVINFO {
                rcvinfo = Some(ptr::read_unaligned(
                    libc::CMSG_DATA(cmsg) as *const SctpRcvInfo
                ));
            }
            cmsg = libc::CMSG_NXTHDR(&msg, cmsg);
        }

        Ok(RecvOutcome {
            bytes_received: received as usize,
            flags: msg.msg_flags,
            rcvinfo,
        })
    }
}
