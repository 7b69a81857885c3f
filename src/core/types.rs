/*!
 * Core Types
 * Shared aliases for descriptors and platform error codes
 */

use std::os::unix::io::RawFd;

/// File descriptor as handed over by the host runtime.
///
/// Descriptors are borrowed, never owned: the host closes them through the
/// `close_fd` operation, independently of any poll registration.
pub type Fd = RawFd;

/// Platform error code, preserved verbatim (0 = success).
pub type Errno = i32;

/// Read the calling thread's errno after a failed syscall.
#[inline]
pub fn last_errno() -> Errno {
    std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(libc::EINVAL)
}
