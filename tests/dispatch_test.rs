/*!
 * Dispatch Tests
 * End-to-end operation dispatch against real descriptors
 */

use std::os::unix::io::RawFd;

use sctp_native::{Buffer, CallError, Dispatcher, Object, Reactor, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn multi_homed() -> Dispatcher {
    Dispatcher::multi_homed(Reactor::new().unwrap())
}

fn single_homed() -> Dispatcher {
    Dispatcher::single_homed(Reactor::new().unwrap())
}

fn args(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect::<Object>(),
    )
}

fn errno_of(result: &Value) -> i64 {
    match result.get("errno") {
        Some(Value::Int(errno)) => *errno,
        other => panic!("result missing errno field: {other:?}"),
    }
}

struct Pipe {
    read: RawFd,
    write: RawFd,
}

impl Pipe {
    fn new() -> Self {
        let mut fds = [0; 2];
        let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
        assert_eq!(rc, 0, "pipe2 failed");
        Self {
            read: fds[0],
            write: fds[1],
        }
    }
}

impl Drop for Pipe {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.read);
            libc::close(self.write);
        }
    }
}

fn nonblocking_tcp_socket() -> RawFd {
    let fd = unsafe {
        libc::socket(
            libc::AF_INET,
            libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            0,
        )
    };
    assert!(fd >= 0, "socket failed");
    fd
}

fn close_raw(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}

fn loopback_record(port: u16) -> Buffer {
    let mut record = vec![0u8; 16];
    record[..2].copy_from_slice(&(libc::AF_INET as u16).to_ne_bytes());
    record[2..4].copy_from_slice(&port.to_be_bytes());
    record[4..8].copy_from_slice(&[127, 0, 0, 1]);
    Buffer::from_vec(record)
}

#[test]
fn unknown_operation_is_a_recoverable_error() {
    init_logging();
    let err = multi_homed()
        .dispatch("frobnicate", &args(vec![]))
        .unwrap_err();
    assert_eq!(err, CallError::UnknownOperation("frobnicate".into()));
}

#[test]
fn non_object_arguments_are_a_recoverable_error() {
    init_logging();
    let err = multi_homed()
        .dispatch("close_fd", &Value::Int(1))
        .unwrap_err();
    assert_eq!(err, CallError::MalformedArguments { op: "close_fd" });
}

#[test]
fn variants_differ_only_in_the_connection_surface() {
    let single = single_homed();
    let multi = multi_homed();
    for op in ["bind_ipv4", "connect"] {
        assert!(single.supports(op));
        assert!(!multi.supports(op));
    }
    for op in ["sctp_bindx", "sctp_connectx", "sctp_getladdrs", "sctp_getpaddrs"] {
        assert!(multi.supports(op));
        assert!(!single.supports(op));
    }
    for op in ["create_socket", "sctp_sendv", "parse_sctp_notification", "create_poller"] {
        assert!(single.supports(op));
        assert!(multi.supports(op));
    }
}

#[test]
fn operational_failures_come_back_as_errno_results() {
    init_logging();
    let dispatcher = multi_homed();
    let result = dispatcher
        .dispatch("close_fd", &args(vec![("fd", Value::Int(-1))]))
        .unwrap();
    assert_eq!(errno_of(&result), i64::from(libc::EBADF));
    // nothing but errno on failure
    assert_eq!(result.as_object().unwrap().len(), 1);
}

#[test]
fn close_fd_closes_a_real_descriptor() {
    init_logging();
    let dispatcher = multi_homed();
    let pipe = Pipe::new();
    let fd = unsafe { libc::dup(pipe.read) };
    assert!(fd >= 0);
    let result = dispatcher
        .dispatch("close_fd", &args(vec![("fd", Value::Int(i64::from(fd)))]))
        .unwrap();
    assert_eq!(errno_of(&result), 0);
    // a second close of the same fd must now fail
    let result = dispatcher
        .dispatch("close_fd", &args(vec![("fd", Value::Int(i64::from(fd)))]))
        .unwrap();
    assert_eq!(errno_of(&result), i64::from(libc::EBADF));
}

#[test]
fn listen_on_a_pipe_reports_enotsock() {
    init_logging();
    let pipe = Pipe::new();
    let result = multi_homed()
        .dispatch(
            "listen",
            &args(vec![
                ("fd", Value::Int(i64::from(pipe.read))),
                ("backlog", Value::Int(16)),
            ]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), i64::from(libc::ENOTSOCK));
}

#[test]
fn shutdown_on_a_pipe_reports_enotsock() {
    init_logging();
    let pipe = Pipe::new();
    let result = multi_homed()
        .dispatch(
            "shutdown",
            &args(vec![
                ("fd", Value::Int(i64::from(pipe.write))),
                ("how", Value::Int(i64::from(libc::SHUT_WR))),
            ]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), i64::from(libc::ENOTSOCK));
}

#[test]
fn create_socket_reports_errno_or_a_descriptor() {
    init_logging();
    // SCTP support depends on the kernel; both outcomes are legitimate,
    // but the result shape is fixed either way
    let result = multi_homed()
        .dispatch("create_socket", &args(vec![]))
        .unwrap();
    match errno_of(&result) {
        0 => match result.get("fd") {
            Some(Value::Int(fd)) => close_raw(*fd as RawFd),
            other => panic!("success without fd: {other:?}"),
        },
        _ => assert_eq!(result.as_object().unwrap().len(), 1),
    }
}

#[test]
fn bind_then_getsockname_round_trips_the_address() {
    init_logging();
    let dispatcher = single_homed();
    let fd = nonblocking_tcp_socket();

    let result = dispatcher
        .dispatch(
            "bind_ipv4",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("sockaddr", Value::Bytes(loopback_record(0))),
            ]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), 0);

    let name = Buffer::zeroed(16);
    let result = dispatcher
        .dispatch(
            "getsockname",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("sockaddr", Value::Bytes(name.clone())),
            ]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), 0);
    let bytes = name.to_vec();
    assert_eq!(
        u16::from_ne_bytes([bytes[0], bytes[1]]),
        libc::AF_INET as u16
    );
    let port = u16::from_be_bytes([bytes[2], bytes[3]]);
    assert_ne!(port, 0, "kernel must have assigned an ephemeral port");
    assert_eq!(&bytes[4..8], &[127, 0, 0, 1]);

    close_raw(fd);
}

#[test]
fn accept_without_a_pending_connection_reports_eagain() {
    init_logging();
    let dispatcher = single_homed();
    let fd = nonblocking_tcp_socket();
    dispatcher
        .dispatch(
            "bind_ipv4",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("sockaddr", Value::Bytes(loopback_record(0))),
            ]),
        )
        .unwrap();
    let result = dispatcher
        .dispatch(
            "listen",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("backlog", Value::Int(1)),
            ]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), 0);

    let result = dispatcher
        .dispatch(
            "accept",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("sockaddr", Value::Bytes(Buffer::zeroed(16))),
            ]),
        )
        .unwrap();
    let errno = errno_of(&result);
    assert!(
        errno == i64::from(libc::EAGAIN) || errno == i64::from(libc::EWOULDBLOCK),
        "unexpected errno {errno}"
    );

    close_raw(fd);
}

#[test]
fn linger_and_socket_error_on_a_tcp_socket() {
    init_logging();
    let dispatcher = multi_homed();
    let fd = nonblocking_tcp_socket();

    let result = dispatcher
        .dispatch(
            "setsockopt_linger",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("onoff", Value::Int(1)),
                ("linger", Value::Int(5)),
            ]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), 0);

    let result = dispatcher
        .dispatch(
            "get_socket_error",
            &args(vec![("fd", Value::Int(i64::from(fd)))]),
        )
        .unwrap();
    assert_eq!(errno_of(&result), 0);
    assert_eq!(result.get("socketError"), Some(&Value::Int(0)));

    close_raw(fd);
}

#[test]
fn sctp_options_on_a_tcp_socket_report_an_errno() {
    init_logging();
    let dispatcher = multi_homed();
    let fd = nonblocking_tcp_socket();
    // TCP rejects SCTP-level options; the failure must come back through
    // the errno field, not as an error or a panic
    let result = dispatcher
        .dispatch(
            "setsockopt_nodelay",
            &args(vec![
                ("fd", Value::Int(i64::from(fd))),
                ("value", Value::Int(1)),
            ]),
        )
        .unwrap();
    assert_ne!(errno_of(&result), 0);
    close_raw(fd);
}

#[test]
fn create_poller_returns_a_live_poller() {
    init_logging();
    let reactor = Reactor::new().unwrap();
    let dispatcher = Dispatcher::multi_homed(std::rc::Rc::clone(&reactor));
    let pipe = Pipe::new();
    let callback: sctp_native::ReadinessCallback = std::rc::Rc::new(|_| {});
    let result = dispatcher
        .dispatch(
            "create_poller",
            &args(vec![
                ("fd", Value::Int(i64::from(pipe.read))),
                ("callback", Value::Callback(callback)),
            ]),
        )
        .unwrap();
    let Value::Poller(poller) = result else {
        panic!("create_poller must return a poller");
    };
    assert!(poller.is_active());
    assert_eq!(reactor.handle_count(), 1);
    poller.close().unwrap();
    reactor.turn(Some(std::time::Duration::ZERO)).unwrap();
    drop(poller);
    assert_eq!(reactor.handle_count(), 0);
}
