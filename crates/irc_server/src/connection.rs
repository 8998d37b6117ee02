//! The Connection record (spec.md §3).
//!
//! Grounded on `examples/original_source/include/Client.hpp`'s `Client`
//! (one socket, one inbound/outbound buffer pair per connection) and on
//! the teacher's `Client`/`UserState` structs
//! (`examples/manuelpont94-irc/crates/irc_server/src/{users,user_state}.rs`),
//! which hold the same nick/user/registered fields but behind
//! `tokio::sync::RwLock` for concurrent per-connection access from
//! multiple tasks. spec.md §4.1/§5 mandate a single-threaded reactor
//! instead, so this struct owns its socket directly and keeps its
//! outbound bytes in an explicit buffer with a send offset — the
//! reactor (`net.rs`) is the only place either is advanced.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::os::fd::{AsRawFd, RawFd};

use crate::framer::Framer;
use crate::types::ConnId;

#[derive(Debug)]
pub struct Connection {
    pub id: ConnId,
    /// Peer address, presented as a dotted IPv4 literal (spec.md §3).
    pub host: String,
    pub nickname: String,
    pub username: String,
    pub realname: String,
    pub authenticated: bool,
    pub registered: bool,
    stream: TcpStream,
    framer: RefCell<Framer>,
    /// Outbound byte buffer with a send offset (spec.md §3). Only
    /// appended to, by `send_line`, or advanced, by `write_ready` once the
    /// kernel accepts bytes — never rewritten any other way.
    outbound: RefCell<Vec<u8>>,
    send_offset: RefCell<usize>,
}

impl Connection {
    pub fn new(id: ConnId, host: String, stream: TcpStream) -> Self {
        Connection {
            id,
            host,
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            authenticated: false,
            registered: false,
            stream,
            framer: RefCell::new(Framer::new()),
            outbound: RefCell::new(Vec::new()),
            send_offset: RefCell::new(0),
        }
    }

    /// `registered ⇒ authenticated ∧ nickname≠"" ∧ username≠""`
    /// (spec.md §3 invariant).
    pub fn ready_to_register(&self) -> bool {
        self.authenticated && !self.nickname.is_empty() && !self.username.is_empty()
    }

    /// The client prefix used on broadcasts this connection originates
    /// (spec.md §4.8): `:<nick>!<user>@<host> `.
    pub fn prefix(&self) -> String {
        format!(":{}!{}@{} ", self.nickname, self.username, self.host)
    }

    /// Appends a raw line plus trailing CR-LF onto this connection's
    /// outbound buffer (spec.md §3: "outbound byte buffer with a send
    /// offset"). Does not touch the socket — the reactor's write path
    /// (`write_ready`) is the only thing that ever drains it.
    pub fn send_line(&self, line: &str) {
        let mut buf = self.outbound.borrow_mut();
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    /// Whether the reactor should arm `POLLOUT` for this connection
    /// (spec.md §4.1: writable-readiness is armed while the buffer is
    /// non-empty).
    pub(crate) fn has_pending_output(&self) -> bool {
        *self.send_offset.borrow() < self.outbound.borrow().len()
    }

    /// One `write(2)` against the outbound buffer's unsent tail. Advances
    /// the send offset by however many bytes the kernel accepted; once
    /// the buffer is fully drained it is cleared and the offset reset to
    /// zero, which is what lets `has_pending_output` report `false` again
    /// and the reactor clear writable-readiness (spec.md §4.1).
    pub(crate) fn write_ready(&self) -> std::io::Result<()> {
        let mut outbound = self.outbound.borrow_mut();
        let mut offset = self.send_offset.borrow_mut();
        if *offset >= outbound.len() {
            return Ok(());
        }
        let n = (&self.stream).write(&outbound[*offset..])?;
        *offset += n;
        if *offset >= outbound.len() {
            outbound.clear();
            *offset = 0;
        }
        Ok(())
    }

    /// One `read(2)` into a fixed-size scratch buffer, fed straight into
    /// the connection's line framer. Returns the number of bytes read (0
    /// means orderly close).
    pub(crate) fn read_ready(&self) -> std::io::Result<usize> {
        let mut scratch = [0u8; 4096];
        let n = (&self.stream).read(&mut scratch)?;
        if n > 0 {
            self.framer.borrow_mut().feed(&scratch[..n]);
        }
        Ok(n)
    }

    /// Drains every complete CR-LF-terminated line the framer has
    /// buffered since the last call (spec.md §4.2).
    pub(crate) fn extract_lines(&self) -> Vec<String> {
        self.framer.borrow_mut().extract_lines()
    }
}

impl AsRawFd for Connection {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

#[cfg(test)]
/// A real connected loopback socket for test fixtures. The handshake
/// completes before `connect` returns, so the listener can be dropped
/// immediately — tests only ever inspect `send_line`'s buffered output,
/// never perform real reads or writes against the peer.
pub(crate) fn test_stream() -> TcpStream {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    TcpStream::connect(addr).unwrap()
}

#[cfg(test)]
impl Connection {
    /// Drains the outbound buffer into the CR-LF-terminated lines queued
    /// on it, for test assertions. Bypasses `write_ready`'s send-offset
    /// bookkeeping entirely since no real write has happened.
    pub(crate) fn take_outbound_lines(&self) -> Vec<String> {
        let mut buf = self.outbound.borrow_mut();
        let text = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        *self.send_offset.borrow_mut() = 0;
        text.lines().map(|l| format!("{l}\r\n")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: ConnId) -> Connection {
        Connection::new(id, "127.0.0.1".to_string(), test_stream())
    }

    #[test]
    fn not_ready_until_authenticated_nick_and_user_set() {
        let mut c = conn(1);
        assert!(!c.ready_to_register());
        c.authenticated = true;
        assert!(!c.ready_to_register());
        c.nickname = "alice".to_string();
        assert!(!c.ready_to_register());
        c.username = "alice".to_string();
        assert!(c.ready_to_register());
    }

    #[test]
    fn prefix_format() {
        let mut c = conn(1);
        c.nickname = "alice".to_string();
        c.username = "alice".to_string();
        c.host = "10.0.0.1".to_string();
        assert_eq!(c.prefix(), ":alice!alice@10.0.0.1 ");
    }

    #[test]
    fn send_line_appends_crlf_to_outbound_buffer() {
        let c = conn(1);
        assert!(!c.has_pending_output());
        c.send_line("hello");
        assert!(c.has_pending_output());
        assert_eq!(c.take_outbound_lines(), vec!["hello\r\n".to_string()]);
        assert!(!c.has_pending_output());
    }
}
