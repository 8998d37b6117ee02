//! The I/O reactor (spec.md §4.1/§5).
//!
//! Grounded on `examples/original_source/src/server.cpp`'s `Server::run`
//! (a `std::vector<pollfd>` rebuilt every cycle, one blocking
//! `poll(..., -1)` call, then accept/read/write handled in turn — see
//! `server.cpp:93-113`). This is a direct Rust translation of that loop
//! via `libc::poll`, replacing an earlier tokio-task-per-connection draft
//! that ran under real OS-thread concurrency: spec.md §4.1/§5 call for
//! "a single-threaded event loop" where "a readiness poll is the only
//! blocking primitive" and "handlers run to completion with exclusive
//! access to all server state", which a shared-lock multi-thread runtime
//! does not give.

use std::io::ErrorKind;
use std::net::TcpListener;
use std::os::fd::AsRawFd;

use log::{debug, error, info};

use crate::connection::Connection;
use crate::dispatch;
use crate::server::Server;
use crate::types::ConnId;

/// Runs the reactor forever. `listener` must already be non-blocking
/// (`bin/irc_server.rs::bind_listener` arranges this). Never returns;
/// the process only stops by being killed, matching the reference's own
/// `while (true)` loop.
pub fn run(listener: TcpListener, mut server: Server) {
    loop {
        let ids: Vec<ConnId> = server.connections.keys().copied().collect();
        let mut pollfds: Vec<libc::pollfd> = Vec::with_capacity(ids.len() + 1);
        pollfds.push(libc::pollfd {
            fd: listener.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        });
        for id in &ids {
            if let Some(conn) = server.connections.get(id) {
                let mut events = libc::POLLIN;
                // spec.md §4.1: writable-readiness is armed only while
                // the connection's outbound buffer is non-empty.
                if conn.has_pending_output() {
                    events |= libc::POLLOUT;
                }
                pollfds.push(libc::pollfd { fd: conn.as_raw_fd(), events, revents: 0 });
            }
        }

        // spec.md §4.1/§5: "A readiness poll is the only blocking
        // primitive." Timeout -1 blocks until some fd is ready, exactly
        // like the reference's `poll(_pollfds.data(), _pollfds.size(), -1)`.
        let ready = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, -1) };
        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                continue;
            }
            error!("poll failed: {err}");
            continue;
        }

        if pollfds[0].revents & libc::POLLIN != 0 {
            accept_connections(&listener, &mut server);
        }

        for (i, id) in ids.iter().enumerate() {
            let revents = pollfds[i + 1].revents;
            if revents == 0 || !server.connections.contains_key(id) {
                continue;
            }
            if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
                disconnect(&mut server, *id);
                continue;
            }
            if revents & libc::POLLIN != 0 && handle_readable(&mut server, *id) {
                continue;
            }
            if revents & libc::POLLOUT != 0 && server.connections.contains_key(id) {
                handle_writable(&mut server, *id);
            }
        }
    }
}

/// Accepts every connection currently pending on the listener. Loops
/// until `accept` returns `WouldBlock`, since one readiness notification
/// can represent more than one queued connection.
fn accept_connections(listener: &TcpListener, server: &mut Server) {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nonblocking(true) {
                    error!("failed to configure accepted socket: {e}");
                    continue;
                }
                // spec.md §3/SPEC_FULL.md §C: the peer host string is the
                // dotted IPv4 literal from the accepted socket, no reverse
                // DNS lookup.
                let host = addr.ip().to_string();
                let id = server.next_conn_id();
                info!("accepted connection {id} from {host}");
                server.connections.insert(id, Connection::new(id, host, stream));
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) => {
                error!("accept failed: {e}");
                break;
            }
        }
    }
}

/// Reads once, frames, and dispatches every complete line now buffered
/// for this connection. Returns `true` if the connection no longer
/// exists afterward (QUIT, orderly close, or a read error), telling the
/// caller not to also check it for writable-readiness this cycle.
fn handle_readable(server: &mut Server, id: ConnId) -> bool {
    let read = match server.connections.get(&id) {
        Some(conn) => conn.read_ready(),
        None => return true,
    };
    match read {
        Ok(0) => {
            disconnect(server, id);
            true
        }
        Ok(_) => {
            let lines = server.connections.get(&id).map(|c| c.extract_lines()).unwrap_or_default();
            for line in lines {
                if dispatch::dispatch(server, id, &line) {
                    server.connections.remove(&id);
                    debug!("connection {id} closed (QUIT)");
                    return true;
                }
                if !server.connections.contains_key(&id) {
                    return true;
                }
            }
            false
        }
        Err(e) if e.kind() == ErrorKind::WouldBlock => false,
        Err(e) => {
            debug!("read error on connection {id}: {e}");
            disconnect(server, id);
            true
        }
    }
}

fn handle_writable(server: &mut Server, id: ConnId) {
    let Some(conn) = server.connections.get(&id) else { return };
    if let Err(e) = conn.write_ready() {
        if e.kind() != ErrorKind::WouldBlock {
            debug!("write error on connection {id}: {e}");
            disconnect(server, id);
        }
    }
}

/// spec.md §4.1: an orderly close, a hangup/error condition, and a read
/// or write failure all "trigger the same path": synthesize a
/// `QUIT :Client disconnected` so channel peers are notified, then drop
/// the connection.
fn disconnect(server: &mut Server, id: ConnId) {
    if server.connections.contains_key(&id) {
        dispatch::dispatch(server, id, "QUIT :Client disconnected");
    }
    server.connections.remove(&id);
    debug!("connection {id} closed");
}
