//! Process entry point: CLI parsing, SIGPIPE masking, logger init, socket
//! setup, handoff to the reactor (spec.md §4.1, §6, §7).
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/bin/irc_server.rs`
//! for the `flexi_logger` init shape; the socket setup and exit-code
//! contract come from spec.md §6 directly, since the reference binary
//! just calls `TcpListener::bind` without the explicit
//! `SO_REUSEADDR`/backlog/exit-code requirements this spec names. `main`
//! itself runs synchronously and hands the listener straight to
//! `net::run` on the calling thread — spec.md §4.1/§5's single-threaded
//! reactor has no runtime of its own to start.

use std::net::{Ipv4Addr, SocketAddrV4};

use clap::Parser;
use flexi_logger::{Duplicate, Logger};
use log::info;
use socket2::{Domain, Socket, Type};

use irc_server::config::{Args, ServerOverlay};
use irc_server::errors::StartupError;
use irc_server::net;
use irc_server::server::Server;

/// spec.md §6 "Signal policy": SIGPIPE must be ignored before the
/// reactor starts, otherwise a write to a peer that has already closed
/// its socket would terminate the process.
fn mask_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

/// IPv4 stream socket, bound to all interfaces, `SO_REUSEADDR`,
/// non-blocking, listen backlog at system maximum (spec.md §6 "Socket").
fn bind_listener(port: u16) -> Result<std::net::TcpListener, StartupError> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None).map_err(StartupError::Socket)?;
    socket.set_reuse_address(true).map_err(StartupError::Socket)?;
    socket.set_nonblocking(true).map_err(StartupError::Socket)?;
    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    socket.bind(&addr.into()).map_err(StartupError::Bind)?;
    socket.listen(i32::MAX).map_err(StartupError::Bind)?;
    Ok(socket.into())
}

fn run(args: Args) -> Result<(), StartupError> {
    let port = args.parsed_port()?;
    let password = args.validated_password()?;

    let motd = match &args.config {
        Some(path) => ServerOverlay::load(path)?.motd,
        None => Vec::new(),
    };

    mask_sigpipe();

    let listener = bind_listener(port)?;

    info!("ircserv listening on port {port}");
    let server = Server::with_motd(password, motd);
    net::run(listener, server);
    Ok(())
}

fn main() {
    Logger::try_with_str("info")
        .and_then(|logger| logger.log_to_stderr().duplicate_to_stderr(Duplicate::All).start())
        .ok();

    // spec.md §6: exit 1 on argument-count mismatch with a usage line,
    // distinct from every other startup failure below (exit 0). clap's
    // default `Parser::parse` prints its own usage and exits with status
    // 2, so `try_parse_from` is called directly and the `Err` handled here.
    let args = match Args::try_parse_from(std::env::args()) {
        Ok(args) => args,
        Err(_) => {
            eprintln!("usage: ircserv <port> <password>");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("{e}");
        std::process::exit(0);
    }
}
