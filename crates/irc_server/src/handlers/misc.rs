//! PING/PONG and QUIT (spec.md §4.5, §4.3 "If QUIT reaches the handler
//! layer, it is invoked unconditionally and terminates the connection").
//!
//! Grounded on
//! `examples/manuelpont94-irc/crates/irc_server/src/handlers/miscellanneous.rs`
//! and `ops/miscellaneous.rs`.

use crate::constants::SERVER_NAME;
use crate::server::Server;
use crate::types::ConnId;

use super::channels::promote_operator_successor;

/// spec.md §4.3 lists `PONG` as an alias of `PING` in the dispatch
/// table; both run this handler.
pub fn ping(srv: &mut Server, id: ConnId, args: &str) -> bool {
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&format!(":{SERVER_NAME} PONG {args}"));
    }
    false
}

/// Broadcasts the QUIT line to every channel the connection belongs to
/// (sender excluded), runs operator succession and removes membership
/// on each, then signals the reactor to tear the connection down.
pub fn quit(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let reason = if args.is_empty() {
        "Client disconnected".to_string()
    } else {
        args.trim_start_matches(':').to_string()
    };
    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
    let line = format!("{prefix}QUIT : {reason}");

    let channel_keys = srv.channels_of(id);
    for key in &channel_keys {
        srv.broadcast_to_channel(key, &line, Some(id));
    }
    for key in &channel_keys {
        promote_operator_successor(srv, key, id);
        if let Some(channel) = srv.channels.get_mut(key) {
            channel.remove_member(id);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::test_stream;

    fn registered_conn(srv: &mut Server, nick: &str) -> ConnId {
        let id = srv.next_conn_id();
        let mut conn = crate::connection::Connection::new(id, "10.0.0.1".to_string(), test_stream());
        conn.nickname = nick.to_string();
        conn.username = nick.to_string();
        conn.authenticated = true;
        conn.registered = true;
        srv.connections.insert(id, conn);
        id
    }

    #[test]
    fn ping_replies_with_pong() {
        let mut srv = Server::new("password".to_string());
        let a = registered_conn(&mut srv, "alice");
        ping(&mut srv, a, "token123");
        let lines = srv.conn(a).unwrap().take_outbound_lines();
        assert_eq!(lines, vec![":ircserv PONG token123\r\n".to_string()]);
    }

    #[test]
    fn quit_signals_disconnect_and_clears_membership() {
        let mut srv = Server::new("password".to_string());
        let a = registered_conn(&mut srv, "alice");
        let b = registered_conn(&mut srv, "bob");
        super::super::channels::join(&mut srv, a, "#chan");
        super::super::channels::join(&mut srv, b, "#chan");
        srv.conn(b).unwrap().take_outbound_lines();

        let should_disconnect = quit(&mut srv, a, ":leaving now");
        assert!(should_disconnect);
        assert!(!srv.channel("#chan").unwrap().is_member(a));
        let lines = srv.conn(b).unwrap().take_outbound_lines();
        assert!(lines[0].starts_with(":alice!alice@10.0.0.1 QUIT : leaving now"));
    }
}
