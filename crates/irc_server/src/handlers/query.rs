//! WHO, WHOIS, ISON (spec.md §4.5).
//!
//! Grounded on
//! `examples/manuelpont94-irc/crates/irc_server/src/handlers/request.rs`
//! (per-connection query replies assembled from live state rather than a
//! cached snapshot, per SPEC_FULL.md §C).

use crate::replies::Replies;
use crate::server::Server;
use crate::types::ConnId;

pub fn who(srv: &mut Server, id: ConnId, args: &str) -> bool {
    // spec.md §9: prefer the trimmed first token over the raw argument
    // string for channel lookup.
    let channel_arg = args.split_whitespace().next().unwrap_or("").to_string();
    let channel = match srv.channel(&channel_arg) {
        Ok(c) => c,
        Err(err) => {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&err.into_reply(&channel_arg));
            }
            return false;
        }
    };
    let display = channel.name.clone();
    let rows: Vec<(String, String, String, bool, String)> = channel
        .members
        .iter()
        .filter_map(|m| srv.connections.get(m))
        .map(|c| {
            (
                c.nickname.clone(),
                c.username.clone(),
                c.host.clone(),
                channel.is_operator(c.id),
                c.realname.clone(),
            )
        })
        .collect();

    let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    for (member_nick, user, host, is_op, realname) in rows {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::who_reply(&nick, &display, &user, &host, &member_nick, is_op, &realname));
        }
    }
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::end_of_who(&nick, &display));
    }
    false
}

pub fn whois(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let target_nick = args.split_whitespace().next().unwrap_or("").to_string();
    let target_id = match srv.find_by_nick_or_err(&target_nick) {
        Ok(i) => i,
        Err(err) => {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&err.into_reply(&target_nick));
            }
            return false;
        }
    };
    let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    let (user, host, realname) = srv
        .conn(target_id)
        .map(|c| (c.username.clone(), c.host.clone(), c.realname.clone()))
        .unwrap_or_default();
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::whois_user(&nick, &target_nick, &user, &host, &realname));
    }
    false
}

/// spec.md §9: the source only ever echoes its first argument
/// repeatedly; this iterates every whitespace-separated token and
/// echoes back those that are currently online.
pub fn ison(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    let found: Vec<String> = args
        .split_whitespace()
        .filter(|candidate| srv.nick_taken(candidate))
        .map(|s| s.to_string())
        .collect();
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::ison(&nick, &found));
    }
    false
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
    fn ison_reports_only_online_nicks() {
        let mut srv = Server::new("password".to_string());
        let a = registered_conn(&mut srv, "alice");
        registered_conn(&mut srv, "bob");

        ison(&mut srv, a, "bob carol");
        let lines = srv.conn(a).unwrap().take_outbound_lines();
        assert_eq!(lines, vec![":ircserv 303 alice :bob\r\n".to_string()]);
    }

    #[test]
    fn whois_unknown_target_yields_401() {
        let mut srv = Server::new("password".to_string());
        let a = registered_conn(&mut srv, "alice");
        whois(&mut srv, a, "ghost");
        let lines = srv.conn(a).unwrap().take_outbound_lines();
        assert_eq!(lines, vec![":ircserv 401 ghost : No such nick/channel\r\n".to_string()]);
    }

    #[test]
    fn who_unknown_channel_yields_403() {
        let mut srv = Server::new("password".to_string());
        let a = registered_conn(&mut srv, "alice");
        who(&mut srv, a, "#nope");
        let lines = srv.conn(a).unwrap().take_outbound_lines();
        assert_eq!(lines, vec![":ircserv 403 #nope : No such channel\r\n".to_string()]);
    }
}
