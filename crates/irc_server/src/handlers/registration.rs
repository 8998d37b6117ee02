//! PASS, NICK, USER and the welcome burst (spec.md §4.4, §4.7).
//!
//! Grounded on
//! `examples/manuelpont94-irc/crates/irc_server/src/handlers/registration.rs`
//! and `pre_registration.rs`/`registration.rs` (PASS/NICK/USER validated
//! against the same character classes, welcome burst assembled as a
//! fixed sequence of numerics).

use crate::parsers;
use crate::replies::Replies;
use crate::server::Server;
use crate::types::ConnId;

use super::broadcast_to_own_channels;

pub fn pass(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let supplied = args.trim().to_string();

    let already_authenticated = srv.conn(id).map(|c| c.authenticated).unwrap_or(true);
    if already_authenticated {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::already_registered());
        }
        return false;
    }

    if supplied != srv.password {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::passwd_mismatch());
        }
        return false;
    }

    if let Some(conn) = srv.conn_mut(id) {
        conn.authenticated = true;
    }
    false
}

pub fn nick(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let nickname = args.split_whitespace().next().unwrap_or("").to_string();

    if !parsers::is_valid_nickname(&nickname) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::erroneous_nickname(&nickname));
        }
        return false;
    }

    if srv.find_by_nick(&nickname).is_some_and(|other| other != id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::nickname_in_use(&nickname));
        }
        return false;
    }

    let username_set = srv.conn(id).map(|c| !c.username.is_empty()).unwrap_or(false);
    let already_registered = srv.conn(id).map(|c| c.registered).unwrap_or(false);
    let old_prefix = srv.conn(id).map(|c| c.prefix());

    // spec.md §4.4: if username is already set and the connection is not
    // yet registered, the welcome burst runs before the new nickname is
    // committed. `welcome_burst` takes the nick it should address replies
    // to explicitly rather than reading `conn.nickname`, so this ordering
    // doesn't leave the burst addressed to an empty nick.
    if username_set && !already_registered {
        welcome_burst(srv, id, &nickname);
    }

    if let Some(conn) = srv.conn_mut(id) {
        conn.nickname = nickname.clone();
    }

    if let Some(prefix) = old_prefix {
        let line = format!("{prefix}NICK {nickname}");
        broadcast_to_own_channels(srv, id, &line, None);
    }
    false
}

pub fn user(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let (username, realname) = parsers::parse_user_args(args);

    if !parsers::is_valid_username(&username) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::erroneous_username(&username));
        }
        return false;
    }

    if !parsers::is_valid_realname(&realname) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::erroneous_realname(&realname));
        }
        return false;
    }

    if let Some(conn) = srv.conn_mut(id) {
        conn.username = username;
        conn.realname = realname;
    }

    let nickname = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    let already_registered = srv.conn(id).map(|c| c.registered).unwrap_or(false);
    if !nickname.is_empty() && !already_registered {
        welcome_burst(srv, id, &nickname);
    }

    if let Some(prefix) = srv.conn(id).map(|c| c.prefix()) {
        let line = format!("{prefix}USER {args}");
        broadcast_to_own_channels(srv, id, &line, None);
    }
    false
}

/// Sends the fixed welcome-burst sequence (spec.md §4.7: `001`..`005`,
/// `375`, one `372` per configured MOTD line, `376`) and marks the
/// connection registered. Called exactly once, by whichever of NICK/USER
/// completes registration.
fn welcome_burst(srv: &mut Server, id: ConnId, nick: &str) {
    let user = srv.conn(id).map(|c| c.username.clone()).unwrap_or_default();
    let host = srv.conn(id).map(|c| c.host.clone()).unwrap_or_default();
    let motd = srv.motd.clone();

    let Some(conn) = srv.conn(id) else { return };
    conn.send_line(&Replies::welcome(nick, &user, &host));
    conn.send_line(&Replies::your_host(nick));
    conn.send_line(&Replies::created(nick, "at startup"));
    conn.send_line(&Replies::my_info(nick));
    conn.send_line(&Replies::isupport(nick));
    conn.send_line(&Replies::motd_start(nick));
    for line in &motd {
        conn.send_line(&Replies::motd(nick, line));
    }
    conn.send_line(&Replies::end_of_motd(nick));

    if let Some(conn) = srv.conn_mut(id) {
        conn.registered = true;
    }
}
