//! Command-line splitting, registration preconditions, and the static
//! verb→handler table (spec.md §4.3, §9 "Dynamic dispatch by verb").
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/handlers/request.rs`
//! and `commands.rs`, which split a raw line into verb/args and match on
//! the uppercased verb. spec.md asks for a *table* rather than a `match`
//! ("Represent this as a static table of pairs (verb, handler) consumed
//! by the dispatcher; no polymorphism is required"), which this module
//! does with a `&[(&str, Handler)]` slice.

use crate::handlers;
use crate::replies::Replies;
use crate::server::Server;
use crate::types::ConnId;

/// Every handler shares this shape. The return value is `true` only for
/// `QUIT`, signalling the reactor (`net.rs`) that it should now tear the
/// connection down; every other handler returns `false`.
pub type Handler = fn(&mut Server, ConnId, &str) -> bool;

const COMMAND_TABLE: &[(&str, Handler)] = &[
    ("PASS", handlers::registration::pass),
    ("NICK", handlers::registration::nick),
    ("USER", handlers::registration::user),
    ("PING", handlers::misc::ping),
    ("PONG", handlers::misc::ping),
    ("QUIT", handlers::misc::quit),
    ("JOIN", handlers::channels::join),
    ("PART", handlers::channels::part),
    ("KICK", handlers::channels::kick),
    ("TOPIC", handlers::channels::topic),
    ("INVITE", handlers::channels::invite),
    ("LIST", handlers::channels::list),
    ("MODE", handlers::channels::mode),
    ("PRIVMSG", handlers::messaging::privmsg),
    ("NOTICE", handlers::messaging::privmsg),
    ("WHO", handlers::query::who),
    ("WHOIS", handlers::query::whois),
    ("ISON", handlers::query::ison),
];

/// Splits a raw command line into `(UPPERCASED verb, rest-of-line with
/// leading whitespace trimmed)` (spec.md §4.3).
fn split_verb(line: &str) -> (String, String) {
    let trimmed = line.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(idx) => {
            let verb = trimmed[..idx].to_uppercase();
            let rest = trimmed[idx..].trim_start().to_string();
            (verb, rest)
        }
        None => (trimmed.to_uppercase(), String::new()),
    }
}

/// Dispatches one already-framed command line for connection `id`.
/// Returns `true` if the reactor should now close the connection.
pub fn dispatch(srv: &mut Server, id: ConnId, line: &str) -> bool {
    let (verb, args) = split_verb(line);

    let authenticated = srv.conn(id).map(|c| c.authenticated).unwrap_or(false);
    if verb != "PASS" && !authenticated {
        send_not_registered(srv, id);
        return false;
    }

    let registered = srv.conn(id).map(|c| c.registered).unwrap_or(false);
    if !matches!(verb.as_str(), "PASS" | "NICK" | "USER") && !registered {
        send_not_registered(srv, id);
        return false;
    }

    for (name, handler) in COMMAND_TABLE {
        if *name == verb {
            return handler(srv, id, &args);
        }
    }

    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::unknown_command(&verb));
    }
    false
}

fn send_not_registered(srv: &Server, id: ConnId) {
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::not_registered());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_verb_uppercases_and_trims() {
        assert_eq!(split_verb("nick Alice"), ("NICK".to_string(), "Alice".to_string()));
        assert_eq!(split_verb("  ping  :x"), ("PING".to_string(), ":x".to_string()));
        assert_eq!(split_verb("QUIT"), ("QUIT".to_string(), "".to_string()));
    }
}
