//! Global server state (spec.md §3 "Global server state", §9 "Global
//! mutable state").
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/state.rs`
//! and `server_state.rs` (a struct of `DashMap`s passed by reference into
//! handlers). This crate keeps the "pass it by reference into handlers,
//! no ambient singleton" shape but replaces the per-map `DashMap`
//! concurrency with a single outer lock (see `net.rs`), because spec.md
//! §4.1 requires that "no command handler may execute concurrently with
//! another" — including handlers like JOIN that must mutate the
//! connection table and the channel table as one atomic step, which two
//! independently-locked `DashMap`s cannot guarantee.

use std::collections::HashMap;

use crate::channel::Channel;
use crate::connection::Connection;
use crate::errors::LookupError;
use crate::types::ConnId;

fn default_motd() -> Vec<String> {
    vec![
        "Welcome to this server.".to_string(),
        "Be excellent to each other.".to_string(),
        "Have fun.".to_string(),
    ]
}

pub struct Server {
    pub connections: HashMap<ConnId, Connection>,
    /// Keyed by `Channel::lookup_key` (lowercased, no leading `#`).
    pub channels: HashMap<String, Channel>,
    pub password: String,
    /// Text of the `372` lines sent during the welcome burst (§4.7).
    /// Configurable via the optional `--config` overlay (SPEC_FULL.md §B);
    /// the `:ircserv` prefix and numeric codes themselves are not.
    pub motd: Vec<String>,
    next_id: ConnId,
}

impl Server {
    pub fn new(password: String) -> Self {
        Server {
            connections: HashMap::new(),
            channels: HashMap::new(),
            password,
            motd: default_motd(),
            next_id: 1,
        }
    }

    pub fn with_motd(password: String, motd: Vec<String>) -> Self {
        let mut srv = Server::new(password);
        if !motd.is_empty() {
            srv.motd = motd;
        }
        srv
    }

    /// Allocates the next connection handle. Monotonic and never reused
    /// (see `types::ConnId`), unlike the fd numbers this stands in for.
    pub fn next_conn_id(&mut self) -> ConnId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn conn(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn conn_mut(&mut self, id: ConnId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    /// Nickname lookup is case-sensitive exact-string equality (spec.md
    /// §3, §9 "Nickname comparison is case-sensitive in the source").
    pub fn find_by_nick(&self, nick: &str) -> Option<ConnId> {
        self.connections
            .iter()
            .find(|(_, c)| c.nickname == nick)
            .map(|(id, _)| *id)
    }

    pub fn nick_taken(&self, nick: &str) -> bool {
        self.find_by_nick(nick).is_some()
    }

    /// Same lookup as `find_by_nick`, but as the explicit `Result` spec.md
    /// §9's "exception-driven lookup ⇒ explicit optional/result return at
    /// the lookup boundary" asks for, so handlers can translate the
    /// failure into a numeric reply the same way they do for
    /// `channel`/`channel_mut`.
    pub fn find_by_nick_or_err(&self, nick: &str) -> Result<ConnId, LookupError> {
        self.find_by_nick(nick).ok_or(LookupError::NoSuchNick)
    }

    pub fn channel(&self, display_name: &str) -> Result<&Channel, LookupError> {
        let key = Channel::lookup_key(display_name);
        self.channels.get(&key).ok_or(LookupError::NoSuchChannel)
    }

    pub fn channel_mut(&mut self, display_name: &str) -> Result<&mut Channel, LookupError> {
        let key = Channel::lookup_key(display_name);
        self.channels.get_mut(&key).ok_or(LookupError::NoSuchChannel)
    }

    pub fn channel_by_key(&self, key: &str) -> Option<&Channel> {
        self.channels.get(key)
    }

    /// All channel keys the given connection currently belongs to.
    pub fn channels_of(&self, id: ConnId) -> Vec<String> {
        self.channels
            .iter()
            .filter(|(_, ch)| ch.is_member(id))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Delivers `line` to every current member of the channel keyed by
    /// `key`, in the channel's insertion order (spec.md §5 "A broadcast
    /// to a channel delivers to members in the channel's insertion
    /// order"), optionally skipping `exclude`.
    pub fn broadcast_to_channel(&self, key: &str, line: &str, exclude: Option<ConnId>) {
        let Some(channel) = self.channels.get(key) else {
            return;
        };
        for member in &channel.members {
            if Some(*member) != exclude {
                if let Some(conn) = self.connections.get(member) {
                    conn.send_line(line);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::test_stream;

    fn new_conn(srv: &mut Server, nick: &str) -> ConnId {
        let id = srv.next_conn_id();
        let mut c = Connection::new(id, "127.0.0.1".to_string(), test_stream());
        c.nickname = nick.to_string();
        srv.connections.insert(id, c);
        id
    }

    #[test]
    fn conn_ids_are_monotonic_and_not_reused() {
        let mut srv = Server::new("password".to_string());
        assert_eq!(srv.next_conn_id(), 1);
        assert_eq!(srv.next_conn_id(), 2);
        assert_eq!(srv.next_conn_id(), 3);
    }

    #[test]
    fn find_by_nick_is_case_sensitive() {
        let mut srv = Server::new("password".to_string());
        new_conn(&mut srv, "Alice");
        assert!(srv.nick_taken("Alice"));
        assert!(!srv.nick_taken("alice"));
    }

    #[test]
    fn find_by_nick_or_err_reports_missing_nick() {
        let mut srv = Server::new("password".to_string());
        new_conn(&mut srv, "alice");
        assert!(srv.find_by_nick_or_err("alice").is_ok());
        assert_eq!(srv.find_by_nick_or_err("ghost"), Err(LookupError::NoSuchNick));
    }

    #[test]
    fn broadcast_skips_excluded_member_and_reaches_others() {
        let mut srv = Server::new("password".to_string());
        let a = new_conn(&mut srv, "alice");
        let b = new_conn(&mut srv, "bob");
        let mut ch = Channel::new("#chan".to_string());
        ch.add_member(a);
        ch.add_member(b);
        srv.channels.insert("chan".to_string(), ch);

        srv.broadcast_to_channel("chan", "hello", Some(a));
        assert!(srv.conn(a).unwrap().take_outbound_lines().is_empty());
        assert_eq!(srv.conn(b).unwrap().take_outbound_lines(), vec!["hello\r\n".to_string()]);
    }
}
