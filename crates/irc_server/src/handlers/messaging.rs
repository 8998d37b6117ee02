//! PRIVMSG and NOTICE (spec.md §4.5 — the two share one handler, NOTICE
//! aliasing PRIVMSG in the dispatch table).
//!
//! Grounded on
//! `examples/manuelpont94-irc/crates/irc_server/src/handlers/messages.rs`
//! and `ops/message.rs` (channel-vs-nick target branch, membership and
//! moderation checks ahead of delivery).

use crate::channel::Channel;
use crate::replies::Replies;
use crate::server::Server;
use crate::types::ConnId;

pub fn privmsg(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let mut parts = args.splitn(2, ' ');
    let target = parts.next().unwrap_or("").to_string();
    if target.is_empty() {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::no_recipient());
        }
        return false;
    }

    let message = parts
        .next()
        .map(|s| s.trim_start_matches(':').to_string())
        .filter(|m| !m.is_empty());
    let Some(message) = message else {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::no_text_to_send());
        }
        return false;
    };

    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();

    if target.starts_with('#') {
        let key = Channel::lookup_key(&target);
        // spec.md §4.5/§7: a missing channel is a lookup failure, but
        // replied as 401 (no_such_nick) rather than `LookupError`'s usual
        // 403, since the client sees a channel target the same as a nick
        // target when it can't find anything by that name at all; not
        // being a member, or being silenced by +m, is 404.
        let channel = match srv.channel(&target) {
            Ok(c) => c,
            Err(_) => {
                if let Some(conn) = srv.conn(id) {
                    conn.send_line(&Replies::no_such_nick(&target));
                }
                return false;
            }
        };
        let blocked = !channel.is_member(id)
            || (channel.modes.moderated && !channel.is_operator(id) && !channel.is_voiced(id));
        if blocked {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&Replies::cannot_send_to_chan(&target));
            }
            return false;
        }
        let line = format!("{prefix}PRIVMSG {target} :{message}");
        srv.broadcast_to_channel(&key, &line, Some(id));
    } else {
        let target_id = match srv.find_by_nick_or_err(&target) {
            Ok(i) => i,
            Err(err) => {
                if let Some(conn) = srv.conn(id) {
                    conn.send_line(&err.into_reply(&target));
                }
                return false;
            }
        };
        let line = format!("{prefix}PRIVMSG {target} :{message}");
        if let Some(conn) = srv.conn(target_id) {
            conn.send_line(&line);
        }
    }
    false
}
