//! JOIN, PART, KICK, TOPIC, INVITE, LIST, MODE, and operator succession
//! (spec.md §4.5, §4.6).
//!
//! Grounded on
//! `examples/manuelpont94-irc/crates/irc_server/src/handlers/channels.rs`
//! and `channel_ops.rs` (membership/mode mutation split from reply
//! formatting, one function per verb).

use crate::channel::{Channel, ChannelModes};
use crate::parsers;
use crate::replies::Replies;
use crate::server::Server;
use crate::types::ConnId;

pub fn join(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let mut parts = args.split_whitespace();
    let Some(raw_name) = parts.next() else {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::need_more_params("JOIN"));
        }
        return false;
    };
    let key_arg = parts.next();

    let body = raw_name.trim_start_matches('#');
    if !parsers::is_valid_channel_body(body) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::no_such_channel(raw_name));
        }
        return false;
    }
    let display = format!("#{body}");
    let key = Channel::lookup_key(&display);

    if let Some(channel) = srv.channels.get(&key) {
        if let Some(required) = &channel.modes.key {
            if key_arg != Some(required.as_str()) {
                if let Some(conn) = srv.conn(id) {
                    conn.send_line(&Replies::bad_channel_key(&display));
                }
                return false;
            }
        }
        if channel.modes.invite_only && !channel.is_invited(id) {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&Replies::invite_only_chan(&display));
            }
            return false;
        }
        if let Some(limit) = channel.modes.limit {
            if channel.members.len() >= limit {
                if let Some(conn) = srv.conn(id) {
                    conn.send_line(&Replies::channel_is_full(&display));
                }
                return false;
            }
        }
    }

    let is_new = !srv.channels.contains_key(&key);
    if is_new {
        let mut channel = Channel::new(display.clone());
        if let Some(k) = key_arg {
            channel.modes.key = Some(k.to_string());
        }
        srv.channels.insert(key.clone(), channel);
    }

    if let Some(channel) = srv.channels.get_mut(&key) {
        channel.add_member(id);
    }

    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
    let join_line = format!("{prefix}JOIN {display}");
    srv.broadcast_to_channel(&key, &join_line, None);

    // spec.md §4.5: a brand-new channel always gets 331 (no topic); an
    // existing one always gets 332 (topic), even if no one has ever set
    // a topic on it. This is distinct from a bare `TOPIC` query, which
    // always answers 331 with the current topic text (see `topic`).
    let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    if is_new {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::no_topic(&nick, &display));
        }
    } else {
        let current_topic = srv.channels.get(&key).map(|c| c.topic.clone()).unwrap_or_default();
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::topic(&nick, &display, &current_topic));
        }
    }
    send_names_and_modes(srv, id, &key, &display);
    false
}

pub fn part(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let name = args.split_whitespace().next().unwrap_or("").to_string();
    let key = Channel::lookup_key(&name);
    let channel = match srv.channel(&name) {
        Ok(c) => c,
        Err(err) => {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&err.into_reply(&name));
            }
            return false;
        }
    };
    let display = channel.name.clone();
    if !channel.is_member(id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::not_on_channel(&display));
        }
        return false;
    }

    promote_operator_successor(srv, &key, id);

    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
    let line = format!("{prefix}PART {display}");
    srv.broadcast_to_channel(&key, &line, None);

    if let Some(channel) = srv.channels.get_mut(&key) {
        channel.remove_member(id);
    }
    false
}

/// KICK check order follows the source exactly (see SPEC_FULL.md §C):
/// kicker membership, then kicker operator status, then target lookup,
/// then target membership. Does not run operator succession for the
/// kicked user — the kicker remains operator.
pub fn kick(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let mut parts = args.splitn(3, ' ');
    let channel_arg = parts.next().unwrap_or("").to_string();
    let target_nick = parts.next().unwrap_or("").to_string();
    let reason = parts.next().map(|r| r.trim_start_matches(':').to_string());

    let key = Channel::lookup_key(&channel_arg);
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

    if !channel.is_member(id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::not_on_channel(&display));
        }
        return false;
    }
    if !channel.is_operator(id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::chan_o_privs_needed(&display));
        }
        return false;
    }

    // Target-not-found replies with `no_such_channel` on the channel's
    // own display name rather than `no_such_nick`, matching the source.
    let Ok(target_id) = srv.find_by_nick_or_err(&target_nick) else {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::no_such_channel(&display));
        }
        return false;
    };

    let target_is_member = srv.channels.get(&key).is_some_and(|c| c.is_member(target_id));
    if !target_is_member {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::user_not_in_channel(&target_nick));
        }
        return false;
    }

    let reason = reason.unwrap_or_else(|| srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default());
    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
    let line = format!("{prefix}KICK {display} {target_nick} : {reason}");
    srv.broadcast_to_channel(&key, &line, None);

    if let Some(channel) = srv.channels.get_mut(&key) {
        channel.remove_member(target_id);
    }
    false
}

pub fn topic(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let mut parts = args.splitn(2, ' ');
    let channel_arg = parts.next().unwrap_or("").to_string();
    let topic_arg = parts.next().map(|s| s.trim_start_matches(':').to_string());

    let key = Channel::lookup_key(&channel_arg);
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
    if !channel.is_member(id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::not_on_channel(&display));
        }
        return false;
    }

    match topic_arg {
        // spec.md §4.5: a bare query always answers 331, carrying
        // whatever the current topic text is (unlike JOIN's 331/332
        // split, which reserves 331 for brand-new channels only).
        None => {
            let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
            let current_topic = channel.topic.clone();
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&Replies::topic_query(&nick, &display, &current_topic));
            }
        }
        Some(new_topic) => {
            let protected = channel.modes.topic_protected;
            let is_op = channel.is_operator(id);
            if protected && !is_op {
                if let Some(conn) = srv.conn(id) {
                    conn.send_line(&Replies::chan_o_privs_needed(&display));
                }
                return false;
            }
            if let Some(channel) = srv.channels.get_mut(&key) {
                channel.topic = new_topic.clone();
            }
            let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
            let line = format!("{prefix}TOPIC {display} : {new_topic}");
            srv.broadcast_to_channel(&key, &line, None);
        }
    }
    false
}

pub fn invite(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let mut parts = args.split_whitespace();
    let target_nick = parts.next().unwrap_or("").to_string();
    let channel_arg = parts.next().unwrap_or("").to_string();
    let key = Channel::lookup_key(&channel_arg);

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
    if !channel.is_member(id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::not_on_channel(&display));
        }
        return false;
    }

    let target_id = match srv.find_by_nick_or_err(&target_nick) {
        Ok(i) => i,
        Err(err) => {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&err.into_reply(&target_nick));
            }
            return false;
        }
    };

    if srv.channels.get(&key).is_some_and(|c| c.is_member(target_id)) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::user_on_channel(&target_nick));
        }
        return false;
    }

    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
    let line = format!("{prefix}INVITE {target_nick} {display}");
    if let Some(target_conn) = srv.conn(target_id) {
        target_conn.send_line(&line);
    }
    if let Some(channel) = srv.channels.get_mut(&key) {
        channel.invited.insert(target_id);
    }
    false
}

pub fn list(srv: &mut Server, id: ConnId, _args: &str) -> bool {
    let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::list_start(&nick));
    }

    let mut names: Vec<String> = srv.channels.keys().cloned().collect();
    names.sort();
    for key in names {
        let Some(channel) = srv.channels.get(&key) else { continue };
        if channel.modes.secret && !channel.is_member(id) {
            continue;
        }
        let (display, count, topic) = (channel.name.clone(), channel.members.len(), channel.topic.clone());
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::list(&nick, &display, count, &topic));
        }
    }
    if let Some(conn) = srv.conn(id) {
        conn.send_line(&Replies::list_end(&nick));
    }
    false
}

pub fn mode(srv: &mut Server, id: ConnId, args: &str) -> bool {
    let mut parts = args.splitn(3, ' ');
    let target = parts.next().unwrap_or("").to_string();
    let modechange = parts.next().map(|s| s.to_string());
    let modearg = parts.next().map(|s| s.to_string());

    let key = Channel::lookup_key(&target);
    let channel = match srv.channel(&target) {
        Ok(c) => c,
        Err(err) => {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&err.into_reply(&target));
            }
            return false;
        }
    };
    let display = channel.name.clone();

    let Some(modechange) = modechange else {
        let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
        let modestring = channel.mode_string();
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::channel_mode_is(&nick, &display, &modestring));
        }
        return false;
    };

    if !channel.is_member(id) || !channel.is_operator(id) {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::chan_o_privs_needed(&display));
        }
        return false;
    }

    let Some((add, letter)) = parsers::parse_mode_change(&modechange) else {
        if let Some(conn) = srv.conn(id) {
            conn.send_line(&Replies::unknown_mode("malformatted mode"));
        }
        return false;
    };

    apply_mode_change(srv, id, &key, &display, add, letter, modearg)
}

fn apply_mode_change(
    srv: &mut Server,
    id: ConnId,
    key: &str,
    display: &str,
    add: bool,
    letter: char,
    arg: Option<String>,
) -> bool {
    let prefix = srv.conn(id).map(|c| c.prefix()).unwrap_or_default();
    let sign = if add { '+' } else { '-' };

    match letter {
        'i' => {
            set_flag(srv, key, |m| &mut m.invite_only, add);
            broadcast_mode_change(srv, key, &prefix, display, sign, letter, None);
        }
        'm' => {
            set_flag(srv, key, |m| &mut m.moderated, add);
            broadcast_mode_change(srv, key, &prefix, display, sign, letter, None);
        }
        't' => {
            set_flag(srv, key, |m| &mut m.topic_protected, add);
            broadcast_mode_change(srv, key, &prefix, display, sign, letter, None);
        }
        's' => {
            set_flag(srv, key, |m| &mut m.secret, add);
            broadcast_mode_change(srv, key, &prefix, display, sign, letter, None);
        }
        'k' => {
            if add {
                let Some(k) = arg else {
                    if let Some(conn) = srv.conn(id) {
                        conn.send_line(&Replies::need_more_params("MODE"));
                    }
                    return false;
                };
                if let Some(ch) = srv.channels.get_mut(key) {
                    ch.modes.key = Some(k);
                }
            } else if let Some(ch) = srv.channels.get_mut(key) {
                ch.modes.key = None;
            }
            // spec.md §4.6: "For k, the broadcast must display ********
            // instead of the actual key."
            broadcast_mode_change(srv, key, &prefix, display, sign, letter, Some("********".to_string()));
        }
        'l' => {
            if add {
                let Some(n) = arg else {
                    if let Some(conn) = srv.conn(id) {
                        conn.send_line(&Replies::need_more_params("MODE"));
                    }
                    return false;
                };
                let Ok(limit) = n.parse::<usize>() else {
                    if let Some(conn) = srv.conn(id) {
                        conn.send_line(&Replies::unknown_mode("malformatted limit"));
                    }
                    return false;
                };
                if let Some(ch) = srv.channels.get_mut(key) {
                    ch.modes.limit = Some(limit);
                }
                broadcast_mode_change(srv, key, &prefix, display, sign, letter, Some(limit.to_string()));
            } else {
                if let Some(ch) = srv.channels.get_mut(key) {
                    ch.modes.limit = None;
                }
                broadcast_mode_change(srv, key, &prefix, display, sign, letter, Some("0".to_string()));
            }
        }
        'o' | 'v' => {
            let Some(target_nick) = arg else {
                if let Some(conn) = srv.conn(id) {
                    conn.send_line(&Replies::need_more_params("MODE"));
                }
                return false;
            };
            let target_id = match srv.find_by_nick_or_err(&target_nick) {
                Ok(i) => i,
                Err(err) => {
                    if let Some(conn) = srv.conn(id) {
                        conn.send_line(&err.into_reply(&target_nick));
                    }
                    return false;
                }
            };
            if let Some(ch) = srv.channels.get_mut(key) {
                let set = if letter == 'o' { &mut ch.operators } else { &mut ch.voiced };
                if add {
                    set.insert(target_id);
                } else {
                    set.remove(&target_id);
                }
            }
            broadcast_mode_change(srv, key, &prefix, display, sign, letter, Some(target_nick));
        }
        other => {
            if let Some(conn) = srv.conn(id) {
                conn.send_line(&Replies::unknown_mode(&other.to_string()));
            }
        }
    }
    false
}

fn set_flag(srv: &mut Server, key: &str, flag: impl FnOnce(&mut ChannelModes) -> &mut bool, add: bool) {
    if let Some(ch) = srv.channels.get_mut(key) {
        *flag(&mut ch.modes) = add;
    }
}

fn broadcast_mode_change(
    srv: &mut Server,
    key: &str,
    prefix: &str,
    display: &str,
    sign: char,
    letter: char,
    arg: Option<String>,
) {
    let line = match arg {
        Some(a) => format!("{prefix}MODE {display} {sign}{letter} {a}"),
        None => format!("{prefix}MODE {display} {sign}{letter}"),
    };
    srv.broadcast_to_channel(key, &line, None);
}

/// spec.md §4.5 "Operator succession": when the connection about to
/// leave (`leaving`) is the channel's sole operator, promote the first
/// other member in insertion order and broadcast the `MODE +o` line
/// before the caller removes `leaving` from the channel.
pub(crate) fn promote_operator_successor(srv: &mut Server, key: &str, leaving: ConnId) {
    let Some(promoted) = srv.channels.get(key).and_then(|c| c.sole_operator_successor(leaving)) else {
        return;
    };
    if let Some(ch) = srv.channels.get_mut(key) {
        ch.operators.insert(promoted);
    }
    let leaver_prefix = srv.conn(leaving).map(|c| c.prefix());
    let promoted_nick = srv.conn(promoted).map(|c| c.nickname.clone()).unwrap_or_default();
    let display = srv.channels.get(key).map(|c| c.name.clone()).unwrap_or_default();
    if let Some(prefix) = leaver_prefix {
        let line = format!("{prefix}MODE {display} +o {promoted_nick}");
        srv.broadcast_to_channel(key, &line, None);
    }
}

fn send_names_and_modes(srv: &mut Server, id: ConnId, key: &str, display: &str) {
    let Some(channel) = srv.channels.get(key) else { return };
    let nick = srv.conn(id).map(|c| c.nickname.clone()).unwrap_or_default();
    let names: Vec<String> = channel
        .members
        .iter()
        .filter_map(|m| srv.connections.get(m))
        .map(|c| {
            if channel.is_operator(c.id) {
                format!("@{}", c.nickname)
            } else if channel.is_voiced(c.id) {
                format!("+{}", c.nickname)
            } else {
                c.nickname.clone()
            }
        })
        .collect();
    let modestring = channel.mode_string();
    let Some(conn) = srv.conn(id) else { return };
    conn.send_line(&Replies::nam_reply(&nick, display, &names));
    conn.send_line(&Replies::channel_mode_is(&nick, display, &modestring));
}
