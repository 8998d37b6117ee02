//! Reply/broadcast line assembly (spec.md §4.8).
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/replies.rs`
//! (an `IrcReply<'a>` enum with a `.format()` method driven off
//! `constants.rs`). That file stops at a `todo!()` for most variants;
//! this one finishes every numeric spec.md names.
//!
//! spec.md's own literal wire examples (§8, scenario 2: `:ircserv 464
//! Invalid password`, `:ircserv 451 : You have not registered`; §4.5:
//! `:ircserv 404 #chan : Cannot send to channel`) are not uniform about
//! whether a ` : ` separator precedes the free-text tail: the two
//! "fixed text, no parameter" replies (462, 464) have no separator at
//! all, while every other error — even the zero-argument 451 — does.
//! This implementation follows that split exactly: `fixed_error` for
//! 462/464, `arg_error`/`bare_error` (always `: text`) for the rest.
//! Success numerics (001–005, 3xx) use the conventional single
//! `nick :text` form, since spec.md's scenario 1 only asserts they are
//! "addressed to alice", not a literal byte sequence.

use crate::constants::*;

fn fixed_error(code: u16, text: &str) -> String {
    format!(":{SERVER_NAME} {code:03} {text}")
}

fn bare_error(code: u16, text: &str) -> String {
    format!(":{SERVER_NAME} {code:03} : {text}")
}

fn arg_error(code: u16, arg: &str, text: &str) -> String {
    format!(":{SERVER_NAME} {code:03} {arg} : {text}")
}

fn success(code: u16, nick: &str, rest: &str) -> String {
    format!(":{SERVER_NAME} {code:03} {nick} {rest}")
}

pub struct Replies;

impl Replies {
    // ---- Welcome burst (§4.7) ----

    pub fn welcome(nick: &str, user: &str, host: &str) -> String {
        success(
            RPL_WELCOME,
            nick,
            &format!(":Welcome to the Internet Relay Network {nick}!{user}@{host}"),
        )
    }

    pub fn your_host(nick: &str) -> String {
        success(
            RPL_YOURHOST,
            nick,
            &format!(":Your host is {SERVER_NAME}, running version {SERVER_VERSION}"),
        )
    }

    pub fn created(nick: &str, date: &str) -> String {
        success(RPL_CREATED, nick, &format!(":This server was created {date}"))
    }

    pub fn my_info(nick: &str) -> String {
        success(
            RPL_MYINFO,
            nick,
            &format!("{SERVER_NAME} {SERVER_VERSION} o itmsklov"),
        )
    }

    pub fn isupport(nick: &str) -> String {
        success(
            RPL_ISUPPORT,
            nick,
            "CHANTYPES=# CHANMODES=k,l,imst PREFIX=(ov)@+ :are supported by this server",
        )
    }

    pub fn motd_start(nick: &str) -> String {
        success(RPL_MOTDSTART, nick, &format!(":- {SERVER_NAME} Message of the day -"))
    }

    pub fn motd(nick: &str, line: &str) -> String {
        success(RPL_MOTD, nick, &format!(":- {line}"))
    }

    pub fn end_of_motd(nick: &str) -> String {
        success(RPL_ENDOFMOTD, nick, ":End of /MOTD command")
    }

    // ---- Channel / query replies ----

    pub fn no_topic(nick: &str, channel: &str) -> String {
        success(RPL_NOTOPIC, nick, &format!("{channel} :No topic is set"))
    }

    pub fn topic(nick: &str, channel: &str, topic: &str) -> String {
        success(RPL_TOPIC, nick, &format!("{channel} :{topic}"))
    }

    /// A bare `TOPIC <channel>` query always answers `331`, but — unlike
    /// `no_topic` — carries whatever the current topic text actually is
    /// (spec.md §4.5: "With no topic argument, reply 331 … :
    /// <current-topic>").
    pub fn topic_query(nick: &str, channel: &str, topic: &str) -> String {
        success(RPL_NOTOPIC, nick, &format!("{channel} :{topic}"))
    }

    pub fn nam_reply(nick: &str, channel: &str, names: &[String]) -> String {
        success(RPL_NAMREPLY, nick, &format!("= {channel} :{}", names.join(" ")))
    }

    pub fn channel_mode_is(nick: &str, channel: &str, modestring: &str) -> String {
        success(RPL_CHANNELMODEIS, nick, &format!("{channel} {modestring}"))
    }

    pub fn list_start(nick: &str) -> String {
        success(RPL_LISTSTART, nick, "Channel :Users  Name")
    }

    pub fn list(nick: &str, channel: &str, count: usize, topic: &str) -> String {
        success(RPL_LIST, nick, &format!("{channel} {count} :{topic}"))
    }

    pub fn list_end(nick: &str) -> String {
        success(RPL_LISTEND, nick, ":End of /LIST")
    }

    pub fn who_reply(
        nick: &str,
        channel: &str,
        user: &str,
        host: &str,
        target_nick: &str,
        is_operator: bool,
        realname: &str,
    ) -> String {
        let flags = if is_operator { "H@" } else { "H" };
        success(
            RPL_WHOREPLY,
            nick,
            &format!("{channel} {user} {host} * {target_nick} {flags} :0 {realname}"),
        )
    }

    pub fn end_of_who(nick: &str, channel: &str) -> String {
        success(RPL_ENDOFWHO, nick, &format!("{channel} :End of WHO list"))
    }

    pub fn whois_user(nick: &str, target: &str, user: &str, host: &str, realname: &str) -> String {
        success(
            RPL_WHOISUSER,
            nick,
            &format!("{target} {user} {host} * :{realname}"),
        )
    }

    pub fn ison(nick: &str, found: &[String]) -> String {
        success(RPL_ISON, nick, &format!(":{}", found.join(" ")))
    }

    // ---- Errors (§7) ----

    pub fn no_such_nick(target: &str) -> String {
        arg_error(ERR_NOSUCHNICK, target, "No such nick/channel")
    }

    pub fn no_such_channel(channel: &str) -> String {
        arg_error(ERR_NOSUCHCHANNEL, channel, "No such channel")
    }

    pub fn cannot_send_to_chan(channel: &str) -> String {
        arg_error(ERR_CANNOTSENDTOCHAN, channel, "Cannot send to channel")
    }

    pub fn no_recipient() -> String {
        bare_error(ERR_NORECIPIENT, "No recipient given")
    }

    pub fn no_text_to_send() -> String {
        bare_error(ERR_NOTEXTTOSEND, "No text to send")
    }

    pub fn unknown_command(verb: &str) -> String {
        arg_error(ERR_UNKNOWNCOMMAND, verb, "Unknown command")
    }

    pub fn no_nickname_given() -> String {
        bare_error(ERR_NONICKNAMEGIVEN, "No nickname given")
    }

    pub fn erroneous_nickname(nickname: &str) -> String {
        arg_error(ERR_ERRONEUSNICKNAME, nickname, "Erroneous nickname")
    }

    pub fn erroneous_username(username: &str) -> String {
        arg_error(ERR_ERRONEUSNICKNAME, username, "Erroneous username")
    }

    pub fn nickname_in_use(nickname: &str) -> String {
        arg_error(ERR_NICKNAMEINUSE, nickname, "Nickname is already in use")
    }

    pub fn user_not_in_channel(target: &str) -> String {
        arg_error(ERR_USERNOTINCHANNEL, target, "They aren't on that channel")
    }

    pub fn not_on_channel(channel: &str) -> String {
        arg_error(ERR_NOTONCHANNEL, channel, "You're not on that channel")
    }

    pub fn user_on_channel(target: &str) -> String {
        arg_error(ERR_USERONCHANNEL, target, "is already on channel")
    }

    pub fn not_registered() -> String {
        bare_error(ERR_NOTREGISTERED, "You have not registered")
    }

    pub fn need_more_params(command: &str) -> String {
        arg_error(ERR_NEEDMOREPARAMS, command, "Not enough parameters")
    }

    pub fn already_registered() -> String {
        fixed_error(ERR_ALREADYREGISTRED, "You may not reregister")
    }

    pub fn passwd_mismatch() -> String {
        fixed_error(ERR_PASSWDMISMATCH, "Invalid password")
    }

    pub fn channel_is_full(channel: &str) -> String {
        arg_error(ERR_CHANNELISFULL, channel, "Cannot join channel (+l)")
    }

    pub fn unknown_mode(what: &str) -> String {
        arg_error(ERR_UNKNOWNMODE, what, "is unknown mode char to me")
    }

    pub fn invite_only_chan(channel: &str) -> String {
        arg_error(ERR_INVITEONLYCHAN, channel, "Cannot join channel (+i)")
    }

    pub fn bad_channel_key(channel: &str) -> String {
        arg_error(ERR_BADCHANNELKEY, channel, "Cannot join channel (+k)")
    }

    pub fn chan_o_privs_needed(channel: &str) -> String {
        arg_error(ERR_CHANOPRIVSNEEDED, channel, "You're not channel operator")
    }

    pub fn erroneous_realname(realname: &str) -> String {
        arg_error(ERR_ERRONEUSREALNAME, realname, "Invalid realname")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_errors_have_no_colon_separator() {
        assert_eq!(Replies::passwd_mismatch(), ":ircserv 464 Invalid password");
        assert_eq!(Replies::already_registered(), ":ircserv 462 You may not reregister");
    }

    #[test]
    fn bare_error_has_colon_but_no_argument() {
        assert_eq!(Replies::not_registered(), ":ircserv 451 : You have not registered");
    }

    #[test]
    fn arg_error_matches_spec_literal_example() {
        assert_eq!(
            Replies::cannot_send_to_chan("#chan"),
            ":ircserv 404 #chan : Cannot send to channel"
        );
        assert_eq!(
            Replies::erroneous_nickname("1bad"),
            ":ircserv 432 1bad : Erroneous nickname"
        );
    }
}
