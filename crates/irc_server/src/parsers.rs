//! Character-class validators for the identifiers named in spec.md
//! §4.4–§4.6 (nicknames, usernames, realnames, channel names, mode
//! changes), plus the `USER` argument grammar.
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/parsers.rs`,
//! which validates RFC 2812 tokens with `nom` combinators
//! (`satisfy`/`take_while`/`verify`) and a `#[cfg(test)] mod tests` at the
//! bottom of the file. This crate's character classes are spec.md's own
//! (narrower than RFC 2812), so the grammar is rebuilt rather than reused,
//! but the combinator style is kept.

use nom::{
    IResult, Parser,
    character::complete::satisfy,
    combinator::{all_consuming, recognize},
};

fn is_nick_tail_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "[]\\`_^{|}-".contains(c)
}

fn is_nick_first_char(c: char) -> bool {
    is_nick_tail_char(c) && !c.is_ascii_digit() && c != '-'
}

/// Nickname: length 1–9, `[A-Za-z0-9\[\]\\\`_^{|}-]`, first char not a
/// digit and not `-` (spec.md §4.4).
pub fn is_valid_nickname(s: &str) -> bool {
    if s.is_empty() || s.len() > 9 {
        return false;
    }
    nickname_parser(s).is_ok_and(|(rem, _)| rem.is_empty())
}

fn nickname_parser(input: &str) -> IResult<&str, &str> {
    all_consuming(recognize((
        satisfy(is_nick_first_char),
        nom::multi::many0(satisfy(is_nick_tail_char)),
    )))
    .parse(input)
}

/// Username: length 1–12, alphanumeric only, first char not a digit
/// (spec.md §4.4).
pub fn is_valid_username(s: &str) -> bool {
    if s.is_empty() || s.len() > 12 {
        return false;
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    first.is_ascii_alphabetic() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_realname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "[]\\`_^{|}- ".contains(c)
}

/// Realname: may be empty; otherwise length <=50 and
/// `[A-Za-z0-9\[\]\\\`_^{|}- ]` (spec.md §4.4).
pub fn is_valid_realname(s: &str) -> bool {
    s.is_empty() || (s.len() <= 50 && s.chars().all(is_realname_char))
}

fn is_chan_body_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Channel name body (without the leading `#`): length 1–20,
/// `[A-Za-z0-9_]`, first char not a digit and not `_` (spec.md §4.5).
pub fn is_valid_channel_body(s: &str) -> bool {
    if s.is_empty() || s.len() > 20 {
        return false;
    }
    let first = s.chars().next().unwrap();
    if first.is_ascii_digit() || first == '_' {
        return false;
    }
    s.chars().all(is_chan_body_char)
}

/// `<username> 0 * :<realname>` (spec.md §4.4: "the two middle fields
/// are syntactically required but ignored"). Returns `(username,
/// realname)`, never failing — `examples/original_source/src/IRCLogic.cpp:99-121`
/// parses this with `ss >> username >> std::ws; getline(ss, skip, ':');
/// getline(ss, realname, '\0')`, and every `getline` degrades to an empty
/// result once the stream is already at EOF rather than raising an
/// error. So `USER alice` (no middle fields, no colon) and
/// `USER alice 0 *` (no colon) both yield `realname == ""` in the
/// original instead of failing, and this parser matches that: everything
/// up to the first whitespace is the username, everything after the
/// first `:` seen after that is the realname, and either piece is simply
/// empty if the input ends before it's reached. Character-class
/// validation of the extracted username/realname happens separately, in
/// `is_valid_username`/`is_valid_realname`.
pub fn parse_user_args(input: &str) -> (String, String) {
    let (username, rest) = match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim_start()),
        None => (input, ""),
    };
    let realname = match rest.find(':') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };
    (username.to_owned(), realname.to_owned())
}

/// A single `MODE` modechange token: an optional sign (`+` default) and
/// exactly one letter (spec.md §4.6).
pub fn parse_mode_change(input: &str) -> Option<(bool, char)> {
    let mut chars = input.chars();
    let (add, letter) = match chars.next()? {
        '+' => (true, chars.next()?),
        '-' => (false, chars.next()?),
        other => (true, other),
    };
    if chars.next().is_some() {
        return None; // more than one letter after the sign
    }
    Some((add, letter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_accepts_allowed_charset() {
        for n in ["a", "Wiz", "a1", "x-y", "t[est]", "h\\i", "j`k", "m^n", "a_b", "{c|d}"] {
            assert!(is_valid_nickname(n), "should accept {n}");
        }
    }

    #[test]
    fn nickname_rejects_bad_first_char_and_length() {
        assert!(!is_valid_nickname(""));
        assert!(!is_valid_nickname("1abc"));
        assert!(!is_valid_nickname("-abc"));
        assert!(!is_valid_nickname("toolongnick")); // 11 chars
    }

    #[test]
    fn nickname_length_boundary() {
        assert!(is_valid_nickname(&"a".repeat(9)));
        assert!(!is_valid_nickname(&"a".repeat(10)));
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("guest"));
        assert!(is_valid_username("a1"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("1abc"));
        assert!(!is_valid_username("bad-name"));
        assert!(!is_valid_username("thisusernameistoolong"));
    }

    #[test]
    fn realname_rules() {
        assert!(is_valid_realname(""));
        assert!(is_valid_realname("Alice A"));
        assert!(!is_valid_realname("bad;realname"));
        assert!(!is_valid_realname(&"x".repeat(51)));
    }

    #[test]
    fn channel_body_rules() {
        assert!(is_valid_channel_body("chan"));
        assert!(is_valid_channel_body("a"));
        assert!(!is_valid_channel_body(""));
        assert!(!is_valid_channel_body("1chan"));
        assert!(!is_valid_channel_body("_chan"));
        assert!(!is_valid_channel_body("bad-chan"));
        assert!(!is_valid_channel_body(&"a".repeat(21)));
    }

    #[test]
    fn user_args_parse() {
        assert_eq!(
            parse_user_args("alice 0 * :Alice A"),
            ("alice".to_owned(), "Alice A".to_owned())
        );
        assert_eq!(parse_user_args("alice 0 * :"), ("alice".to_owned(), "".to_owned()));
        assert_eq!(parse_user_args("alice 0 *"), ("alice".to_owned(), "".to_owned()));
        assert_eq!(parse_user_args("alice"), ("alice".to_owned(), "".to_owned()));
    }

    #[test]
    fn mode_change_parses_sign_and_letter() {
        assert_eq!(parse_mode_change("+o"), Some((true, 'o')));
        assert_eq!(parse_mode_change("-k"), Some((false, 'k')));
        assert_eq!(parse_mode_change("i"), Some((true, 'i')));
        assert_eq!(parse_mode_change("+"), None);
        assert_eq!(parse_mode_change("+ok"), None);
    }
}
