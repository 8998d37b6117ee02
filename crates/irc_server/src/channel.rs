//! The Channel record (spec.md §3 "Channel", §4.5, §4.6).
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/channels.rs`
//! and `channels_models.rs` (bool-flag `ChannelModes`, member/operator/voice
//! sets), adapted from `DashSet`-backed concurrent fields to plain
//! `HashSet`/`Vec` because this crate serializes all state mutation behind
//! a single lock (`server::Server`) rather than relying on per-field
//! concurrent maps — see DESIGN.md for why.

use std::collections::HashSet;

use crate::types::ConnId;

#[derive(Debug, Clone)]
pub struct ChannelModes {
    pub invite_only: bool,    // +i
    pub moderated: bool,      // +m
    pub topic_protected: bool, // +t
    pub secret: bool,         // +s
    pub key: Option<String>,  // +k <key>
    pub limit: Option<usize>, // +l <n>
}

impl Default for ChannelModes {
    fn default() -> Self {
        Self {
            invite_only: false,
            moderated: false,
            topic_protected: false,
            secret: false,
            key: None,
            limit: None,
        }
    }
}

pub const DEFAULT_TOPIC: &str = "No topic";

#[derive(Debug, Clone)]
pub struct Channel {
    /// Canonical display name, e.g. `#chan`, keeping the casing supplied
    /// on creation.
    pub name: String,
    pub topic: String,
    /// Insertion-ordered membership (spec.md §3: "ordered sequence of
    /// connection handles, insertion-ordered").
    pub members: Vec<ConnId>,
    pub operators: HashSet<ConnId>,
    pub voiced: HashSet<ConnId>,
    pub invited: HashSet<ConnId>,
    pub modes: ChannelModes,
}

impl Channel {
    pub fn new(name: String) -> Self {
        Channel {
            name,
            topic: DEFAULT_TOPIC.to_string(),
            members: Vec::new(),
            operators: HashSet::new(),
            voiced: HashSet::new(),
            invited: HashSet::new(),
            modes: ChannelModes::default(),
        }
    }

    /// Lowercased key a channel is looked up by (spec.md §3: "Channel
    /// lookup is by lowercased name without `#`").
    pub fn lookup_key(display_name: &str) -> String {
        display_name.trim_start_matches('#').to_lowercase()
    }

    pub fn is_member(&self, id: ConnId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_operator(&self, id: ConnId) -> bool {
        self.operators.contains(&id)
    }

    pub fn is_voiced(&self, id: ConnId) -> bool {
        self.voiced.contains(&id)
    }

    pub fn is_invited(&self, id: ConnId) -> bool {
        self.invited.contains(&id)
    }

    /// Adds a connection as a member. If it is the very first member it
    /// also becomes operator (spec.md §4.5 JOIN: "if the member count is
    /// now 1 add it as operator").
    pub fn add_member(&mut self, id: ConnId) {
        self.members.push(id);
        self.invited.remove(&id);
        if self.members.len() == 1 {
            self.operators.insert(id);
        }
    }

    /// Removes a connection from every membership-derived set. Does not
    /// perform operator succession — callers run
    /// `sole_operator_successor` first while the departing connection is
    /// still present, per spec.md §4.5.
    pub fn remove_member(&mut self, id: ConnId) {
        self.members.retain(|m| *m != id);
        self.operators.remove(&id);
        self.voiced.remove(&id);
    }

    /// If `leaving` is about to depart and is the channel's sole
    /// operator, returns the first other member (in insertion order) who
    /// should be promoted — spec.md §4.5 "Operator succession". Returns
    /// `None` if `leaving` isn't the sole operator, or there is no other
    /// member to promote.
    pub fn sole_operator_successor(&self, leaving: ConnId) -> Option<ConnId> {
        if self.operators.len() != 1 || !self.operators.contains(&leaving) {
            return None;
        }
        self.members.iter().copied().find(|m| *m != leaving)
    }

    /// The `MODE` reply/broadcast modestring (spec.md §4.6), e.g. `+ilk
    /// key 10`.
    pub fn mode_string(&self) -> String {
        let mut letters = String::from("+");
        let mut args = Vec::new();
        if self.modes.invite_only {
            letters.push('i');
        }
        if self.modes.moderated {
            letters.push('m');
        }
        if self.modes.topic_protected {
            letters.push('t');
        }
        if self.modes.secret {
            letters.push('s');
        }
        if let Some(key) = &self.modes.key {
            letters.push('k');
            args.push(key.clone());
        }
        if let Some(limit) = self.modes.limit {
            letters.push('l');
            args.push(limit.to_string());
        }
        if args.is_empty() {
            letters
        } else {
            format!("{letters} {}", args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_joiner_becomes_operator() {
        let mut c = Channel::new("#chan".to_string());
        c.add_member(1);
        assert!(c.is_operator(1));
        c.add_member(2);
        assert!(!c.is_operator(2));
    }

    #[test]
    fn sole_operator_succession_promotes_next_member() {
        let mut c = Channel::new("#chan".to_string());
        c.add_member(1);
        c.add_member(2);
        c.add_member(3);
        assert_eq!(c.sole_operator_successor(1), Some(2));
        assert_eq!(c.sole_operator_successor(2), None); // not the sole op
    }

    #[test]
    fn no_successor_when_channel_would_be_empty() {
        let mut c = Channel::new("#chan".to_string());
        c.add_member(1);
        assert_eq!(c.sole_operator_successor(1), None);
    }

    #[test]
    fn lookup_key_strips_hash_and_lowercases() {
        assert_eq!(Channel::lookup_key("#Chan"), "chan");
    }

    #[test]
    fn mode_string_includes_key_and_limit_args() {
        let mut c = Channel::new("#chan".to_string());
        c.modes.invite_only = true;
        c.modes.key = Some("secret".to_string());
        c.modes.limit = Some(10);
        assert_eq!(c.mode_string(), "+ikl secret 10");
    }
}
