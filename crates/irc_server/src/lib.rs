//! `irc_server` — an IRC server implementing the RFC 1459/2812
//! client-facing subset described in this repository's specification.
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/lib.rs`'s
//! module tree, re-pointed at this crate's own modules.

pub mod channel;
pub mod config;
pub mod connection;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod framer;
pub mod handlers;
pub mod net;
pub mod parsers;
pub mod replies;
pub mod server;
pub mod types;
