//! Command handlers, one module per family, mirroring spec.md §4.4–§4.6.
//!
//! Grounded on the module split in
//! `examples/manuelpont94-irc/crates/irc_server/src/handlers/` (separate
//! files for registration, channels, messages, miscellaneous commands).

pub mod channels;
pub mod messaging;
pub mod misc;
pub mod query;
pub mod registration;

use crate::server::Server;
use crate::types::ConnId;

/// Sends `line` to every channel `id` currently belongs to, in each
/// channel's insertion order, optionally skipping `exclude` within each
/// channel (spec.md §5 "A broadcast to a channel delivers to members in
/// the channel's insertion order").
pub(crate) fn broadcast_to_own_channels(srv: &mut Server, id: ConnId, line: &str, exclude: Option<ConnId>) {
    for key in srv.channels_of(id) {
        srv.broadcast_to_channel(&key, line, exclude);
    }
}
