//! Small shared type aliases.
//!
//! The reference crate (`types.rs`) models nicknames/channels/hosts as
//! newtypes; this crate only needs the connection-handle alias described
//! in spec.md §3 ("a numeric handle unique for the connection's
//! lifetime (socket)") since channel/connection identity is otherwise
//! just `String`.

/// Stands in for the socket-number identity spec.md §9 describes ("the
/// socket number is a natural stable identity for the connection's
/// lifetime"). The reactor does hold a raw fd per connection (`net.rs`),
/// but the OS reuses fd numbers as soon as they're closed, so each
/// accepted connection instead gets the next value from a monotonic
/// counter (`server::next_conn_id`) — never reused, which is a strictly
/// stronger uniqueness guarantee than the source's fd-reuse-is-safe
/// argument relies on.
pub type ConnId = u64;
