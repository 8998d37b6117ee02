//! Internal error types.
//!
//! Grounded on `examples/manuelpont94-irc/crates/irc_server/src/errors.rs`
//! (a `thiserror` enum for parsing errors). Extended per spec.md §9
//! ("Exception-driven lookup... Replace with explicit optional/result
//! returns at the lookup boundary; translate at the handler to the
//! correct numeric reply") and §7 ("Startup failures... fail with a
//! descriptive message to standard error and terminate the process").

use thiserror::Error;

use crate::replies::Replies;

/// Failure looking up a channel or nickname referenced by a command.
/// Handlers translate this into the matching numeric reply (401/403)
/// rather than letting it propagate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    #[error("no such channel")]
    NoSuchChannel,
    #[error("no such nick")]
    NoSuchNick,
}

impl LookupError {
    /// The default numeric reply for this failure, addressed at whatever
    /// argument the caller looked up (spec.md §7). A handler whose own
    /// reply text deviates from this default (e.g. privmsg's missing
    /// channel, which spec.md treats as a 401 rather than this type's
    /// usual 403) builds its own reply instead of calling this.
    pub fn into_reply(self, arg: &str) -> String {
        match self {
            LookupError::NoSuchChannel => Replies::no_such_channel(arg),
            LookupError::NoSuchNick => Replies::no_such_nick(arg),
        }
    }
}

/// Failure loading the optional `--config` overlay (§B of SPEC_FULL.md).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal errors raised while bringing the process up (§6/§7). Each one is
/// printed to stderr by `main` and terminates the process.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("usage: ircserv <port> <password>")]
    BadArguments,

    #[error("port must be a decimal integer in [1024, 65535]: {0}")]
    InvalidPort(String),

    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("failed to configure listener: {0}")]
    Socket(#[source] std::io::Error),

    #[error("failed to load config file: {0}")]
    Config(#[from] ConfigError),
}
