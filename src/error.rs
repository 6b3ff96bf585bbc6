//! Error types for the server process.
//!
//! Game-rule and protocol rejections live next to the state they guard
//! ([`GameError`](crate::state::GameError),
//! [`ProtocolError`](crate::state::ProtocolError)) and never stop the
//! process. [`ServerError`] covers the failures that do.

/// Errors that can occur when configuring, starting, or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    Config {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
