//! Errors reported by principalctl commands.

/// Unable to read the desired principal definition.
#[derive(Debug, thiserror::Error)]
pub enum DesiredStateError {
    /// The definition file could not be decoded.
    #[error("unable to decode desired state from file at '{0}'")]
    // (path,)
    Decode(String),

    /// The definition file could not be opened.
    #[error("unable to read desired state file at '{0}'")]
    // (path,)
    Open(String),
}
