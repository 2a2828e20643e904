//! Errors reported by reconcile operations.

/// The previous principal was dropped during an update but the desired one was not created.
///
/// The principal no longer exists in the cluster.
#[derive(Debug, thiserror::Error)]
#[error("{kind} '{name}' was dropped from database '{database}' but could not be created again")]
pub struct PrincipalDropped {
    pub kind: &'static str,
    pub database: String,
    pub name: String,
}

/// The principal to operate on does not exist in the cluster.
#[derive(Debug, thiserror::Error)]
#[error("{kind} '{name}' not found in database '{database}'")]
pub struct PrincipalNotFound {
    pub kind: &'static str,
    pub database: String,
    pub name: String,
}
