//! Errors decoding identifiers or validating principal definitions.

/// The principal identifier could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum MalformedIDError {
    /// The identifier is not a base64 encoded UTF-8 string.
    #[error("unexpected format of ID '{0}': unable to decode it")]
    // (id,)
    Encoding(String),

    /// The decoded identifier does not have the `database.name` shape.
    #[error("unexpected format of ID '{0}', expected database.name")]
    // (id,)
    Shape(String),
}

/// The principal definition is not valid.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The database name is empty or contains the identifier separator.
    #[error("database name '{0}' is not valid: it must be non empty and can't contain '.'")]
    // (database,)
    InvalidDatabase(String),

    /// Users without password are only allowed in the external database.
    #[error(
        "users without password allowed only for X509 certificate users that have to be in the $external database, but database '{0}' was specified"
    )]
    // (database,)
    MissingPassword(String),

    /// The principal has no name.
    #[error("the {0} name can't be empty")]
    // (kind,)
    MissingName(&'static str),
}
