//! Opaque identifiers correlating externally persisted state with cluster principals.
//!
//! Identifiers are the base64 encoding of `<database>.<name>`.
//! Decoding splits the plain text on the first `.` so names may contain dots
//! while database names can't.
use std::fmt;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::MalformedIDError;

/// Separator between the database and the principal name.
const SEPARATOR: char = '.';

/// Opaque composite identifier of a principal in a database.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Encode the identifier of principal `name` in `database`.
    pub fn encode(database: &str, name: &str) -> PrincipalId {
        let plain = format!("{}{}{}", database, SEPARATOR, name);
        PrincipalId(STANDARD.encode(plain))
    }

    /// Decode the identifier into a `(name, database)` pair.
    pub fn decode(&self) -> Result<(String, String)> {
        let id = &self.0;
        let plain = STANDARD
            .decode(id)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| String::from_utf8(bytes).map_err(anyhow::Error::from))
            .map_err(|error| error.context(MalformedIDError::Encoding(id.clone())))?;
        match plain.split_once(SEPARATOR) {
            Some((database, name)) if !database.is_empty() && !name.is_empty() => {
                Ok((name.to_string(), database.to_string()))
            }
            _ => anyhow::bail!(MalformedIDError::Shape(id.clone())),
        }
    }

    /// Access the encoded identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        PrincipalId(value)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        PrincipalId(value.to_string())
    }
}
