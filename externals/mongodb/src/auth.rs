//! Resolve the credential used to authenticate with the cluster.
use std::fmt;

use anyhow::Result;
use mongodb::options::AuthMechanism;
use mongodb::options::Credential;

use principals_models::EXTERNAL_DATABASE;

use crate::errors::InvalidAuthDatabaseError;
use crate::errors::InvalidCredentialError;
use crate::errors::UnknownAuthSchemeError;

/// Username and password authentication against a database.
pub const SCHEME_PLAIN: &str = "PLAIN";

/// Client certificate authentication against the external database.
pub const SCHEME_X509: &str = "MONGODB-X509";

/// Credential to authenticate with the cluster.
#[derive(Clone, Eq, PartialEq)]
pub enum AuthCredential {
    /// Username and password validated by the cluster.
    Plain {
        username: String,
        password: String,
        source: String,
    },

    /// Identity taken from the client certificate.
    X509,
}

impl AuthCredential {
    /// Database the credential is validated against.
    pub fn source(&self) -> &str {
        match self {
            AuthCredential::Plain { source, .. } => source,
            AuthCredential::X509 => EXTERNAL_DATABASE,
        }
    }

    /// Convert the credential into the MongoDB driver's representation.
    pub fn into_driver(self) -> Credential {
        let mut credential = Credential::default();
        match self {
            AuthCredential::Plain {
                username,
                password,
                source,
            } => {
                credential.username = Some(username);
                credential.password = Some(password);
                credential.source = Some(source);
            }
            AuthCredential::X509 => {
                credential.mechanism = Some(AuthMechanism::MongoDbX509);
                credential.source = Some(EXTERNAL_DATABASE.to_string());
            }
        }
        credential
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthCredential::Plain {
                username, source, ..
            } => f
                .debug_struct("Plain")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("source", source)
                .finish(),
            AuthCredential::X509 => f.write_str("X509"),
        }
    }
}

/// Resolve the [`AuthCredential`] for the given scheme.
pub fn resolve(
    scheme: &str,
    username: &str,
    password: &str,
    database: &str,
) -> Result<AuthCredential> {
    match scheme {
        SCHEME_PLAIN => {
            if username.is_empty() || password.is_empty() {
                anyhow::bail!(InvalidCredentialError);
            }
            Ok(AuthCredential::Plain {
                username: username.to_string(),
                password: password.to_string(),
                source: database.to_string(),
            })
        }
        SCHEME_X509 => {
            if database != EXTERNAL_DATABASE {
                anyhow::bail!(InvalidAuthDatabaseError {
                    database: database.to_string(),
                });
            }
            Ok(AuthCredential::X509)
        }
        scheme => anyhow::bail!(UnknownAuthSchemeError {
            scheme: scheme.to_string(),
        }),
    }
}
