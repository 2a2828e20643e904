//! Errors resolving connections to MongoDB or running admin commands against it.

/// No valid certificate was found in the CA certificate PEM bundle.
#[derive(Debug, thiserror::Error)]
#[error("failed parsing the CA certificate PEM: no valid certificate found")]
pub struct CertificateParseError;

/// The client certificate key pair could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum KeyPairError {
    #[error("unable to read client TLS material from {0}")]
    // (source,)
    Read(String),

    #[error("no valid client certificate found in {0}")]
    // (source,)
    NoCertificate(String),

    #[error("no valid private key found in {0}")]
    // (source,)
    NoPrivateKey(String),

    #[error("the private key found in {0} is not supported")]
    // (source,)
    UnsupportedKey(String),

    #[error("the private key found in {0} does not match the client certificate")]
    // (source,)
    Mismatch(String),
}

/// The PLAIN auth scheme requires a username and password.
#[derive(Debug, thiserror::Error)]
#[error("the PLAIN auth scheme requires user and password to be provided")]
pub struct InvalidCredentialError;

/// The MONGODB-X509 auth scheme requires the external auth database.
#[derive(Debug, thiserror::Error)]
#[error("the MONGODB-X509 auth scheme requires the $external auth database, can't use '{database}'")]
pub struct InvalidAuthDatabaseError {
    pub database: String,
}

/// The requested auth scheme is not supported.
#[derive(Debug, thiserror::Error)]
#[error("unknown auth scheme '{scheme}', should be PLAIN or MONGODB-X509")]
pub struct UnknownAuthSchemeError {
    pub scheme: String,
}

/// The configured proxy URL can't be used.
#[derive(Debug, thiserror::Error)]
pub enum ProxyURLError {
    #[error("unable to parse the proxy URL")]
    Parse,

    #[error("the proxy URL has no host")]
    MissingHost,

    #[error("unsupported proxy scheme '{0}', should be socks5 or socks5h")]
    // (scheme,)
    UnsupportedScheme(String),
}

/// Unable to establish an authenticated connection to the cluster.
#[derive(Debug, thiserror::Error)]
#[error("unable to connect to MongoDB at {host}:{port}")]
pub struct ConnectionError {
    pub host: String,
    pub port: u16,
}

/// The cluster did not respond to the liveness probe.
#[derive(Debug, thiserror::Error)]
#[error("MongoDB at {host}:{port} is unreachable: ping failed")]
pub struct UnreachableError {
    pub host: String,
    pub port: u16,
}

/// The cluster rejected or failed an admin command.
#[derive(Debug, thiserror::Error)]
#[error("{command} command failed: {message}")]
pub struct CommandError {
    /// Name of the admin command that failed.
    pub command: &'static str,

    /// Error text reported by the cluster.
    pub message: String,
}

impl CommandError {
    /// Capture the cluster error text for a failed command.
    pub fn from_driver(command: &'static str, error: &mongodb::error::Error) -> CommandError {
        let message = match error.kind.as_ref() {
            mongodb::error::ErrorKind::Command(reply) => reply.message.clone(),
            _ => error.to_string(),
        };
        CommandError { command, message }
    }
}
