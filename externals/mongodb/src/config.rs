//! Options to connect to a MongoDB cluster.
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Connection options supplied by the operator for every reconcile call.
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConf {
    /// Host name or address of the cluster to connect to.
    #[serde(default = "ConnectionConf::default_host")]
    pub host: String,

    /// Port of the cluster to connect to.
    #[serde(default = "ConnectionConf::default_port")]
    pub port: u16,

    /// Authentication scheme: `PLAIN` or `MONGODB-X509`.
    #[serde(default = "ConnectionConf::default_auth_scheme")]
    pub auth_scheme: String,

    /// Username for the `PLAIN` auth scheme.
    #[serde(default)]
    pub username: String,

    /// Password for the `PLAIN` auth scheme.
    #[serde(default)]
    pub password: String,

    /// Client certificate, as a path or inline PEM, for X.509 authentication.
    #[serde(default)]
    pub auth_x509_cert: Option<String>,

    /// Client certificate key, as a path or inline PEM, if not included in the certificate.
    #[serde(default)]
    pub auth_x509_key: Option<String>,

    /// Database to authenticate against.
    #[serde(default = "ConnectionConf::default_auth_database")]
    pub auth_database: String,

    /// Connect to the cluster over TLS.
    #[serde(default)]
    pub ssl: bool,

    /// Skip verification of the cluster TLS certificates.
    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// PEM encoded CA certificates to verify the cluster with.
    #[serde(default)]
    pub certificate: Option<String>,

    /// Name of the replica set to connect to.
    #[serde(default)]
    pub replica_set: Option<String>,

    /// Retry write operations once on transient errors.
    #[serde(default = "ConnectionConf::default_retry_writes")]
    pub retry_writes: bool,

    /// Connect directly to the host, ignoring the replica set topology.
    #[serde(default)]
    pub direct: bool,

    /// SOCKS5 proxy URL to tunnel connections through.
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for ConnectionConf {
    fn default() -> Self {
        ConnectionConf {
            host: Self::default_host(),
            port: Self::default_port(),
            auth_scheme: Self::default_auth_scheme(),
            username: String::new(),
            password: String::new(),
            auth_x509_cert: None,
            auth_x509_key: None,
            auth_database: Self::default_auth_database(),
            ssl: false,
            insecure_skip_verify: false,
            certificate: None,
            replica_set: None,
            retry_writes: Self::default_retry_writes(),
            direct: false,
            proxy: None,
        }
    }
}

impl ConnectionConf {
    fn default_host() -> String {
        "127.0.0.1".into()
    }

    fn default_port() -> u16 {
        27017
    }

    fn default_auth_scheme() -> String {
        crate::auth::SCHEME_PLAIN.into()
    }

    fn default_auth_database() -> String {
        "admin".into()
    }

    fn default_retry_writes() -> bool {
        true
    }
}

impl fmt::Debug for ConnectionConf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConnectionConf")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_scheme", &self.auth_scheme)
            .field("username", &self.username)
            .field("auth_database", &self.auth_database)
            .field("ssl", &self.ssl)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("replica_set", &self.replica_set)
            .field("retry_writes", &self.retry_writes)
            .field("direct", &self.direct)
            .finish_non_exhaustive()
    }
}
