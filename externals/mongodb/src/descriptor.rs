//! Resolve operator supplied [`ConnectionConf`] into a validated [`ConnectionDescriptor`].
use std::fmt;

use anyhow::Result;
use slog::debug;

use principals_context::Context;

use crate::auth::AuthCredential;
use crate::config::ConnectionConf;
use crate::proxy::Dialer;
use crate::proxy::ProxyEnv;
use crate::tls::TlsMaterial;

/// Connection string parameters derived from the operator options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionParams {
    pub retry_writes: bool,
    pub ssl: bool,

    /// Replica set name, never set for direct connections.
    pub replica_set: Option<String>,
    pub direct: bool,
}

impl ConnectionParams {
    fn from_conf(conf: &ConnectionConf) -> ConnectionParams {
        let replica_set = match conf.direct {
            true => None,
            false => conf.replica_set.clone().filter(|name| !name.is_empty()),
        };
        ConnectionParams {
            retry_writes: conf.retry_writes,
            ssl: conf.ssl,
            replica_set,
            direct: conf.direct,
        }
    }

    /// Render the parameters as a connection string query.
    pub fn query(&self) -> String {
        let mut query = format!("retrywrites={}", self.retry_writes);
        if self.ssl {
            query.push_str("&ssl=true");
        }
        if let Some(name) = &self.replica_set {
            query.push_str("&replicaSet=");
            query.push_str(name);
        }
        if self.direct {
            query.push_str("&connect=direct");
        }
        query
    }
}

/// Everything needed to open a connection to the cluster.
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub credential: AuthCredential,
    pub dialer: Dialer,
    pub params: ConnectionParams,

    /// Skip verification of the cluster certificates when TLS is enabled.
    pub skip_verify: bool,
    pub tls: Option<TlsMaterial>,
}

impl ConnectionDescriptor {
    /// Connections are encrypted if requested or if any TLS material was supplied.
    pub fn tls_enabled(&self) -> bool {
        self.params.ssl || self.tls.is_some()
    }

    /// Connection string describing the descriptor, without credentials.
    pub fn uri(&self) -> String {
        format!(
            "mongodb://{}:{}/?{}",
            self.host,
            self.port,
            self.params.query()
        )
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credential", &self.credential)
            .field("dialer", &self.dialer)
            .field("params", &self.params)
            .field("skip_verify", &self.skip_verify)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

/// Validate the connection options and resolve them into a [`ConnectionDescriptor`].
///
/// Resolution stops at the first invalid option.
pub fn resolve(
    context: &Context,
    conf: &ConnectionConf,
    env: &ProxyEnv,
) -> Result<ConnectionDescriptor> {
    let dialer = crate::proxy::resolve(context, conf.proxy.as_deref(), env)?;
    let credential = crate::auth::resolve(
        &conf.auth_scheme,
        &conf.username,
        &conf.password,
        &conf.auth_database,
    )?;
    let tls = crate::tls::build(
        context,
        conf.certificate.as_deref(),
        conf.auth_x509_cert.as_deref(),
        conf.auth_x509_key.as_deref(),
    )?;

    let descriptor = ConnectionDescriptor {
        host: conf.host.clone(),
        port: conf.port,
        credential,
        dialer,
        params: ConnectionParams::from_conf(conf),
        skip_verify: conf.insecure_skip_verify,
        tls,
    };
    debug!(
        context.logger, "Resolved MongoDB connection options";
        "uri" => descriptor.uri(),
        "auth_source" => descriptor.credential.source(),
        "tls" => descriptor.tls_enabled()
    );
    Ok(descriptor)
}
