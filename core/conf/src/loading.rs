//! Load configuration from files and the process environment.
use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;

use crate::Conf;

/// Environment variable overriding the cluster host.
pub const ENV_HOST: &str = "MONGO_HOST";

/// Environment variable overriding the cluster port.
pub const ENV_PORT: &str = "MONGO_PORT";

/// Environment variable overriding the username.
pub const ENV_USERNAME: &str = "MONGO_USR";

/// Environment variable overriding the password.
pub const ENV_PASSWORD: &str = "MONGO_PWD";

/// Errors handling principalctl configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unable to decode configuration from file at the given path.
    #[error("unable to decode configuration from file at '{0}'")]
    // (path,)
    Decode(String),

    /// An environment variable holds a value that is not valid for its option.
    #[error("invalid value for environment variable '{0}'")]
    // (variable,)
    InvalidEnv(&'static str),

    /// Unable to read configuration file at the given path.
    #[error("unable to read configuration file at '{0}'")]
    // (path,)
    Open(String),

    /// Configuration file not found at the given path.
    #[error("configuration file not found at '{0}'")]
    // (path,)
    PathNotFound(String),
}

/// Load process configuration from the specified path, then apply environment overrides.
pub fn load(path: &str) -> Result<Conf> {
    if !PathBuf::from(path).exists() {
        let error = Error::PathNotFound(path.to_string());
        let error = anyhow::anyhow!(error);
        return Err(error);
    }

    let file = File::open(path).with_context(|| Error::Open(path.into()))?;
    let conf = serde_yaml::from_reader(file).with_context(|| Error::Decode(path.into()))?;
    apply_env(conf, |name| std::env::var(name).ok())
}

/// Load configuration from the given path, if any, or start from defaults.
pub fn load_or_default(path: Option<&str>) -> Result<Conf> {
    match path {
        Some(path) => load(path),
        None => apply_env(Conf::default(), |name| std::env::var(name).ok()),
    }
}

/// Override connection options with values set in the environment.
///
/// Empty variables are ignored.
pub fn apply_env<F>(mut conf: Conf, lookup: F) -> Result<Conf>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|value: &String| !value.is_empty());
    if let Some(host) = lookup(ENV_HOST) {
        conf.connection.host = host;
    }
    if let Some(port) = lookup(ENV_PORT) {
        conf.connection.port = port
            .parse()
            .with_context(|| Error::InvalidEnv(ENV_PORT))?;
    }
    if let Some(username) = lookup(ENV_USERNAME) {
        conf.connection.username = username;
    }
    if let Some(password) = lookup(ENV_PASSWORD) {
        conf.connection.password = password;
    }
    Ok(conf)
}
