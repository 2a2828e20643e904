//! Data object storing principalctl's configuration.
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use principals_mongodb::ConnectionConf;

use super::LoggingConf;

/// Global configuration for the principalctl process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conf {
    /// Options to connect to the MongoDB cluster to manage.
    #[serde(default)]
    pub connection: ConnectionConf,

    /// Time, in seconds, allowed to connect to the cluster and verify it responds.
    #[serde(default = "Conf::default_max_connection_lifetime")]
    pub max_connection_lifetime: u64,

    /// Process logging configuration.
    #[serde(default)]
    pub logging: LoggingConf,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            connection: ConnectionConf::default(),
            max_connection_lifetime: Self::default_max_connection_lifetime(),
            logging: LoggingConf::default(),
        }
    }
}

impl Conf {
    fn default_max_connection_lifetime() -> u64 {
        10
    }

    /// Maximum connection lifetime as a [`Duration`].
    pub fn max_connection_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_connection_lifetime)
    }
}
