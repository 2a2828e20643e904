//! Open admin sessions against the cluster, one per reconcile operation.
use std::time::Duration;

use anyhow::Result;

use principals_context::Context;

use crate::admin::AdminCommands;
use crate::admin::MongoAdmin;
use crate::config::ConnectionConf;
use crate::proxy::ProxyEnv;

/// Source of [`AdminCommands`] sessions.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Open a new session, the caller must close it once done.
    async fn connect(&self, context: &Context) -> Result<Box<dyn AdminCommands>>;
}

/// Connect to MongoDB with the same options for every session.
pub struct MongoConnector {
    conf: ConnectionConf,
    max_lifetime: Duration,
}

impl MongoConnector {
    pub fn new(conf: ConnectionConf, max_lifetime: Duration) -> MongoConnector {
        MongoConnector { conf, max_lifetime }
    }
}

#[async_trait::async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, context: &Context) -> Result<Box<dyn AdminCommands>> {
        let env = ProxyEnv::from_process();
        let descriptor = crate::descriptor::resolve(context, &self.conf, &env)?;
        let connection = crate::connection::open(context, descriptor, self.max_lifetime).await?;
        Ok(Box::new(MongoAdmin::new(connection)))
    }
}
