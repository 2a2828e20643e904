//! Reconcile MongoDB users and roles from the command line.
//!
//! Each command maps to one reconcile operation invoked by an external orchestrator:
//! results are printed to standard output while logs go to standard error.
use std::sync::Arc;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use slog::debug;

use principals_conf::Conf;
use principals_context::Context;
use principals_mongodb::Connector;
use principals_mongodb::MongoConnector;

mod cmd;
mod desired;
mod logging;

pub mod errors;

pub use self::cmd::Cli;

/// Initialise the process context and invoke a command implementation.
pub async fn execute(cli: Cli, conf: Conf) -> Result<()> {
    let logger = self::logging::configure(&conf.logging);
    let context = Context::root(logger).build();
    debug!(
        context.logger, "Configuration loaded";
        "host" => &conf.connection.host,
        "port" => conf.connection.port,
        "max_connection_lifetime" => conf.max_connection_lifetime
    );

    let connector: Arc<dyn Connector> = Arc::new(MongoConnector::new(
        conf.connection.clone(),
        conf.max_connection_lifetime(),
    ));
    match &cli.command {
        cmd::Command::Role(cmd) => cmd::role::run(&context, connector, cmd).await,
        cmd::Command::User(cmd) => cmd::user::run(&context, connector, cmd).await,
    }
}

/// Initialise the async runtime for the process and invoke [`execute`].
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let conf = principals_conf::load_or_default(cli.config.as_deref())?;
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed tokio runtime initialisation")?
        .block_on(execute(cli, conf))
}
