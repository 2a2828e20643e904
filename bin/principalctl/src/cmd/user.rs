//! Reconcile MongoDB users.
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

use principals_context::Context;
use principals_models::PrincipalId;
use principals_models::User;
use principals_mongodb::Connector;
use principals_reconcile::UserReconciler;

use super::DesiredOpt;
use super::IdOpt;
use super::UpdateOpt;

/// Reconcile MongoDB users.
#[derive(Debug, Parser)]
pub struct UserCli {
    /// Select the `principalctl user` command to run.
    #[command(subcommand)]
    pub command: UserCmd,
}

/// Possible user commands to run.
#[derive(Debug, Subcommand)]
pub enum UserCmd {
    /// Create a user and print its identifier.
    Create(DesiredOpt),

    /// Drop a user, failing if it does not exist.
    Delete(IdOpt),

    /// Print an existing user so it can be managed from now on.
    Import(IdOpt),

    /// Print a user, or `absent` if it does not exist.
    Read(ReadOpt),

    /// Replace a user with a new definition and print the new identifier.
    Update(UpdateOpt),
}

/// Look up a user.
#[derive(Args, Debug)]
pub struct ReadOpt {
    #[command(flatten)]
    pub id: IdOpt,

    /// Password to report with the user, the cluster never returns it.
    #[arg(long, default_value_t = String::new())]
    pub password: String,
}

/// Execute the selected `principalctl user` command.
pub async fn run(context: &Context, connector: Arc<dyn Connector>, cmd: &UserCli) -> Result<()> {
    let users = UserReconciler::new(connector);
    match &cmd.command {
        UserCmd::Create(opt) => {
            let user: User = crate::desired::load(&opt.file)?;
            let id = users.create(context, &user).await?;
            println!("{}", id);
        }
        UserCmd::Delete(opt) => {
            let (name, database) = PrincipalId::from(opt.id.as_str()).decode()?;
            users.delete(context, &name, &database).await?;
        }
        UserCmd::Import(opt) => {
            let user = users.import(context, &PrincipalId::from(opt.id.as_str())).await?;
            crate::desired::print(&user)?;
        }
        UserCmd::Read(opt) => {
            let (name, database) = PrincipalId::from(opt.id.id.as_str()).decode()?;
            match users.read(context, &name, &database, &opt.password).await? {
                Some(user) => crate::desired::print(&user)?,
                None => println!("absent"),
            }
        }
        UserCmd::Update(opt) => {
            let desired: User = crate::desired::load(&opt.desired.file)?;
            let previous = PrincipalId::from(opt.id.id.as_str());
            let id = users.update(context, &previous, &desired).await?;
            println!("{}", id);
        }
    }
    Ok(())
}
