//! Reconcile MongoDB roles.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;

use principals_context::Context;
use principals_models::PrincipalId;
use principals_models::Role;
use principals_mongodb::Connector;
use principals_reconcile::RoleReconciler;

use super::DesiredOpt;
use super::IdOpt;
use super::UpdateOpt;

/// Reconcile MongoDB roles.
#[derive(Debug, Parser)]
pub struct RoleCli {
    /// Select the `principalctl role` command to run.
    #[command(subcommand)]
    pub command: RoleCmd,
}

/// Possible role commands to run.
#[derive(Debug, Subcommand)]
pub enum RoleCmd {
    /// Create a role and print its identifier.
    Create(DesiredOpt),

    /// Drop a role, failing if it does not exist.
    Delete(IdOpt),

    /// Print an existing role so it can be managed from now on.
    Import(IdOpt),

    /// Print a role with its privileges, or `absent` if it does not exist.
    Read(IdOpt),

    /// Replace a role with a new definition and print the new identifier.
    Update(UpdateOpt),
}

/// Execute the selected `principalctl role` command.
pub async fn run(context: &Context, connector: Arc<dyn Connector>, cmd: &RoleCli) -> Result<()> {
    let roles = RoleReconciler::new(connector);
    match &cmd.command {
        RoleCmd::Create(opt) => {
            let role: Role = crate::desired::load(&opt.file)?;
            let id = roles.create(context, &role).await?;
            println!("{}", id);
        }
        RoleCmd::Delete(opt) => {
            let (name, database) = PrincipalId::from(opt.id.as_str()).decode()?;
            roles.delete(context, &name, &database).await?;
        }
        RoleCmd::Import(opt) => {
            let role = roles.import(context, &PrincipalId::from(opt.id.as_str())).await?;
            crate::desired::print(&role)?;
        }
        RoleCmd::Read(opt) => {
            let (name, database) = PrincipalId::from(opt.id.as_str()).decode()?;
            match roles.read(context, &name, &database).await? {
                Some(role) => crate::desired::print(&role)?,
                None => println!("absent"),
            }
        }
        RoleCmd::Update(opt) => {
            let desired: Role = crate::desired::load(&opt.desired.file)?;
            let previous = PrincipalId::from(opt.id.id.as_str());
            let id = roles.update(context, &previous, &desired).await?;
            println!("{}", id);
        }
    }
    Ok(())
}
