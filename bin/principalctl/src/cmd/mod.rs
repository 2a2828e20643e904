//! CLI interface for principalctl.
use clap::Args;
use clap::Parser;
use clap::Subcommand;

pub mod role;
pub mod user;

/// Reconcile MongoDB users and roles with their desired definitions.
#[derive(Debug, Parser)]
#[command(version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the principalctl configuration to use, defaults and environment only if omitted.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Select the principalctl command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Select the principalctl command to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile MongoDB roles.
    Role(role::RoleCli),

    /// Reconcile MongoDB users.
    User(user::UserCli),
}

/// Identify an existing principal.
#[derive(Args, Debug)]
pub struct IdOpt {
    /// Identifier returned when the principal was created.
    #[arg(long)]
    pub id: String,
}

/// Desired definition of a principal.
#[derive(Args, Debug)]
pub struct DesiredOpt {
    /// Path to a YAML or JSON file with the desired definition.
    #[arg(short = 'f', long = "file")]
    pub file: String,
}

/// Replace an existing principal with a desired definition.
#[derive(Args, Debug)]
pub struct UpdateOpt {
    #[command(flatten)]
    pub id: IdOpt,

    #[command(flatten)]
    pub desired: DesiredOpt,
}
