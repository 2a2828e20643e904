//! Reconcile MongoDB principals (users and roles) with their desired definitions.
//!
//! Every operation opens a dedicated session with the cluster through a [`Connector`],
//! issues the admin commands it needs and closes the session before returning.
//! Nothing is shared across operations and failures are never retried.
//!
//! Existence is handled asymmetrically:
//!
//! - Reading a principal that does not exist returns `None`.
//! - Deleting a principal that does not exist fails with the cluster error.
//!
//! Updates drop the previous principal and create the desired one.
//! If creating fails after the drop the principal is left absent and the error
//! carries a [`PrincipalDropped`](errors::PrincipalDropped) context.
//!
//! [`Connector`]: principals_mongodb::Connector
use slog::o;

use principals_context::Context;

pub mod errors;

mod role;
mod user;

#[cfg(test)]
mod tests;

pub use self::role::RoleReconciler;
pub use self::user::UserReconciler;

/// Derive a context to log events about a specific principal.
fn scoped(context: &Context, kind: &'static str, database: &str, name: &str) -> Context {
    context
        .derive()
        .log_values(o!(
            "principal_kind" => kind,
            "database" => database.to_string(),
            "name" => name.to_string(),
        ))
        .build()
}
