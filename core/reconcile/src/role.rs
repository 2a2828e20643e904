//! Reconcile MongoDB roles.
use std::sync::Arc;

use anyhow::Context as _;
use anyhow::Result;
use slog::debug;
use slog::info;

use principals_context::Context;
use principals_models::PrincipalId;
use principals_models::Privilege;
use principals_models::Role;
use principals_mongodb::AdminCommands;
use principals_mongodb::Connector;

use crate::errors::PrincipalDropped;
use crate::errors::PrincipalNotFound;

const KIND: &str = "role";

/// Create, read, update and delete roles in the cluster.
///
/// Follows the same policies as [`UserReconciler`](crate::UserReconciler).
#[derive(Clone)]
pub struct RoleReconciler {
    connector: Arc<dyn Connector>,
}

impl RoleReconciler {
    pub fn new(connector: Arc<dyn Connector>) -> RoleReconciler {
        RoleReconciler { connector }
    }

    pub async fn create(&self, context: &Context, role: &Role) -> Result<PrincipalId> {
        role.validate()?;
        let context = crate::scoped(context, KIND, &role.database, &role.name);
        let admin = self.connector.connect(&context).await?;
        let result = admin.create_role(&context, role).await;
        admin.close().await;
        result?;
        info!(context.logger, "Role created");
        Ok(role.id())
    }

    /// Look up a role and its privileges, `None` if it does not exist.
    pub async fn read(&self, context: &Context, name: &str, database: &str) -> Result<Option<Role>> {
        let context = crate::scoped(context, KIND, database, name);
        let admin = self.connector.connect(&context).await?;
        let result = admin.roles_info(&context, name, database).await;
        admin.close().await;

        let role = result?.roles.into_iter().next().map(|info| Role {
            database: info.db,
            name: info.role,
            inherited_roles: info.roles,
            privileges: info.privileges.into_iter().map(Privilege::from).collect(),
        });
        if role.is_none() {
            debug!(context.logger, "Role not found");
        }
        Ok(role)
    }

    /// Replace the role identified by `previous` with the `desired` definition.
    pub async fn update(
        &self,
        context: &Context,
        previous: &PrincipalId,
        desired: &Role,
    ) -> Result<PrincipalId> {
        let (name, database) = previous.decode()?;
        desired.validate()?;
        let context = crate::scoped(context, KIND, &desired.database, &desired.name);
        let admin = self.connector.connect(&context).await?;
        let result = replace(&context, admin.as_ref(), &name, &database, desired).await;
        admin.close().await;
        result?;
        info!(context.logger, "Role updated"; "previous_id" => previous.as_str());
        Ok(desired.id())
    }

    /// Drop the role, failing if it does not exist.
    pub async fn delete(&self, context: &Context, name: &str, database: &str) -> Result<()> {
        let context = crate::scoped(context, KIND, database, name);
        let admin = self.connector.connect(&context).await?;
        let result = admin.drop_role(&context, name, database).await;
        admin.close().await;
        result?;
        info!(context.logger, "Role deleted");
        Ok(())
    }

    pub async fn import(&self, context: &Context, id: &PrincipalId) -> Result<Role> {
        let (name, database) = id.decode()?;
        match self.read(context, &name, &database).await? {
            Some(role) => Ok(role),
            None => anyhow::bail!(PrincipalNotFound {
                kind: KIND,
                database,
                name,
            }),
        }
    }
}

async fn replace(
    context: &Context,
    admin: &dyn AdminCommands,
    name: &str,
    database: &str,
    desired: &Role,
) -> Result<()> {
    admin.drop_role(context, name, database).await?;
    debug!(
        context.logger, "Previous role dropped";
        "previous_database" => database, "previous_name" => name
    );
    admin
        .create_role(context, desired)
        .await
        .with_context(|| PrincipalDropped {
            kind: KIND,
            database: database.to_string(),
            name: name.to_string(),
        })
}
