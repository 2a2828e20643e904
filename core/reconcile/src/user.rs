//! Reconcile MongoDB users.
use std::sync::Arc;

use anyhow::Context as _;
use anyhow::Result;
use slog::debug;
use slog::info;

use principals_context::Context;
use principals_models::PrincipalId;
use principals_models::User;
use principals_mongodb::AdminCommands;
use principals_mongodb::Connector;

use crate::errors::PrincipalDropped;
use crate::errors::PrincipalNotFound;

const KIND: &str = "user";

/// Create, read, update and delete users in the cluster.
#[derive(Clone)]
pub struct UserReconciler {
    connector: Arc<dyn Connector>,
}

impl UserReconciler {
    pub fn new(connector: Arc<dyn Connector>) -> UserReconciler {
        UserReconciler { connector }
    }

    /// Create the user and return its identifier.
    pub async fn create(&self, context: &Context, user: &User) -> Result<PrincipalId> {
        user.validate()?;
        let context = crate::scoped(context, KIND, &user.auth_database, &user.name);
        let admin = self.connector.connect(&context).await?;
        let result = admin.create_user(&context, user).await;
        admin.close().await;
        result?;
        info!(context.logger, "User created");
        Ok(user.id())
    }

    /// Look up a user, `None` if it does not exist.
    ///
    /// The cluster never returns passwords: the given `password` is returned with the user.
    pub async fn read(
        &self,
        context: &Context,
        name: &str,
        database: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let context = crate::scoped(context, KIND, database, name);
        let admin = self.connector.connect(&context).await?;
        let result = admin.users_info(&context, name, database).await;
        admin.close().await;

        let user = result?.users.into_iter().next().map(|info| User {
            auth_database: info.db,
            name: info.user,
            password: password.to_string(),
            roles: info.roles,
        });
        if user.is_none() {
            debug!(context.logger, "User not found");
        }
        Ok(user)
    }

    /// Replace the user identified by `previous` with the `desired` definition.
    ///
    /// The previous user is dropped first and the desired user is created only if that succeeds.
    /// If creation fails the user no longer exists and the error has a [`PrincipalDropped`] context.
    pub async fn update(
        &self,
        context: &Context,
        previous: &PrincipalId,
        desired: &User,
    ) -> Result<PrincipalId> {
        let (name, database) = previous.decode()?;
        desired.validate()?;
        let context = crate::scoped(context, KIND, &desired.auth_database, &desired.name);
        let admin = self.connector.connect(&context).await?;
        let result = replace(&context, admin.as_ref(), &name, &database, desired).await;
        admin.close().await;
        result?;
        info!(context.logger, "User updated"; "previous_id" => previous.as_str());
        Ok(desired.id())
    }

    /// Drop the user, failing if it does not exist.
    pub async fn delete(&self, context: &Context, name: &str, database: &str) -> Result<()> {
        let context = crate::scoped(context, KIND, database, name);
        let admin = self.connector.connect(&context).await?;
        let result = admin.drop_user(&context, name, database).await;
        admin.close().await;
        result?;
        info!(context.logger, "User deleted");
        Ok(())
    }

    /// Adopt an existing user from its identifier alone.
    ///
    /// The password can't be recovered from the cluster so the imported user has none set.
    pub async fn import(&self, context: &Context, id: &PrincipalId) -> Result<User> {
        let (name, database) = id.decode()?;
        match self.read(context, &name, &database, "").await? {
            Some(user) => Ok(user),
            None => anyhow::bail!(PrincipalNotFound {
                kind: KIND,
                database,
                name,
            }),
        }
    }
}

/// Drop the previous user and create the desired one.
async fn replace(
    context: &Context,
    admin: &dyn AdminCommands,
    name: &str,
    database: &str,
    desired: &User,
) -> Result<()> {
    admin.drop_user(context, name, database).await?;
    debug!(
        context.logger, "Previous user dropped";
        "previous_database" => database, "previous_name" => name
    );
    admin
        .create_user(context, desired)
        .await
        .with_context(|| PrincipalDropped {
            kind: KIND,
            database: database.to_string(),
            name: name.to_string(),
        })
}
