//! User and role management commands issued against the cluster.
use anyhow::Result;
use mongodb::bson::doc;
use mongodb::bson::Bson;
use mongodb::bson::Document;
use serde::Deserialize;
use slog::debug;

use principals_context::Context;
use principals_models::Privilege;
use principals_models::Role;
use principals_models::RoleReference;
use principals_models::User;

use crate::connection::Connection;
use crate::errors::CommandError;

pub const CREATE_USER: &str = "createUser";
pub const USERS_INFO: &str = "usersInfo";
pub const DROP_USER: &str = "dropUser";
pub const CREATE_ROLE: &str = "createRole";
pub const ROLES_INFO: &str = "rolesInfo";
pub const DROP_ROLE: &str = "dropRole";

/// Admin commands needed to reconcile users and roles.
///
/// Each command issues a single request and returns the cluster error, if any, as a
/// [`CommandError`] with the cluster's message.
#[async_trait::async_trait]
pub trait AdminCommands: Send + Sync {
    /// Create a user in its authentication database.
    async fn create_user(&self, context: &Context, user: &User) -> Result<()>;

    /// Look up a user by name in the given database.
    async fn users_info(&self, context: &Context, name: &str, database: &str)
        -> Result<UsersInfo>;

    /// Drop a user from the given database.
    async fn drop_user(&self, context: &Context, name: &str, database: &str) -> Result<()>;

    /// Create a role in its database.
    async fn create_role(&self, context: &Context, role: &Role) -> Result<()>;

    /// Look up a role, and its privileges, by name in the given database.
    async fn roles_info(&self, context: &Context, name: &str, database: &str)
        -> Result<RolesInfo>;

    /// Drop a role from the given database.
    async fn drop_role(&self, context: &Context, name: &str, database: &str) -> Result<()>;

    /// Release the underlying connection.
    async fn close(self: Box<Self>);
}

/// Reply to the `usersInfo` command.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct UsersInfo {
    #[serde(default)]
    pub users: Vec<UserInfo>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct UserInfo {
    /// Qualified user name, as `<db>.<user>`.
    #[serde(rename = "_id", default)]
    pub id: String,
    pub user: String,
    pub db: String,
    #[serde(default)]
    pub roles: Vec<RoleReference>,
}

/// Reply to the `rolesInfo` command.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct RolesInfo {
    #[serde(default)]
    pub roles: Vec<RoleInfo>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct RoleInfo {
    pub role: String,
    pub db: String,

    /// Roles this role directly inherits from.
    #[serde(default)]
    pub roles: Vec<RoleReference>,

    /// All roles this role inherits from, directly or through other roles.
    #[serde(default, rename = "inheritedRoles")]
    pub inherited_roles: Vec<RoleReference>,

    /// Privileges directly granted to the role.
    #[serde(default)]
    pub privileges: Vec<PrivilegeInfo>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct PrivilegeInfo {
    #[serde(default)]
    pub resource: ResourceInfo,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Resource a privilege applies to.
///
/// Cluster-wide resources have neither a database nor a collection.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct ResourceInfo {
    #[serde(default)]
    pub db: String,
    #[serde(default)]
    pub collection: String,
}

impl From<PrivilegeInfo> for Privilege {
    fn from(info: PrivilegeInfo) -> Privilege {
        Privilege {
            db: info.resource.db,
            collection: info.resource.collection,
            actions: info.actions,
        }
    }
}

/// Build the `createUser` command.
///
/// The password is omitted when empty, as needed by `$external` users.
pub fn create_user_command(user: &User) -> Document {
    let mut command = doc! { "createUser": user.name.as_str() };
    if !user.password.is_empty() {
        command.insert("pwd", user.password.as_str());
    }
    command.insert("roles", role_references(&user.roles));
    command
}

pub fn users_info_command(name: &str, database: &str) -> Document {
    doc! { "usersInfo": { "user": name, "db": database } }
}

pub fn drop_user_command(name: &str) -> Document {
    doc! { "dropUser": name }
}

pub fn create_role_command(role: &Role) -> Document {
    let privileges: Vec<Document> = role
        .privileges
        .iter()
        .map(|privilege| {
            doc! {
                "resource": {
                    "db": privilege.db.as_str(),
                    "collection": privilege.collection.as_str(),
                },
                "actions": privilege.actions.clone(),
            }
        })
        .collect();
    doc! {
        "createRole": role.name.as_str(),
        "privileges": privileges,
        "roles": role_references(&role.inherited_roles),
    }
}

pub fn roles_info_command(name: &str, database: &str) -> Document {
    doc! {
        "rolesInfo": { "role": name, "db": database },
        "showPrivileges": true,
    }
}

pub fn drop_role_command(name: &str) -> Document {
    doc! { "dropRole": name }
}

fn role_references(roles: &[RoleReference]) -> Vec<Bson> {
    roles
        .iter()
        .map(|role| {
            Bson::Document(doc! {
                "role": role.role.as_str(),
                "db": role.db.as_str(),
            })
        })
        .collect()
}

/// [`AdminCommands`] issued over a verified MongoDB [`Connection`].
pub struct MongoAdmin {
    connection: Connection,
}

impl MongoAdmin {
    pub fn new(connection: Connection) -> MongoAdmin {
        MongoAdmin { connection }
    }

    async fn run(
        &self,
        context: &Context,
        command_name: &'static str,
        database: &str,
        command: Document,
    ) -> Result<Document> {
        debug!(
            context.logger, "Running MongoDB admin command";
            "command" => command_name,
            "database" => database,
            "address" => self.connection.address()
        );
        let database = self.connection.client().database(database);
        database.run_command(command).await.map_err(|error| {
            let kind = CommandError::from_driver(command_name, &error);
            anyhow::Error::from(error).context(kind)
        })
    }
}

/// Decode a command reply into the expected shape.
fn decode<T>(command: &'static str, reply: Document) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    mongodb::bson::from_document(reply).map_err(|error| {
        let message = format!("unexpected reply: {}", error);
        anyhow::Error::from(error).context(CommandError { command, message })
    })
}

#[async_trait::async_trait]
impl AdminCommands for MongoAdmin {
    async fn create_user(&self, context: &Context, user: &User) -> Result<()> {
        let command = create_user_command(user);
        self.run(context, CREATE_USER, &user.auth_database, command)
            .await?;
        Ok(())
    }

    async fn users_info(
        &self,
        context: &Context,
        name: &str,
        database: &str,
    ) -> Result<UsersInfo> {
        let command = users_info_command(name, database);
        let reply = self.run(context, USERS_INFO, database, command).await?;
        decode(USERS_INFO, reply)
    }

    async fn drop_user(&self, context: &Context, name: &str, database: &str) -> Result<()> {
        let command = drop_user_command(name);
        self.run(context, DROP_USER, database, command).await?;
        Ok(())
    }

    async fn create_role(&self, context: &Context, role: &Role) -> Result<()> {
        let command = create_role_command(role);
        self.run(context, CREATE_ROLE, &role.database, command)
            .await?;
        Ok(())
    }

    async fn roles_info(
        &self,
        context: &Context,
        name: &str,
        database: &str,
    ) -> Result<RolesInfo> {
        let command = roles_info_command(name, database);
        let reply = self.run(context, ROLES_INFO, database, command).await?;
        decode(ROLES_INFO, reply)
    }

    async fn drop_role(&self, context: &Context, name: &str, database: &str) -> Result<()> {
        let command = drop_role_command(name);
        self.run(context, DROP_ROLE, database, command).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.connection.close().await;
    }
}
