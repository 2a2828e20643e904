//! User and role definitions.
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::ValidationError;
use crate::PrincipalId;
use crate::EXTERNAL_DATABASE;

/// Reference to a role defined in a database.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct RoleReference {
    /// Name of the referenced role.
    pub role: String,

    /// Database the referenced role is defined in.
    #[serde(default)]
    pub db: String,
}

impl RoleReference {
    pub fn new<S1, S2>(role: S1, db: S2) -> RoleReference
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        RoleReference {
            role: role.into(),
            db: db.into(),
        }
    }
}

/// Set of actions allowed on a database resource.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Privilege {
    /// Database the privilege applies to.
    #[serde(default)]
    pub db: String,

    /// Collection the privilege applies to, empty for all collections in the database.
    #[serde(default)]
    pub collection: String,

    /// Ordered list of action names granted on the resource.
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Desired definition of a MongoDB user.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Database the user authenticates against.
    pub auth_database: String,

    /// Name of the user.
    pub name: String,

    /// Password of the user, empty only for users in the external database.
    #[serde(default)]
    pub password: String,

    /// Roles granted to the user.
    #[serde(default)]
    pub roles: Vec<RoleReference>,
}

impl User {
    /// Identifier of the user.
    pub fn id(&self) -> PrincipalId {
        PrincipalId::encode(&self.auth_database, &self.name)
    }

    /// Check the definition can be applied to a cluster.
    pub fn validate(&self) -> Result<()> {
        validate_identity("user", &self.auth_database, &self.name)?;
        if self.password.is_empty() && self.auth_database != EXTERNAL_DATABASE {
            let error = ValidationError::MissingPassword(self.auth_database.clone());
            anyhow::bail!(error);
        }
        Ok(())
    }
}

/// Desired definition of a MongoDB role.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Database the role is defined in.
    #[serde(default = "Role::default_database")]
    pub database: String,

    /// Name of the role.
    pub name: String,

    /// Roles this role inherits privileges from.
    #[serde(default)]
    pub inherited_roles: Vec<RoleReference>,

    /// Privileges granted directly by the role.
    #[serde(default)]
    pub privileges: Vec<Privilege>,
}

impl Role {
    fn default_database() -> String {
        "admin".into()
    }

    /// Identifier of the role.
    pub fn id(&self) -> PrincipalId {
        PrincipalId::encode(&self.database, &self.name)
    }

    /// Check the definition can be applied to a cluster.
    pub fn validate(&self) -> Result<()> {
        validate_identity("role", &self.database, &self.name)
    }
}

/// Database and name must be usable in a [`PrincipalId`].
fn validate_identity(kind: &'static str, database: &str, name: &str) -> Result<()> {
    if database.is_empty() || database.contains('.') {
        anyhow::bail!(ValidationError::InvalidDatabase(database.to_string()));
    }
    if name.is_empty() {
        anyhow::bail!(ValidationError::MissingName(kind));
    }
    Ok(())
}
