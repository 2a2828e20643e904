//! In-memory [`AdminCommands`] to test code built on top of the cluster.
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;

use principals_context::Context;
use principals_models::Role;
use principals_models::User;

use crate::admin::AdminCommands;
use crate::admin::PrivilegeInfo;
use crate::admin::ResourceInfo;
use crate::admin::RoleInfo;
use crate::admin::RolesInfo;
use crate::admin::UserInfo;
use crate::admin::UsersInfo;
use crate::admin::CREATE_ROLE;
use crate::admin::CREATE_USER;
use crate::admin::DROP_ROLE;
use crate::admin::DROP_USER;
use crate::admin::ROLES_INFO;
use crate::admin::USERS_INFO;
use crate::connector::Connector;
use crate::errors::CommandError;
use crate::errors::ConnectionError;

type Key = (String, String);

#[derive(Default)]
struct State {
    closed: usize,
    connect_failure: bool,
    failures: HashMap<&'static str, String>,
    journal: Vec<String>,
    roles: BTreeMap<Key, Role>,
    users: BTreeMap<Key, User>,
}

/// Users and roles stored in memory, with cluster-like errors.
///
/// Clones share the same state so tests can inspect it after handing a copy out.
#[derive(Clone, Default)]
pub struct AdminFixture {
    state: Arc<Mutex<State>>,
}

impl AdminFixture {
    pub fn new() -> AdminFixture {
        AdminFixture::default()
    }

    /// Fail every following `command` with the given cluster message.
    pub fn fail_command<S: Into<String>>(&self, command: &'static str, message: S) {
        self.lock().failures.insert(command, message.into());
    }

    /// Fail every following connection attempt made through a [`FixtureConnector`].
    pub fn fail_connect(&self) {
        self.lock().connect_failure = true;
    }

    /// Commands received, in order, as `<command> <database>.<name>`.
    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    /// Number of sessions closed.
    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    pub fn user(&self, database: &str, name: &str) -> Option<User> {
        let key = (database.to_string(), name.to_string());
        self.lock().users.get(&key).cloned()
    }

    pub fn role(&self, database: &str, name: &str) -> Option<Role> {
        let key = (database.to_string(), name.to_string());
        self.lock().roles.get(&key).cloned()
    }

    /// Store a user as if created outside of the code under test.
    pub fn insert_user(&self, user: User) {
        let key = (user.auth_database.clone(), user.name.clone());
        self.lock().users.insert(key, user);
    }

    /// Store a role as if created outside of the code under test.
    pub fn insert_role(&self, role: Role) {
        let key = (role.database.clone(), role.name.clone());
        self.lock().roles.insert(key, role);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Tests that panic while holding the lock have already failed.
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record a command and return the state, or the injected failure.
    fn record(
        &self,
        command: &'static str,
        database: &str,
        name: &str,
    ) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.journal.push(format!("{} {}.{}", command, database, name));
        if let Some(message) = state.failures.get(command) {
            let message = message.clone();
            anyhow::bail!(CommandError { command, message });
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl AdminCommands for AdminFixture {
    async fn create_user(&self, _: &Context, user: &User) -> Result<()> {
        let mut state = self.record(CREATE_USER, &user.auth_database, &user.name)?;
        let key = (user.auth_database.clone(), user.name.clone());
        if state.users.contains_key(&key) {
            anyhow::bail!(CommandError {
                command: CREATE_USER,
                message: format!("User \"{}@{}\" already exists", key.1, key.0),
            });
        }
        state.users.insert(key, user.clone());
        Ok(())
    }

    async fn users_info(&self, _: &Context, name: &str, database: &str) -> Result<UsersInfo> {
        let state = self.record(USERS_INFO, database, name)?;
        let key = (database.to_string(), name.to_string());
        let users = state
            .users
            .get(&key)
            .map(|user| UserInfo {
                id: format!("{}.{}", database, name),
                user: user.name.clone(),
                db: user.auth_database.clone(),
                roles: user.roles.clone(),
            })
            .into_iter()
            .collect();
        Ok(UsersInfo { users })
    }

    async fn drop_user(&self, _: &Context, name: &str, database: &str) -> Result<()> {
        let mut state = self.record(DROP_USER, database, name)?;
        let key = (database.to_string(), name.to_string());
        if state.users.remove(&key).is_none() {
            anyhow::bail!(CommandError {
                command: DROP_USER,
                message: format!("User '{}@{}' not found", name, database),
            });
        }
        Ok(())
    }

    async fn create_role(&self, _: &Context, role: &Role) -> Result<()> {
        let mut state = self.record(CREATE_ROLE, &role.database, &role.name)?;
        let key = (role.database.clone(), role.name.clone());
        if state.roles.contains_key(&key) {
            anyhow::bail!(CommandError {
                command: CREATE_ROLE,
                message: format!("Role \"{}@{}\" already exists", key.1, key.0),
            });
        }
        state.roles.insert(key, role.clone());
        Ok(())
    }

    async fn roles_info(&self, _: &Context, name: &str, database: &str) -> Result<RolesInfo> {
        let state = self.record(ROLES_INFO, database, name)?;
        let key = (database.to_string(), name.to_string());
        let roles = state
            .roles
            .get(&key)
            .map(|role| RoleInfo {
                role: role.name.clone(),
                db: role.database.clone(),
                roles: role.inherited_roles.clone(),
                inherited_roles: role.inherited_roles.clone(),
                privileges: role
                    .privileges
                    .iter()
                    .map(|privilege| PrivilegeInfo {
                        resource: ResourceInfo {
                            db: privilege.db.clone(),
                            collection: privilege.collection.clone(),
                        },
                        actions: privilege.actions.clone(),
                    })
                    .collect(),
            })
            .into_iter()
            .collect();
        Ok(RolesInfo { roles })
    }

    async fn drop_role(&self, _: &Context, name: &str, database: &str) -> Result<()> {
        let mut state = self.record(DROP_ROLE, database, name)?;
        let key = (database.to_string(), name.to_string());
        if state.roles.remove(&key).is_none() {
            anyhow::bail!(CommandError {
                command: DROP_ROLE,
                message: format!("Role '{}@{}' not found", name, database),
            });
        }
        Ok(())
    }

    async fn close(self: Box<Self>) {
        self.lock().closed += 1;
    }
}

/// [`Connector`] handing out sessions to a shared [`AdminFixture`].
#[derive(Clone, Default)]
pub struct FixtureConnector {
    pub admin: AdminFixture,
}

impl FixtureConnector {
    pub fn new(admin: AdminFixture) -> FixtureConnector {
        FixtureConnector { admin }
    }
}

#[async_trait::async_trait]
impl Connector for FixtureConnector {
    async fn connect(&self, _: &Context) -> Result<Box<dyn AdminCommands>> {
        if self.admin.lock().connect_failure {
            anyhow::bail!(ConnectionError {
                host: "fixture".into(),
                port: 27017,
            });
        }
        Ok(Box::new(self.admin.clone()))
    }
}
