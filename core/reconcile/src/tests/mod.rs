use std::sync::Arc;

use principals_mongodb::fixture::AdminFixture;
use principals_mongodb::fixture::FixtureConnector;

use crate::RoleReconciler;
use crate::UserReconciler;

mod role;
mod user;

fn users(admin: &AdminFixture) -> UserReconciler {
    let connector = FixtureConnector::new(admin.clone());
    UserReconciler::new(Arc::new(connector))
}

fn roles(admin: &AdminFixture) -> RoleReconciler {
    let connector = FixtureConnector::new(admin.clone());
    RoleReconciler::new(Arc::new(connector))
}
