use principals_context::Context;
use principals_models::Privilege;
use principals_models::Role;
use principals_models::RoleReference;
use principals_mongodb::admin::CREATE_ROLE;
use principals_mongodb::admin::DROP_ROLE;
use principals_mongodb::errors::CommandError;
use principals_mongodb::fixture::AdminFixture;

use crate::errors::PrincipalDropped;

fn reporter() -> Role {
    Role {
        database: "admin".into(),
        name: "reporter".into(),
        inherited_roles: vec![RoleReference::new("read", "app")],
        privileges: vec![Privilege {
            db: "app".into(),
            collection: "events".into(),
            actions: vec!["find".into(), "listIndexes".into()],
        }],
    }
}

#[tokio::test]
async fn create_then_read() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let roles = super::roles(&admin);

    let id = roles.create(&context, &reporter()).await.unwrap();
    assert_eq!(
        id.decode().unwrap(),
        ("reporter".to_string(), "admin".to_string())
    );
    let role = roles
        .read(&context, "reporter", "admin")
        .await
        .unwrap()
        .expect("role to exist");
    assert_eq!(role, reporter());
}

#[tokio::test]
async fn create_without_inherited_roles_reads_back_empty() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let roles = super::roles(&admin);
    let desired = Role {
        database: "app".into(),
        name: "reporter".into(),
        inherited_roles: Vec::new(),
        privileges: vec![Privilege {
            db: "app".into(),
            collection: "orders".into(),
            actions: vec!["find".into()],
        }],
    };

    roles.create(&context, &desired).await.unwrap();
    let role = roles
        .read(&context, "reporter", "app")
        .await
        .unwrap()
        .expect("role to exist");
    assert!(role.inherited_roles.is_empty());
    assert_eq!(role.privileges, desired.privileges);
    assert_eq!(role, desired);
}

#[tokio::test]
async fn read_absent_is_not_an_error() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let roles = super::roles(&admin);
    let role = roles.read(&context, "reporter", "admin").await.unwrap();
    assert!(role.is_none());
}

#[tokio::test]
async fn update_drop_failure_skips_create() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_role(reporter());
    admin.fail_command(DROP_ROLE, "not authorized");
    let roles = super::roles(&admin);
    let error = roles
        .update(&context, &reporter().id(), &reporter())
        .await
        .unwrap_err();
    assert!(!error.is::<PrincipalDropped>());
    assert_eq!(admin.journal(), vec!["dropRole admin.reporter".to_string()]);
    assert!(admin.role("admin", "reporter").is_some());
}

#[tokio::test]
async fn update_create_failure_leaves_role_absent() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_role(reporter());
    admin.fail_command(CREATE_ROLE, "No role named read@app");
    let roles = super::roles(&admin);
    let error = roles
        .update(&context, &reporter().id(), &reporter())
        .await
        .unwrap_err();
    let dropped = error
        .downcast_ref::<PrincipalDropped>()
        .expect("principal dropped");
    assert_eq!(dropped.kind, "role");
    assert_eq!(dropped.name, "reporter");
    let cause = error.downcast_ref::<CommandError>().expect("command error");
    assert_eq!(cause.message, "No role named read@app");
    assert!(admin.role("admin", "reporter").is_none());
}

#[tokio::test]
async fn delete_absent_fails() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let roles = super::roles(&admin);
    let error = roles.delete(&context, "reporter", "admin").await.unwrap_err();
    assert!(error.is::<CommandError>());
}

#[tokio::test]
async fn import_existing() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_role(reporter());
    let roles = super::roles(&admin);
    let role = roles.import(&context, &reporter().id()).await.unwrap();
    assert_eq!(role, reporter());
    assert_eq!(admin.closed(), 1);
}
