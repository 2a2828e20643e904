use principals_context::Context;
use principals_models::errors::MalformedIDError;
use principals_models::errors::ValidationError;
use principals_models::PrincipalId;
use principals_models::RoleReference;
use principals_models::User;
use principals_mongodb::admin::CREATE_USER;
use principals_mongodb::admin::DROP_USER;
use principals_mongodb::errors::CommandError;
use principals_mongodb::errors::ConnectionError;
use principals_mongodb::fixture::AdminFixture;

use crate::errors::PrincipalDropped;
use crate::errors::PrincipalNotFound;

fn alice() -> User {
    User {
        auth_database: "admin".into(),
        name: "alice".into(),
        password: "pw".into(),
        roles: vec![RoleReference::new("readWrite", "app")],
    }
}

#[tokio::test]
async fn create_then_read() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);

    let id = users.create(&context, &alice()).await.unwrap();
    let (name, database) = id.decode().unwrap();
    assert_eq!(name, "alice");
    assert_eq!(database, "admin");

    let user = users
        .read(&context, &name, &database, "pw")
        .await
        .unwrap()
        .expect("user to exist");
    assert_eq!(user, alice());
    assert_eq!(admin.closed(), 2);
}

#[tokio::test]
async fn read_absent_is_not_an_error() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);
    let user = users.read(&context, "alice", "admin", "pw").await.unwrap();
    assert!(user.is_none());
    assert_eq!(admin.journal(), vec!["usersInfo admin.alice".to_string()]);
}

#[tokio::test]
async fn create_existing_fails() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_user(alice());
    let users = super::users(&admin);
    let error = users.create(&context, &alice()).await.unwrap_err();
    let error = error.downcast_ref::<CommandError>().expect("command error");
    assert_eq!(error.command, CREATE_USER);
    assert_eq!(error.message, "User \"alice@admin\" already exists");
    assert_eq!(admin.closed(), 1);
}

#[tokio::test]
async fn create_without_password_fails_validation() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);
    let user = User {
        password: String::new(),
        ..alice()
    };
    let error = users.create(&context, &user).await.unwrap_err();
    assert!(error.is::<ValidationError>());
    assert!(admin.journal().is_empty());
}

#[tokio::test]
async fn create_external_user_without_password() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);
    let user = User {
        auth_database: "$external".into(),
        name: "CN=client,OU=ops".into(),
        password: String::new(),
        roles: Vec::new(),
    };
    let id = users.create(&context, &user).await.unwrap();
    assert_eq!(id, user.id());
    assert!(admin.user("$external", "CN=client,OU=ops").is_some());
}

#[tokio::test]
async fn update_replaces_user() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_user(alice());
    let users = super::users(&admin);
    let desired = User {
        roles: vec![RoleReference::new("read", "app")],
        ..alice()
    };
    let id = users
        .update(&context, &alice().id(), &desired)
        .await
        .unwrap();
    assert_eq!(id, desired.id());
    assert_eq!(
        admin.journal(),
        vec![
            "dropUser admin.alice".to_string(),
            "createUser admin.alice".to_string(),
        ]
    );
    assert_eq!(admin.user("admin", "alice"), Some(desired));
}

#[tokio::test]
async fn update_drop_failure_skips_create() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_user(alice());
    admin.fail_command(DROP_USER, "not authorized on admin to execute command");
    let users = super::users(&admin);
    let error = users
        .update(&context, &alice().id(), &alice())
        .await
        .unwrap_err();
    let error = error.downcast_ref::<CommandError>().expect("command error");
    assert_eq!(error.command, DROP_USER);
    assert_eq!(admin.journal(), vec!["dropUser admin.alice".to_string()]);
    assert!(admin.user("admin", "alice").is_some());
    assert_eq!(admin.closed(), 1);
}

#[tokio::test]
async fn update_create_failure_leaves_user_absent() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_user(alice());
    admin.fail_command(CREATE_USER, "Use of SCRAM-SHA-256 requires undigested passwords");
    let users = super::users(&admin);
    let error = users
        .update(&context, &alice().id(), &alice())
        .await
        .unwrap_err();
    assert!(error.is::<PrincipalDropped>());
    assert!(error.is::<CommandError>());

    let user = users.read(&context, "alice", "admin", "pw").await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn update_with_malformed_id() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);
    let previous = PrincipalId::from("not base64!");
    let error = users
        .update(&context, &previous, &alice())
        .await
        .unwrap_err();
    assert!(error.is::<MalformedIDError>());
    assert!(admin.journal().is_empty());
}

#[tokio::test]
async fn delete_user() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_user(alice());
    let users = super::users(&admin);
    users.delete(&context, "alice", "admin").await.unwrap();
    assert!(admin.user("admin", "alice").is_none());
}

#[tokio::test]
async fn delete_absent_fails() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);
    let error = users.delete(&context, "alice", "admin").await.unwrap_err();
    let error = error.downcast_ref::<CommandError>().expect("command error");
    assert_eq!(error.command, DROP_USER);
    assert_eq!(error.message, "User 'alice@admin' not found");
}

#[tokio::test]
async fn import_existing() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.insert_user(alice());
    let users = super::users(&admin);
    let user = users.import(&context, &alice().id()).await.unwrap();
    assert_eq!(user.name, "alice");
    assert_eq!(user.roles, alice().roles);
    assert!(user.password.is_empty());
}

#[tokio::test]
async fn import_absent_fails() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    let users = super::users(&admin);
    let error = users.import(&context, &alice().id()).await.unwrap_err();
    assert!(error.is::<PrincipalNotFound>());
}

#[tokio::test]
async fn connection_failure() {
    let context = Context::fixture();
    let admin = AdminFixture::new();
    admin.fail_connect();
    let users = super::users(&admin);
    let error = users.create(&context, &alice()).await.unwrap_err();
    assert!(error.is::<ConnectionError>());
    assert!(admin.journal().is_empty());
}
