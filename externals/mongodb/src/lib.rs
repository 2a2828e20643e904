//! MongoDB access for principal reconciliation.
//!
//! Operator supplied [`ConnectionConf`] options are resolved into a [`ConnectionDescriptor`]
//! which is used to open verified connections to the cluster.
//! [`AdminCommands`] are then issued over those connections to manage users and roles.
mod config;
mod connection;
mod connector;
mod descriptor;

pub mod admin;
pub mod auth;
pub mod errors;
pub mod proxy;
pub mod tls;

#[cfg(any(test, feature = "test-fixture"))]
pub mod fixture;

pub use self::admin::AdminCommands;
pub use self::admin::MongoAdmin;
pub use self::config::ConnectionConf;
pub use self::connection::open;
pub use self::connection::Connection;
pub use self::connector::Connector;
pub use self::connector::MongoConnector;
pub use self::descriptor::resolve;
pub use self::descriptor::ConnectionDescriptor;
pub use self::descriptor::ConnectionParams;
