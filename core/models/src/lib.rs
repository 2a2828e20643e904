//! Definitions of the MongoDB principals (users and roles) managed as desired state.
mod principal;

pub mod errors;
pub mod ids;

pub use self::ids::PrincipalId;
pub use self::principal::Privilege;
pub use self::principal::Role;
pub use self::principal::RoleReference;
pub use self::principal::User;

/// Reserved database name for credentials validated outside of the cluster's own user store.
pub const EXTERNAL_DATABASE: &str = "$external";
