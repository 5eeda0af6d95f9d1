//! Role based authorization for the administrative API
//!
//! The capability matrix is a static table so it can be read (and tested) in one
//! place. Roles arrive from the upstream authentication proxy; see
//! [`crate::middleware::Caller`].

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Operator roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Viewer,
    ReleaseManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
            Role::ReleaseManager => "release_manager",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            "release_manager" => Ok(Role::ReleaseManager),
            _ => Err(()),
        }
    }
}

/// Administrative operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Operation {
    #[display(fmt = "list feature toggles")]
    ListAll,
    #[display(fmt = "view a feature toggle")]
    GetById,
    #[display(fmt = "create a feature toggle")]
    Create,
    #[display(fmt = "update a feature toggle")]
    Update,
    #[display(fmt = "delete a feature toggle")]
    DeleteById,
    #[display(fmt = "delete all feature toggles")]
    DeleteAll,
}

const ALL_ROLES: &[Role] = &[Role::Admin, Role::Viewer, Role::ReleaseManager];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Operation -> roles allowed to perform it.
static POLICY: &[(Operation, &[Role])] = &[
    (Operation::ListAll, ALL_ROLES),
    (Operation::GetById, ALL_ROLES),
    (Operation::Create, ADMIN_ONLY),
    (Operation::Update, ADMIN_ONLY),
    (Operation::DeleteById, ADMIN_ONLY),
    (Operation::DeleteAll, ADMIN_ONLY),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthzError {
    #[display(fmt = "Login required")]
    Unauthenticated,
    #[display(fmt = "Insufficient permissions")]
    Forbidden,
}

impl std::error::Error for AuthzError {}

/// Roles allowed to perform `operation`. Operations missing from the table
/// allow nobody.
pub fn allowed_roles(operation: Operation) -> &'static [Role] {
    POLICY
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

/// Decide whether a caller holding `roles` may perform `operation`.
///
/// No roles at all means the caller never authenticated.
pub fn authorize(roles: &[Role], operation: Operation) -> Result<(), AuthzError> {
    if roles.is_empty() {
        return Err(AuthzError::Unauthenticated);
    }

    let allowed = allowed_roles(operation);
    if roles.iter().any(|role| allowed.contains(role)) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}
