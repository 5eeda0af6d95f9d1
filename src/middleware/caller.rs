use crate::app_config::AuthConfig;
use crate::authz::{self, AuthzError, Operation, Role};
use actix_web::dev::Payload;
use actix_web::{web::Data, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

/// Operator identity for a single request.
///
/// Authentication happens upstream: the proxy in front of this service verifies
/// the operator and forwards their roles, comma separated, in the header named
/// by `auth.role_header`. Role names this service does not know are ignored, so
/// a caller with none of ours is treated as unauthenticated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    roles: Vec<Role>,
}

impl Caller {
    pub fn new(roles: Vec<Role>) -> Self {
        Self { roles }
    }

    /// Parse a role header value such as `"viewer, release_manager"`.
    pub fn from_header_value(value: Option<&str>) -> Self {
        let mut roles = Vec::new();

        for name in value.unwrap_or_default().split(',').map(str::trim) {
            if name.is_empty() {
                continue;
            }
            match name.parse::<Role>() {
                Ok(role) if !roles.contains(&role) => roles.push(role),
                Ok(_) => {}
                Err(_) => log::debug!("Ignoring unknown role '{}'", name),
            }
        }

        Self { roles }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_authenticated(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Require permission for `operation`. Returns () or the denial.
    pub fn require(&self, operation: Operation) -> Result<(), AuthzError> {
        authz::authorize(&self.roles, operation).map_err(|e| {
            log::warn!("Denied '{}' for roles {:?}: {}", operation, self.roles, e);
            e
        })
    }
}

/// This implementation is what actually provides the `caller: Caller` in the parameters of route functions.
impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let caller = match req.app_data::<Data<AuthConfig>>() {
            Some(auth) => Self::header_caller(req, &auth.role_header),
            None => Self::header_caller(req, &AuthConfig::default().role_header),
        };
        ready(Ok(caller))
    }
}

impl Caller {
    fn header_caller(req: &HttpRequest, header: &str) -> Self {
        Self::from_header_value(req.headers().get(header).and_then(|v| v.to_str().ok()))
    }
}
