//! Test fixtures for building the app and requests
#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::{web, App, Error};
use insta_toggles::api_key::{ApiKeyGate, ApiKeySettings, API_KEY_HEADER};
use insta_toggles::orm::contexts::ContextName;
use insta_toggles::store::ToggleStore;
use insta_toggles::toggle::{ContextActivation, FeatureToggle, FeatureToggleUpdateRequest};
use std::sync::Arc;

pub const ROLE_HEADER: &str = "x-auth-roles";
pub const TEST_API_KEY: &str = "test";

pub const ADMIN: &str = "admin";
pub const VIEWER: &str = "viewer";
pub const RELEASE_MANAGER: &str = "release_manager";

/// Gate accepting `TEST_API_KEY`
pub fn test_gate(enforcement_enabled: bool) -> web::Data<ApiKeyGate> {
    web::Data::new(ApiKeyGate::new(ApiKeySettings::new(
        vec![TEST_API_KEY.to_string()],
        enforcement_enabled,
    )))
}

/// The application as the server builds it, minus logging middleware
pub fn build_app(
    store: Arc<dyn ToggleStore>,
    gate: web::Data<ApiKeyGate>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(store))
        .app_data(gate)
        .configure(insta_toggles::web::configure)
}

/// Attach operator roles the way the authenticating proxy would
pub fn as_role(req: TestRequest, role: Option<&str>) -> TestRequest {
    match role {
        Some(role) => req.insert_header((ROLE_HEADER, role)),
        None => req,
    }
}

pub fn active_toggles_request(context: &str, api_key: Option<&str>) -> TestRequest {
    let req = TestRequest::get().uri(&format!("/feature-toggles/{}", context));
    match api_key {
        Some(key) => req.insert_header((API_KEY_HEADER, key)),
        None => req,
    }
}

/// Create a toggle and switch it on in `context`
pub async fn seed_active_toggle(
    store: &dyn ToggleStore,
    key: &str,
    context: ContextName,
) -> FeatureToggle {
    let toggle = store
        .create(key, "name", "description")
        .await
        .expect("Failed to create toggle");

    store
        .update(
            toggle.id(),
            FeatureToggleUpdateRequest {
                contexts: Some(vec![ContextActivation {
                    name: context,
                    active: true,
                }]),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to activate toggle")
}
