//! Feature toggle routes
//!
//! `/feature-toggles/{context}` serves client applications and sits behind the
//! API key gate. Everything else is the operator API, gated by role.
//!
//! Write routes take the raw body and decode it only once the role check passes.

use super::error::ApiError;
use crate::api_key::{ApiKeyGate, API_KEY_HEADER};
use crate::authz::Operation;
use crate::middleware::Caller;
use crate::orm::contexts::ContextName;
use crate::store::ToggleStore;
use crate::toggle::{CreateFeatureToggleRequest, FeatureToggleUpdateRequest};
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;

/// Decode a JSON request body.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        log::debug!("Rejected request body: {}", err);
        ApiError::BadRequest(format!("Json deserialize error: {}", err))
    })
}

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_active_toggles)
        .service(view_toggles)
        .service(create_toggle)
        .service(delete_all_toggles)
        .service(view_toggle)
        .service(update_toggle)
        .service(delete_toggle);
}

/// GET /feature-toggles/{context} - Toggles switched on in a context
///
/// Unknown contexts yield an empty list rather than an error.
#[get("/feature-toggles/{context}")]
pub async fn view_active_toggles(
    req: HttpRequest,
    gate: web::Data<ApiKeyGate>,
    store: web::Data<dyn ToggleStore>,
    context: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    gate.check(presented)?;

    let toggles = match context.parse::<ContextName>() {
        Ok(context) => store.get_all_active(context).await?,
        Err(_) => {
            log::debug!("Active toggles requested for unknown context '{}'", context);
            Vec::new()
        }
    };

    Ok(HttpResponse::Ok().json(toggles))
}

/// GET /feature-toggles - Every toggle
#[get("/feature-toggles")]
pub async fn view_toggles(
    caller: Caller,
    store: web::Data<dyn ToggleStore>,
) -> Result<HttpResponse, ApiError> {
    caller.require(Operation::ListAll)?;

    Ok(HttpResponse::Ok().json(store.get_all().await?))
}

/// GET /feature-toggle/{id} - One toggle
#[get("/feature-toggle/{id}")]
pub async fn view_toggle(
    caller: Caller,
    store: web::Data<dyn ToggleStore>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    caller.require(Operation::GetById)?;

    Ok(HttpResponse::Ok().json(store.get_by_id(*id).await?))
}

/// POST /feature-toggles - Create a toggle
#[post("/feature-toggles")]
pub async fn create_toggle(
    caller: Caller,
    store: web::Data<dyn ToggleStore>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    caller.require(Operation::Create)?;

    let request: CreateFeatureToggleRequest = parse_body(&body)?;
    let toggle = store
        .create(&request.key, &request.name, &request.description)
        .await?;

    Ok(HttpResponse::Ok().json(toggle))
}

/// PATCH /feature-toggle/{id} - Change name, description or context state
#[patch("/feature-toggle/{id}")]
pub async fn update_toggle(
    caller: Caller,
    store: web::Data<dyn ToggleStore>,
    id: web::Path<i32>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    caller.require(Operation::Update)?;

    let request: FeatureToggleUpdateRequest = parse_body(&body)?;
    let toggle = store.update(*id, request).await?;

    Ok(HttpResponse::Ok().json(toggle))
}

/// DELETE /feature-toggle/{id} - Delete one toggle
#[delete("/feature-toggle/{id}")]
pub async fn delete_toggle(
    caller: Caller,
    store: web::Data<dyn ToggleStore>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    caller.require(Operation::DeleteById)?;

    store.remove_by_id(*id).await?;

    Ok(HttpResponse::Ok().finish())
}

/// DELETE /feature-toggles - Delete every toggle
#[delete("/feature-toggles")]
pub async fn delete_all_toggles(
    caller: Caller,
    store: web::Data<dyn ToggleStore>,
) -> Result<HttpResponse, ApiError> {
    caller.require(Operation::DeleteAll)?;

    store.remove_all().await?;

    Ok(HttpResponse::Ok().finish())
}
