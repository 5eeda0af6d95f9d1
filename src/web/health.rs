use super::error::ApiError;
use crate::store::ToggleStore;
use actix_web::{get, web, HttpResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_health);
}

/// GET /health - Liveness including a store round trip
#[get("/health")]
pub async fn view_health(store: web::Data<dyn ToggleStore>) -> Result<HttpResponse, ApiError> {
    store.ping().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "backend": store.backend_name(),
    })))
}
