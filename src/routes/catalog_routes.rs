use axum::{routing::get, Json, Router};

use crate::models::{ServiceDefinition, ServiceType};
use crate::state::AppState;

pub fn create_catalog_router() -> Router<AppState> {
    Router::new().route("/services", get(list_services))
}

/// Catálogo estático de servicios, en el orden en que se muestran
async fn list_services() -> Json<Vec<ServiceDefinition>> {
    Json(ServiceType::ALL.iter().map(|s| s.definition()).collect())
}
