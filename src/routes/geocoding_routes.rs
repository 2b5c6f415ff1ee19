use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::dto::request_dto::{ReverseGeocodeQuery, ReverseGeocodeResponse};
use crate::services::geocoding_service::{GeocodingRequest, GeocodingResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation;

pub fn create_geocoding_router() -> Router<AppState> {
    Router::new()
        .route("/forward", get(forward_geocode))
        .route("/reverse", get(reverse_geocode))
}

/// Geocodificación directa para la entrada manual de dirección
async fn forward_geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodingRequest>,
) -> Result<Json<GeocodingResponse>, AppError> {
    if query.address.chars().count() < 5 {
        return Err(AppError::BadRequest("Please enter a valid address".to_string()));
    }

    let response = state
        .geocoding
        .geocode_address(&query.address)
        .await
        .map_err(|e| AppError::ExternalApi(e.to_string()))?;
    Ok(Json(response))
}

/// Proxy de geocodificación inversa. Las llamadas al proveedor público
/// salen siempre desde el servidor, detrás del rate limit y del cache.
async fn reverse_geocode(
    State(state): State<AppState>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<ReverseGeocodeResponse>, AppError> {
    validation::validate_coordinates(query.lat, query.lng)
        .map_err(|_| AppError::BadRequest("Invalid coordinates".to_string()))?;

    let address = state.geocoding.reverse(query.lat, query.lng).await;
    Ok(Json(ReverseGeocodeResponse {
        success: address.is_some(),
        address,
    }))
}
