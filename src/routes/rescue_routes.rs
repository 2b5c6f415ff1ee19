use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::request_controller::RequestController;
use crate::dto::request_dto::{
    CreateRescueRequest, RescueRequestResponse, SubmitRescueRequest, SubmitResponse,
    UpdateRescueRequest,
};
use crate::models::RescueRequest;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rescue_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request))
        .route("/:id", get(get_request))
        .route("/:id", put(update_request))
        .route("/:id/submit", post(submit_request))
}

async fn create_request(
    State(state): State<AppState>,
    Json(request): Json<CreateRescueRequest>,
) -> Result<Json<RescueRequestResponse>, AppError> {
    let controller = RequestController::new(state.repository.clone(), state.notifications.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RescueRequest>, AppError> {
    let controller = RequestController::new(state.repository.clone(), state.notifications.clone());
    let response = controller.get(id).await?;
    Ok(Json(response))
}

async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRescueRequest>,
) -> Result<Json<RescueRequestResponse>, AppError> {
    let controller = RequestController::new(state.repository.clone(), state.notifications.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn submit_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRescueRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let controller = RequestController::new(state.repository.clone(), state.notifications.clone());
    let response = controller.submit(id, request).await?;
    Ok(Json(response))
}
