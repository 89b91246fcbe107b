use axum::{
    Json, Router,
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::models::{Device, NewDevice};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

pub fn create_devices_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_devices_handler).post(register_device_handler))
}

async fn list_devices_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Device>>, AppError> {
    Ok(Json(app_state.library.list_devices(Some(&user.id)).await?))
}

async fn register_device_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NewDevice>,
) -> Result<(StatusCode, Json<Device>), AppError> {
    let device = app_state.library.register_device(Some(&user.id), payload).await?;
    Ok((StatusCode::CREATED, Json(device)))
}
