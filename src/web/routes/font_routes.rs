use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::models::{Font, FontDraft, FontPatch};
use crate::library::{FontQuery, FontStats};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

pub fn create_fonts_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_fonts_handler).post(create_font_handler))
        .route("/stats", get(font_stats_handler))
        .route(
            "/{font_id}",
            get(get_font_handler).put(update_font_handler).delete(delete_font_handler),
        )
}

async fn list_fonts_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FontQuery>,
) -> Result<Json<Vec<Font>>, AppError> {
    let fonts = app_state.library.search_fonts(Some(&user.id), &query).await?;
    Ok(Json(fonts))
}

async fn create_font_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<FontDraft>,
) -> Result<(StatusCode, Json<Font>), AppError> {
    let font = app_state.library.create_font(Some(&user.id), payload).await?;
    Ok((StatusCode::CREATED, Json(font)))
}

async fn font_stats_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<FontStats>, AppError> {
    Ok(Json(app_state.library.stats(Some(&user.id)).await?))
}

async fn get_font_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(font_id): Path<String>,
) -> Result<Json<Font>, AppError> {
    Ok(Json(app_state.library.get_font(Some(&user.id), &font_id).await?))
}

async fn update_font_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(font_id): Path<String>,
    Json(payload): Json<FontPatch>,
) -> Result<Json<Font>, AppError> {
    let font = app_state
        .library
        .update_font(Some(&user.id), &font_id, payload)
        .await?;
    Ok(Json(font))
}

async fn delete_font_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(font_id): Path<String>,
) -> Result<StatusCode, AppError> {
    app_state.library.delete_font(Some(&user.id), &font_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
