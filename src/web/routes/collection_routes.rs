use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::db::models::{Collection, CollectionPatch, Font};
use crate::library::ExportFormat;
use crate::web::models::{AuthenticatedUser, CreateCollectionRequest, ExportQuery, MembershipResponse};
use crate::web::{AppError, AppState};

pub fn create_collections_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_collections_handler).post(create_collection_handler))
        .route(
            "/{collection_id}",
            put(update_collection_handler).delete(delete_collection_handler),
        )
        .route("/{collection_id}/fonts", get(collection_fonts_handler))
        .route(
            "/{collection_id}/fonts/{font_id}",
            post(attach_font_handler).delete(detach_font_handler),
        )
        .route("/{collection_id}/export", get(export_collection_handler))
}

async fn list_collections_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Collection>>, AppError> {
    Ok(Json(app_state.library.list_collections(Some(&user.id)).await?))
}

async fn create_collection_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<Collection>), AppError> {
    let collection = app_state
        .library
        .create_collection(Some(&user.id), &payload.name, &payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

async fn update_collection_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Json(payload): Json<CollectionPatch>,
) -> Result<Json<Collection>, AppError> {
    let collection = app_state
        .library
        .update_collection(Some(&user.id), &collection_id, payload)
        .await?;
    Ok(Json(collection))
}

async fn delete_collection_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
) -> Result<StatusCode, AppError> {
    app_state
        .library
        .delete_collection(Some(&user.id), &collection_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn collection_fonts_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
) -> Result<Json<Vec<Font>>, AppError> {
    let fonts = app_state
        .library
        .collection_fonts(Some(&user.id), &collection_id)
        .await?;
    Ok(Json(fonts))
}

async fn attach_font_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path((collection_id, font_id)): Path<(String, String)>,
) -> Result<Json<MembershipResponse>, AppError> {
    let changed = app_state
        .library
        .attach_font(Some(&user.id), &collection_id, &font_id)
        .await?;
    Ok(Json(MembershipResponse { changed }))
}

async fn detach_font_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path((collection_id, font_id)): Path<(String, String)>,
) -> Result<Json<MembershipResponse>, AppError> {
    let changed = app_state
        .library
        .detach_font(Some(&user.id), &collection_id, &font_id)
        .await?;
    Ok(Json(MembershipResponse { changed }))
}

async fn export_collection_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let format: ExportFormat = query.format.parse()?;
    let owner = Some(user.id.as_str());
    let collection = app_state.library.get_collection(owner, &collection_id).await?;
    let body = app_state
        .library
        .export_collection(owner, &collection_id, format)
        .await?;

    let filename = format!("{}.{format}", attachment_stem(&collection.name));
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ];
    Ok((headers, body))
}

/// Header-safe file name derived from the collection name.
fn attachment_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_') { c } else { '_' })
        .collect()
}
