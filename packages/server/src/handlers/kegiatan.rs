use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{parse_id, remove_photo, store_photo};
use crate::entity::kegiatan;
use crate::error::{AppError, ErrorBody};
use crate::extractors::multipart::PhotoForm;
use crate::models::kegiatan::*;
use crate::models::shared::Envelope;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Kegiatan",
    operation_id = "listKegiatan",
    summary = "List activities",
    responses(
        (status = 200, description = "Activities, oldest first", body = Envelope<Vec<KegiatanResponse>>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_kegiatan(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<KegiatanResponse>>>, AppError> {
    let rows = kegiatan::Entity::find()
        .order_by_asc(kegiatan::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(Envelope::list(
        rows.into_iter().map(KegiatanResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Kegiatan",
    operation_id = "createKegiatan",
    summary = "Create an activity",
    description = "Multipart fields `title` and `description` are required, as is the photo \
        file in `photo_url`. The photo is stored before the row is written.",
    request_body(content_type = "multipart/form-data", description = "Activity fields and photo"),
    responses(
        (status = 201, description = "Activity created", body = Envelope<CreatedKegiatan>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "Payload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Photo upload failed (UPLOAD_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_kegiatan(
    State(state): State<AppState>,
    mut form: PhotoForm,
) -> Result<impl IntoResponse, AppError> {
    let new = NewKegiatan::from_form(&form)?;
    let photo = form.require_photo()?;

    let photo_url = store_photo(&*state.store, &photo).await?;
    let model = kegiatan::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(new.title),
        description: Set(new.description),
        photo_url: Set(photo_url.clone()),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await
    .inspect_err(|e| warn!(photo_url = %photo_url, error = %e, "Kegiatan not saved, uploaded photo is orphaned"))?;

    tracing::info!(id = %model.id, "Kegiatan created");
    let created = CreatedKegiatan {
        kegiatan: model.into(),
    };
    Ok((StatusCode::CREATED, Json(Envelope::success(created))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Kegiatan",
    operation_id = "getKegiatan",
    summary = "Get an activity",
    params(("id" = Uuid, Path, description = "Kegiatan ID")),
    responses(
        (status = 200, description = "Activity", body = Envelope<KegiatanResponse>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_kegiatan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<KegiatanResponse>>, AppError> {
    let id = parse_id(&id, "kegiatan")?;
    let model = find_kegiatan(&state.db, id).await?;
    Ok(Json(Envelope::success(model.into())))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Kegiatan",
    operation_id = "deleteKegiatan",
    summary = "Delete an activity",
    description = "Removes the photo from the object store, then the row.",
    params(("id" = Uuid, Path, description = "Kegiatan ID")),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Photo removal failed (UPLOAD_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_kegiatan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "kegiatan")?;
    let existing = find_kegiatan(&state.db, id).await?;

    remove_photo(&*state.store, &existing.photo_url).await?;
    kegiatan::Entity::delete_by_id(id).exec(&state.db).await?;

    tracing::info!(id = %id, "Kegiatan deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_kegiatan<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<kegiatan::Model, AppError> {
    kegiatan::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No kegiatan found with that ID".into()))
}
