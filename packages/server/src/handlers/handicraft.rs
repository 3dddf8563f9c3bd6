use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{parse_id, remove_photo, store_photo};
use crate::entity::{handicraft, handicraft_tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::multipart::PhotoForm;
use crate::models::handicraft::*;
use crate::models::shared::{Envelope, split_csv};
use crate::state::AppState;
use crate::utils::sanitize::clean_text;
use crate::utils::tags;

#[utoipa::path(
    get,
    path = "/",
    tag = "Handicrafts",
    operation_id = "listHandicrafts",
    summary = "List handicrafts",
    description = "Returns every handicraft, oldest first. With `tags`, only handicrafts carrying \
        at least one of the named tags are returned, each with its full tag list. \
        Naming a tag that does not exist fails with `TAG_NOT_FOUND`.",
    params(HandicraftListQuery),
    responses(
        (status = 200, description = "Handicrafts", body = Envelope<Vec<HandicraftResponse>>),
        (status = 404, description = "Unknown tag (TAG_NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(tags = ?query.tags))]
pub async fn list_handicrafts(
    State(state): State<AppState>,
    Query(query): Query<HandicraftListQuery>,
) -> Result<Json<Envelope<Vec<HandicraftResponse>>>, AppError> {
    // Filter names go through the same cleaning as stored tag names.
    let requested = tags::unique_names(
        &query
            .tags
            .as_deref()
            .map(|raw| split_csv(&clean_text(raw)))
            .unwrap_or_default(),
    );

    let mut select = handicraft::Entity::find().order_by_asc(handicraft::Column::CreatedAt);
    if !requested.is_empty() {
        let existing = tags::find_existing(&state.db, &requested).await?;
        if existing.len() < requested.len() {
            let found: HashSet<&str> = existing.iter().map(|t| t.name.as_str()).collect();
            let missing = requested
                .iter()
                .filter(|name| !found.contains(name.as_str()))
                .cloned()
                .collect();
            return Err(AppError::TagNotFound(missing));
        }

        let ids = tags::handicrafts_with_any(&state.db, &requested).await?;
        if ids.is_empty() {
            return Ok(Json(Envelope::list(Vec::new())));
        }
        select = select.filter(handicraft::Column::Id.is_in(ids));
    }

    let rows = select.all(&state.db).await?;
    let ids: Vec<Uuid> = rows.iter().map(|h| h.id).collect();
    let mut tag_names = tags::names_by_handicraft(&state.db, &ids).await?;

    let data = rows
        .into_iter()
        .map(|h| {
            let names = tag_names.remove(&h.id).unwrap_or_default();
            HandicraftResponse::new(h, names)
        })
        .collect();
    Ok(Json(Envelope::list(data)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Handicrafts",
    operation_id = "createHandicraft",
    summary = "Create a handicraft",
    description = "Multipart fields `name`, `description`, `tags` (comma-separated) and `steps` \
        (one per line) are required, as is the photo file in `photo_url`. The photo is stored \
        before the row is written. Unknown tags are created.",
    request_body(content_type = "multipart/form-data", description = "Handicraft fields and photo"),
    responses(
        (status = 201, description = "Handicraft created", body = Envelope<CreatedHandicraft>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "Payload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 502, description = "Photo upload failed (UPLOAD_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_handicraft(
    State(state): State<AppState>,
    mut form: PhotoForm,
) -> Result<impl IntoResponse, AppError> {
    let new = NewHandicraft::from_form(&form)?;
    let photo = form.require_photo()?;

    let photo_url = store_photo(&*state.store, &photo).await?;
    let (model, names) = insert_handicraft(&state.db, &new, &photo_url)
        .await
        .inspect_err(|e| warn!(photo_url = %photo_url, error = ?e, "Handicraft not saved, uploaded photo is orphaned"))?;

    tracing::info!(id = %model.id, "Handicraft created");
    let created = CreatedHandicraft {
        handicraft: HandicraftResponse::new(model, names),
        tags: new.tags,
    };
    Ok((StatusCode::CREATED, Json(Envelope::success(created))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Handicrafts",
    operation_id = "getHandicraft",
    summary = "Get a handicraft",
    params(("id" = Uuid, Path, description = "Handicraft ID")),
    responses(
        (status = 200, description = "Handicraft", body = Envelope<HandicraftResponse>),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_handicraft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<HandicraftResponse>>, AppError> {
    let id = parse_id(&id, "handicraft")?;
    let model = find_handicraft(&state.db, id).await?;
    let names = tags::names_for(&state.db, id).await?;
    Ok(Json(Envelope::success(HandicraftResponse::new(model, names))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Handicrafts",
    operation_id = "updateHandicraft",
    summary = "Update a handicraft",
    description = "Every field is optional and blank fields are ignored. A new photo in \
        `photo_url` is stored before the row changes and the old photo is then removed. \
        `tags` replaces the whole tag set.",
    params(("id" = Uuid, Path, description = "Handicraft ID")),
    request_body(content_type = "multipart/form-data", description = "Fields to change"),
    responses(
        (status = 200, description = "Updated handicraft", body = Envelope<HandicraftResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Photo upload failed (UPLOAD_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn update_handicraft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut form: PhotoForm,
) -> Result<Json<Envelope<HandicraftResponse>>, AppError> {
    let id = parse_id(&id, "handicraft")?;
    let changes = HandicraftChanges::from_form(&form)?;
    let photo = form.take_photo();

    let existing = find_handicraft(&state.db, id).await?;
    if changes.is_empty() && photo.is_none() {
        let names = tags::names_for(&state.db, id).await?;
        return Ok(Json(Envelope::success(HandicraftResponse::new(existing, names))));
    }

    let new_url = match &photo {
        Some(photo) => Some(store_photo(&*state.store, photo).await?),
        None => None,
    };

    let (model, names) = apply_changes(&state.db, id, changes, new_url.clone())
        .await
        .inspect_err(|e| {
            if let Some(url) = &new_url {
                warn!(photo_url = %url, error = ?e, "Handicraft not updated, uploaded photo is orphaned");
            }
        })?;

    if new_url.is_some() && existing.photo_url != model.photo_url {
        if let Err(e) = remove_photo(&*state.store, &existing.photo_url).await {
            warn!(photo_url = %existing.photo_url, error = ?e, "Failed to remove replaced photo");
        }
    }

    Ok(Json(Envelope::success(HandicraftResponse::new(model, names))))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Handicrafts",
    operation_id = "deleteHandicraft",
    summary = "Delete a handicraft",
    description = "Removes the photo from the object store, then the tag associations and the row.",
    params(("id" = Uuid, Path, description = "Handicraft ID")),
    responses(
        (status = 204, description = "Handicraft deleted"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Photo removal failed (UPLOAD_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_handicraft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "handicraft")?;
    let existing = find_handicraft(&state.db, id).await?;

    remove_photo(&*state.store, &existing.photo_url).await?;

    let txn = state.db.begin().await?;
    handicraft_tag::Entity::delete_many()
        .filter(handicraft_tag::Column::HandicraftId.eq(id))
        .exec(&txn)
        .await?;
    handicraft::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(id = %id, "Handicraft deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn insert_handicraft(
    db: &DatabaseConnection,
    new: &NewHandicraft,
    photo_url: &str,
) -> Result<(handicraft::Model, Vec<String>), AppError> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let model = handicraft::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name.clone()),
        description: Set(new.description.clone()),
        photo_url: Set(photo_url.to_string()),
        steps: Set(new.steps.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    let names = tags::replace_for_handicraft(&txn, model.id, &new.tags).await?;

    txn.commit().await?;
    Ok((model, names))
}

async fn apply_changes(
    db: &DatabaseConnection,
    id: Uuid,
    changes: HandicraftChanges,
    photo_url: Option<String>,
) -> Result<(handicraft::Model, Vec<String>), AppError> {
    let txn = db.begin().await?;

    let existing = handicraft::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(not_found)?;
    let mut active: handicraft::ActiveModel = existing.into();

    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(steps) = changes.steps {
        active.steps = Set(steps);
    }
    if let Some(url) = photo_url {
        active.photo_url = Set(url);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;

    let names = match changes.tags {
        Some(names) => tags::replace_for_handicraft(&txn, id, &names).await?,
        None => tags::names_for(&txn, id).await?,
    };

    txn.commit().await?;
    Ok((model, names))
}

async fn find_handicraft<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<handicraft::Model, AppError> {
    handicraft::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

fn not_found() -> AppError {
    AppError::NotFound("No handicraft found with that ID".into())
}
