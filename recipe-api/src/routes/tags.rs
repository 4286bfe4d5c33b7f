/// Tag endpoints
///
/// All routes run behind the token layer; every query is scoped to the
/// caller, so another user's tag id answers 404.
///
/// - `GET /recipe/tags` - List the caller's tags, name descending
/// - `POST /recipe/tags` - Create a tag
/// - `GET /recipe/tags/:id` - Fetch a tag
/// - `PATCH /recipe/tags/:id` - Rename a tag
/// - `DELETE /recipe/tags/:id` - Delete a tag (and its recipe links)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{trimmed, trimmed_opt, ApiJson, ApiPath},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use recipe_shared::{
    auth::context::AuthContext,
    models::tag::{CreateTag, Tag, UpdateTag},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters."))]
    pub name: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Tag not found.".to_string())
}

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Tag>>> {
    let tags = Tag::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(tags))
}

/// Create a tag
///
/// # Endpoint
///
/// ```text
/// POST /recipe/tags
/// Authorization: Token <key>
///
/// { "name": "Vegan" }
/// ```
///
/// # Response (201)
///
/// ```json
/// { "id": "…", "name": "Vegan", "created_at": "…" }
/// ```
pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    req.validate()?;

    let tag = Tag::create(&state.db, auth.user_id, CreateTag { name: req.name }).await?;
    info!(tag_id = %tag.id, user_id = %auth.user_id, "Tag created");

    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Tag>> {
    let tag = Tag::find_for_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(tag))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTagRequest>,
) -> ApiResult<Json<Tag>> {
    req.validate()?;

    let tag = Tag::update(&state.db, id, auth.user_id, UpdateTag { name: req.name })
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !Tag::delete(&state.db, id, auth.user_id).await? {
        return Err(not_found());
    }

    info!(tag_id = %id, user_id = %auth.user_id, "Tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
