/// Ingredient endpoints
///
/// All routes run behind the token layer; every query is scoped to the
/// caller, so another user's ingredient id answers 404.
///
/// - `GET /recipe/ingredients` - List the caller's ingredients, name descending
/// - `POST /recipe/ingredients` - Create an ingredient
/// - `GET /recipe/ingredients/:id` - Fetch an ingredient
/// - `PATCH /recipe/ingredients/:id` - Rename an ingredient
/// - `DELETE /recipe/ingredients/:id` - Delete an ingredient (and its recipe links)

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
    models::ingredient::{CreateIngredient, Ingredient, UpdateIngredient},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIngredientRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIngredientRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters."))]
    pub name: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Ingredient not found.".to_string())
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = Ingredient::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(ingredients))
}

/// Create an ingredient; same body shape as tags
pub async fn create_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateIngredientRequest>,
) -> ApiResult<(StatusCode, Json<Ingredient>)> {
    req.validate()?;

    let ingredient =
        Ingredient::create(&state.db, auth.user_id, CreateIngredient { name: req.name }).await?;
    info!(ingredient_id = %ingredient.id, user_id = %auth.user_id, "Ingredient created");

    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Ingredient>> {
    let ingredient = Ingredient::find_for_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ingredient))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateIngredientRequest>,
) -> ApiResult<Json<Ingredient>> {
    req.validate()?;

    let data = UpdateIngredient { name: req.name };
    let ingredient = Ingredient::update(&state.db, id, auth.user_id, data)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ingredient))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !Ingredient::delete(&state.db, id, auth.user_id).await? {
        return Err(not_found());
    }

    info!(ingredient_id = %id, user_id = %auth.user_id, "Ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_trims_name() {
        let req: CreateIngredientRequest =
            serde_json::from_str(r#"{"name": "  Salt "}"#).unwrap();
        assert_eq!(req.name, "Salt");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_name_too_long() {
        let req = CreateIngredientRequest {
            name: "a".repeat(256),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_requires_name() {
        assert!(serde_json::from_str::<CreateIngredientRequest>("{}").is_err());
    }
}
