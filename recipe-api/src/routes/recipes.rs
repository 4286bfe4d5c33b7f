/// Recipe endpoints
///
/// - `GET /recipe/recipes?tags=<uuid,..>&ingredients=<uuid,..>` - List the
///   caller's recipes, newest first, with link ids
/// - `POST /recipe/recipes` - Create a recipe
/// - `GET /recipe/recipes/:id` - Recipe with embedded tags and ingredients
/// - `PATCH /recipe/recipes/:id` - Partial update; `tags` / `ingredients`
///   replace the whole link set when present
/// - `DELETE /recipe/recipes/:id` - Delete a recipe
///
/// Tag and ingredient ids must belong to the caller; anything else is a 400
/// and nothing is written.

use crate::{
    app::AppState,
    error::{ensure_valid, validation_details, ApiError, ApiResult, ValidationErrorDetail},
    extract::{nullable, trimmed, trimmed_opt, ApiJson, ApiPath, ApiQuery},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use recipe_shared::{
    auth::context::AuthContext,
    models::recipe::{
        validate_price, CreateRecipe, Recipe, RecipeDetail, RecipeFilter, RecipeListItem,
        UpdateRecipe,
    },
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidateUrl};

const MAX_LINK_LENGTH: usize = 255;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters."))]
    pub title: String,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub time_minutes: i32,

    /// Accepts `"5.50"` or `5.5`
    pub price: Decimal,

    #[serde(default, deserialize_with = "trimmed_opt")]
    pub link: Option<String>,

    #[serde(default)]
    pub tags: Vec<Uuid>,

    #[serde(default)]
    pub ingredients: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters."))]
    pub title: Option<String>,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub time_minutes: Option<i32>,

    pub price: Option<Decimal>,

    /// `null` clears the link, absent leaves it
    #[serde(default, deserialize_with = "nullable")]
    pub link: Option<Option<String>>,

    pub tags: Option<Vec<Uuid>>,

    pub ingredients: Option<Vec<Uuid>>,
}

/// Comma-separated id filters
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    fn to_filter(&self) -> ApiResult<RecipeFilter> {
        Ok(RecipeFilter {
            tag_ids: parse_ids("tags", self.tags.as_deref())?,
            ingredient_ids: parse_ids("ingredients", self.ingredients.as_deref())?,
        })
    }
}

/// Parses `"id1,id2"`; blank segments are ignored
fn parse_ids(field: &str, raw: Option<&str>) -> ApiResult<Vec<Uuid>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Uuid>()
                .map_err(|_| ApiError::field(field, format!("\"{}\" is not a valid UUID.", s)))
        })
        .collect()
}

/// Empty links are stored as no link
fn normalize_link(link: Option<String>) -> Option<String> {
    link.filter(|l| !l.is_empty())
}

fn check_link(link: Option<&str>, details: &mut Vec<ValidationErrorDetail>) {
    let Some(link) = link else { return };

    if !link.validate_url() {
        details.push(ValidationErrorDetail::new("link", "Enter a valid URL."));
    } else if link.chars().count() > MAX_LINK_LENGTH {
        details.push(ValidationErrorDetail::new(
            "link",
            "Ensure this field has no more than 255 characters.",
        ));
    }
}

fn check_price(price: Option<&Decimal>, details: &mut Vec<ValidationErrorDetail>) {
    if let Some(Err(message)) = price.map(validate_price) {
        details.push(ValidationErrorDetail::new("price", message));
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Recipe not found.".to_string())
}

pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<RecipeListQuery>,
) -> ApiResult<Json<Vec<RecipeListItem>>> {
    let filter = query.to_filter()?;
    let recipes = Recipe::list_by_user(&state.db, auth.user_id, &filter).await?;

    Ok(Json(recipes))
}

/// Create a recipe
///
/// # Endpoint
///
/// ```text
/// POST /recipe/recipes
/// Authorization: Token <key>
///
/// {
///   "title": "Steak and mushroom sauce",
///   "time_minutes": 5,
///   "price": "5.00",
///   "tags": ["<tag uuid>"],
///   "ingredients": []
/// }
/// ```
///
/// # Response (201)
///
/// The recipe with its tags and ingredients embedded as objects.
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, or a tag/ingredient id that does not
///   exist or belongs to another user
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeDetail>)> {
    let mut details = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_details(&errors),
    };

    let link = normalize_link(req.link);
    check_price(Some(&req.price), &mut details);
    check_link(link.as_deref(), &mut details);
    ensure_valid(details)?;

    let detail = Recipe::create(
        &state.db,
        auth.user_id,
        CreateRecipe {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link,
            tag_ids: req.tags,
            ingredient_ids: req.ingredients,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<RecipeDetail>> {
    let detail = Recipe::find_for_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(detail))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeDetail>> {
    let mut details = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_details(&errors),
    };

    let link = req.link.map(|link| normalize_link(link.map(|l| l.trim().to_string())));
    check_price(req.price.as_ref(), &mut details);
    check_link(link.as_ref().and_then(|l| l.as_deref()), &mut details);
    ensure_valid(details)?;

    let data = UpdateRecipe {
        title: req.title,
        time_minutes: req.time_minutes,
        price: req.price,
        link,
        tag_ids: req.tags,
        ingredient_ids: req.ingredients,
    };

    let detail = Recipe::update(&state.db, id, auth.user_id, data)
        .await?
        .ok_or_else(not_found)?;

    info!(recipe_id = %id, user_id = %auth.user_id, "Recipe updated");
    Ok(Json(detail))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !Recipe::delete(&state.db, id, auth.user_id).await? {
        return Err(not_found());
    }

    info!(recipe_id = %id, user_id = %auth.user_id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
