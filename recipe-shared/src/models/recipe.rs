/// Recipe model and database operations
///
/// A recipe belongs to one user and links to any number of that user's tags
/// and ingredients. Link ids are checked against the owner inside the same
/// transaction that writes them; an id owned by someone else is reported as
/// unknown and nothing is written.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL CHECK (title <> ''),
///     time_minutes INTEGER NOT NULL CHECK (time_minutes >= 0),
///     price NUMERIC(5, 2) NOT NULL CHECK (price >= 0),
///     link VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE recipe_tags (recipe_id UUID, tag_id UUID, PRIMARY KEY (recipe_id, tag_id));
/// CREATE TABLE recipe_ingredients (recipe_id UUID, ingredient_id UUID, PRIMARY KEY (recipe_id, ingredient_id));
/// ```
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::recipe::{CreateRecipe, Recipe};
/// use rust_decimal::Decimal;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, tag_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let detail = Recipe::create(&pool, user_id, CreateRecipe {
///     title: "Steak and mushroom sauce".to_string(),
///     time_minutes: 5,
///     price: Decimal::new(500, 2),
///     link: None,
///     tag_ids: vec![tag_id],
///     ingredient_ids: vec![],
/// }).await?;
///
/// assert_eq!(detail.recipe.to_string(), "Steak and mushroom sauce");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::{collections::HashSet, fmt};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ingredient::Ingredient, tag::Tag};

/// Largest price a `NUMERIC(5, 2)` column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

const RECIPE_COLUMNS: &str =
    "r.id, r.user_id, r.title, r.time_minutes, r.price, r.link, r.created_at, r.updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,

    #[serde(skip_serializing)]
    pub user_id: Uuid,

    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price with two decimal places, serialized as a string ("5.00")
    pub price: Decimal,

    /// Optional external link to the full recipe
    pub link: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Recipe row with the ids of its links, as returned by listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecipeListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub recipe: Recipe,

    #[serde(rename = "tags")]
    pub tag_ids: Vec<Uuid>,

    #[serde(rename = "ingredients")]
    pub ingredient_ids: Vec<Uuid>,
}

/// Recipe with its linked tags and ingredients embedded
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,

    pub tags: Vec<Tag>,

    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub ingredient_ids: Vec<Uuid>,
}

/// Partial update; `None` leaves a field untouched
///
/// `tag_ids` / `ingredient_ids` replace the whole link set when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    /// `Some(None)` clears the link
    pub link: Option<Option<String>>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub ingredient_ids: Option<Vec<Uuid>>,
}

/// Listing filter: a recipe matches if it links to any of the given ids
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tag_ids: Vec<Uuid>,
    pub ingredient_ids: Vec<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// Tag ids that do not exist or belong to another user
    #[error("Unknown tag ids: {0:?}")]
    UnknownTags(Vec<Uuid>),

    /// Ingredient ids that do not exist or belong to another user
    #[error("Unknown ingredient ids: {0:?}")]
    UnknownIngredients(Vec<Uuid>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks that a price fits `NUMERIC(5, 2)` and is not negative
///
/// ```
/// use recipe_shared::models::recipe::validate_price;
/// use rust_decimal::Decimal;
///
/// assert!(validate_price(&Decimal::new(500, 2)).is_ok());
/// assert!(validate_price(&Decimal::new(-1, 0)).is_err());
/// assert!(validate_price(&Decimal::new(1000, 0)).is_err());
/// assert!(validate_price(&Decimal::new(1001, 3)).is_err());
/// ```
pub fn validate_price(price: &Decimal) -> Result<(), String> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    if *price > MAX_PRICE {
        return Err("Ensure that there are no more than 5 digits in total.".to_string());
    }
    if price.normalize().scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }

    Ok(())
}

/// Ids from `ids` that are not rows of `table` owned by `user_id`
async fn unowned_ids(
    conn: &mut PgConnection,
    table: &str,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!("SELECT id FROM {table} WHERE user_id = $1 AND id = ANY($2)");
    let found: Vec<Uuid> = sqlx::query_scalar(&query)
        .bind(user_id)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

    Ok(missing_ids(ids, &found))
}

/// Requested ids absent from `found`, each once, in request order
fn missing_ids(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| !found.contains(id) && seen.insert(**id))
        .copied()
        .collect()
}

async fn set_tags(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), RecipeError> {
    let missing = unowned_ids(conn, "tags", user_id, tag_ids).await?;
    if !missing.is_empty() {
        return Err(RecipeError::UnknownTags(missing));
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn set_ingredients(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
    ingredient_ids: &[Uuid],
) -> Result<(), RecipeError> {
    let missing = unowned_ids(conn, "ingredients", user_id, ingredient_ids).await?;
    if !missing.is_empty() {
        return Err(RecipeError::UnknownIngredients(missing));
    }

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

impl Recipe {
    /// Creates a recipe and its links in one transaction
    ///
    /// # Errors
    ///
    /// `RecipeError::UnknownTags` / `UnknownIngredients` if any linked id is
    /// not owned by `user_id`; nothing is persisted in that case.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateRecipe,
    ) -> Result<RecipeDetail, RecipeError> {
        let mut tx = pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, time_minutes, price, link, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&data.title)
        .bind(data.time_minutes)
        .bind(data.price)
        .bind(&data.link)
        .fetch_one(&mut *tx)
        .await?;

        set_tags(&mut tx, user_id, recipe.id, &data.tag_ids).await?;
        set_ingredients(&mut tx, user_id, recipe.id, &data.ingredient_ids).await?;

        tx.commit().await?;
        info!(recipe_id = %recipe.id, user_id = %user_id, "Created recipe");

        Self::detail(pool, recipe).await.map_err(RecipeError::from)
    }

    /// Lists the owner's recipes, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeListItem>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {RECIPE_COLUMNS},
                   ARRAY(SELECT tag_id FROM recipe_tags WHERE recipe_id = r.id) AS tag_ids,
                   ARRAY(SELECT ingredient_id FROM recipe_ingredients WHERE recipe_id = r.id) AS ingredient_ids
            FROM recipes r
            WHERE r.user_id = $1
              AND (cardinality($2::uuid[]) = 0 OR EXISTS (
                    SELECT 1 FROM recipe_tags rt WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)))
              AND (cardinality($3::uuid[]) = 0 OR EXISTS (
                    SELECT 1 FROM recipe_ingredients ri WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)))
            ORDER BY r.created_at DESC, r.id
            "#
        );

        sqlx::query_as::<_, RecipeListItem>(&query)
            .bind(user_id)
            .bind(&filter.tag_ids)
            .bind(&filter.ingredient_ids)
            .fetch_all(pool)
            .await
    }

    /// Finds a recipe with its links; `None` if missing or not owned
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<RecipeDetail>, sqlx::Error> {
        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2");

        let recipe = sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        match recipe {
            Some(recipe) => Ok(Some(Self::detail(pool, recipe).await?)),
            None => Ok(None),
        }
    }

    /// Applies a partial update; `Ok(None)` if missing or not owned
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateRecipe,
    ) -> Result<Option<RecipeDetail>, RecipeError> {
        let mut tx = pool.begin().await?;

        let (link_present, link) = match data.link {
            Some(link) => (true, link),
            None => (false, None),
        };

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET title = COALESCE($3, title),
                time_minutes = COALESCE($4, time_minutes),
                price = COALESCE($5, price),
                link = CASE WHEN $6 THEN $7 ELSE link END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, time_minutes, price, link, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.time_minutes)
        .bind(data.price)
        .bind(link_present)
        .bind(link)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(recipe) = recipe else {
            debug!(recipe_id = %id, "Recipe not found for update");
            return Ok(None);
        };

        if let Some(tag_ids) = &data.tag_ids {
            set_tags(&mut tx, user_id, recipe.id, tag_ids).await?;
        }
        if let Some(ingredient_ids) = &data.ingredient_ids {
            set_ingredients(&mut tx, user_id, recipe.id, ingredient_ids).await?;
        }

        tx.commit().await?;

        Ok(Some(Self::detail(pool, recipe).await?))
    }

    /// Deletes a recipe and its links; returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn detail(pool: &PgPool, recipe: Recipe) -> Result<RecipeDetail, sqlx::Error> {
        let tags = Tag::list_for_recipe(pool, recipe.id).await?;
        let ingredients = Ingredient::list_for_recipe(pool, recipe.id).await?;

        Ok(RecipeDetail {
            recipe,
            tags,
            ingredients,
        })
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Steak and mushroom sauce".to_string(),
            time_minutes: 5,
            price: Decimal::new(500, 2),
            link: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_recipe_display_is_title() {
        assert_eq!(sample_recipe().to_string(), "Steak and mushroom sauce");
    }

    #[test]
    fn test_missing_ids_reported_once() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(missing_ids(&[a, b, a, c, a], &[b]), vec![a, c]);
        assert!(missing_ids(&[b, b], &[b]).is_empty());
    }

    #[test]
    fn test_max_price() {
        assert_eq!(MAX_PRICE.to_string(), "999.99");
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(&Decimal::ZERO).is_ok());
        assert!(validate_price(&Decimal::new(500, 2)).is_ok());
        assert!(validate_price(&MAX_PRICE).is_ok());
        // Trailing zeros beyond two places are fine
        assert!(validate_price(&Decimal::new(5000, 3)).is_ok());

        assert!(validate_price(&Decimal::new(-1, 2)).is_err());
        assert!(validate_price(&Decimal::new(100_000, 2)).is_err());
        assert!(validate_price(&Decimal::new(5001, 3)).is_err());
    }

    #[test]
    fn test_recipe_serialization() {
        let value = serde_json::to_value(sample_recipe()).unwrap();
        assert_eq!(value["title"], "Steak and mushroom sauce");
        assert_eq!(value["price"], "5.00");
        assert_eq!(value["time_minutes"], 5);
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_list_item_flattens_recipe() {
        let tag_id = Uuid::new_v4();
        let item = RecipeListItem {
            recipe: sample_recipe(),
            tag_ids: vec![tag_id],
            ingredient_ids: vec![],
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["title"], "Steak and mushroom sauce");
        assert_eq!(value["tags"][0], tag_id.to_string());
        assert_eq!(value["ingredients"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_update_recipe_default_changes_nothing() {
        let update = UpdateRecipe::default();
        assert!(update.title.is_none());
        assert!(update.link.is_none());
        assert!(update.tag_ids.is_none());
        assert!(update.ingredient_ids.is_none());
    }
}
