/// Ingredient model
///
/// Same ownership rules as tags: one owner per row, every query filtered by
/// `user_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (name <> ''),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIngredient {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIngredient {
    pub name: Option<String>,
}

impl Ingredient {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateIngredient,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await
    }

    /// Lists the owner's ingredients, name descending
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name, created_at
            FROM ingredients
            WHERE user_id = $1
            ORDER BY name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, user_id, name, created_at FROM ingredients WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateIngredient,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
            SET name = COALESCE($3, name)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ingredients linked to a recipe, name ascending
    pub async fn list_for_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT i.id, i.user_id, i.name, i.created_at
            FROM ingredients i
            JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
