/// Tag model and database operations
///
/// Tags label recipes ("Vegan", "Dessert"). Each tag belongs to exactly one
/// user and every query is scoped by that owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
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

/// Tag owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,

    /// Owner
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
}

/// Input for updating a tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
}

impl Tag {
    /// Creates a tag owned by `user_id`
    pub async fn create(pool: &PgPool, user_id: Uuid, data: CreateTag) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .fetch_one(pool)
        .await
    }

    /// Lists the owner's tags, name descending
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
            WHERE user_id = $1
            ORDER BY name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Finds a tag; `None` if missing or owned by someone else
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, created_at FROM tags WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Updates a tag; `None` if missing or owned by someone else
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTag,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
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

    /// Deletes a tag; returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tags linked to a recipe, name ascending
    pub async fn list_for_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_display_is_name() {
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Vegan".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(tag.to_string(), "Vegan");
        assert_eq!(format!("{}", tag), tag.name);
    }

    #[test]
    fn test_serialized_tag_hides_owner() {
        let tag = Tag {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Dessert".to_string(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&tag).unwrap();
        assert_eq!(value["name"], "Dessert");
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_update_tag_default() {
        assert!(UpdateTag::default().name.is_none());
    }
}
