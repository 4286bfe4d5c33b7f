/// Database models
///
/// Every model exposes its queries as associated functions taking an explicit
/// `&PgPool`. Owned records (tags, ingredients, recipes) additionally take the
/// owner's user id, and no query touches rows of another owner.
///
/// # Models
///
/// - `user`: Accounts, email normalization, `create_user` / `create_superuser`
/// - `token`: One opaque auth token per user
/// - `tag`: Recipe tags
/// - `ingredient`: Recipe ingredients
/// - `recipe`: Recipes with their tag and ingredient links
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::tag::{CreateTag, Tag};
/// use recipe_shared::models::user::{ExtraFields, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create_user(&pool, Some("cook@example.com"), "883214", ExtraFields::default()).await?;
/// let tag = Tag::create(&pool, user.id, CreateTag { name: "Vegan".to_string() }).await?;
/// assert_eq!(tag.to_string(), "Vegan");
/// # Ok(())
/// # }
/// ```

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod token;
pub mod user;
