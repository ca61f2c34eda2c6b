use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::RemoteError;
use crate::recipe::Recipe;

use super::codec::RecipeRow;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All recipes owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Recipe>, RemoteError>;
    async fn insert(&self, recipe: &Recipe) -> Result<Recipe, RemoteError>;
    /// Point update of notes + updated_at; the stored recipe is returned.
    async fn update_notes(
        &self,
        user_id: &str,
        id: &str,
        notes: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Recipe, RemoteError>;
}

const COLUMNS: &str = "id, user_id, title, description, url, image_url, prep_time, cook_time, servings, \
     difficulty, ingredients, instructions, notes, tags, created_at, updated_at";

pub struct PgRemoteStore {
    pool: PgPool,
}

impl PgRemoteStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Recipe>, RemoteError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM recipes.recipe WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<RecipeRow> = sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(Recipe::try_from).collect()
    }

    async fn insert(&self, recipe: &Recipe) -> Result<Recipe, RemoteError> {
        let row = RecipeRow::from(recipe);
        let sql = format!(
            r#"
            INSERT INTO recipes.recipe ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {COLUMNS}
            "#
        );
        let stored: RecipeRow = sqlx::query_as(&sql)
            .bind(row.id)
            .bind(row.user_id)
            .bind(row.title)
            .bind(row.description)
            .bind(row.url)
            .bind(row.image_url)
            .bind(row.prep_time)
            .bind(row.cook_time)
            .bind(row.servings)
            .bind(row.difficulty)
            .bind(row.ingredients)
            .bind(row.instructions)
            .bind(row.notes)
            .bind(row.tags)
            .bind(row.created_at)
            .bind(row.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Recipe::try_from(stored)
    }

    async fn update_notes(
        &self,
        user_id: &str,
        id: &str,
        notes: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Recipe, RemoteError> {
        let sql = format!(
            r#"
            UPDATE recipes.recipe
               SET notes = $3, updated_at = $4
             WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        );
        let row: Option<RecipeRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(user_id)
            .bind(notes)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => Recipe::try_from(r),
            None => Err(RemoteError::NotFound(id.to_string())),
        }
    }
}
