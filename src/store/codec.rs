use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::FromRow;

use crate::error::RemoteError;
use crate::recipe::{Difficulty, Ingredient, Recipe, DEFAULT_SERVINGS};

/// Row shape of `recipes.recipe`. Sequence fields are JSON text columns.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = RemoteError;

    fn try_from(r: RecipeRow) -> Result<Self, Self::Error> {
        Ok(Recipe {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            url: r.url,
            image_url: r.image_url,
            prep_time: r.prep_time.and_then(|v| u32::try_from(v).ok()),
            cook_time: r.cook_time.and_then(|v| u32::try_from(v).ok()),
            servings: r.servings.and_then(|v| u32::try_from(v).ok()).filter(|v| *v >= 1).unwrap_or(DEFAULT_SERVINGS),
            difficulty: Difficulty::parse_or_default(r.difficulty.as_deref()),
            ingredients: decode_list::<Ingredient>(r.ingredients.as_deref())?,
            instructions: decode_list::<String>(r.instructions.as_deref())?,
            notes: r.notes,
            tags: decode_list::<String>(r.tags.as_deref())?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl From<&Recipe> for RecipeRow {
    fn from(r: &Recipe) -> Self {
        RecipeRow {
            id: r.id.clone(),
            user_id: r.user_id.clone(),
            title: r.title.clone(),
            description: r.description.clone(),
            url: r.url.clone(),
            image_url: r.image_url.clone(),
            prep_time: r.prep_time.and_then(|v| i32::try_from(v).ok()),
            cook_time: r.cook_time.and_then(|v| i32::try_from(v).ok()),
            servings: i32::try_from(r.servings).ok(),
            difficulty: Some(r.difficulty.as_str().to_string()),
            ingredients: Some(encode_list(&r.ingredients)),
            instructions: Some(encode_list(&r.instructions)),
            notes: r.notes.clone(),
            tags: Some(encode_list(&r.tags)),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// NULL and empty text both mean an empty list
fn decode_list<T: DeserializeOwned>(raw: Option<&str>) -> Result<Vec<T>, RemoteError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s).map_err(RemoteError::Decode),
    }
}

fn encode_list<T: serde::Serialize>(items: &[T]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RecipeRow {
        RecipeRow {
            id: "recipe_1".into(),
            user_id: "u1".into(),
            title: "Stew".into(),
            description: None,
            url: None,
            image_url: None,
            prep_time: Some(15),
            cook_time: Some(-1),
            servings: Some(0),
            difficulty: Some("hard".into()),
            ingredients: Some(r#"[{"id":"ing_0","name":"Beef","amount":500,"unit":"g"}]"#.into()),
            instructions: Some(r#"["Brown","Simmer"]"#.into()),
            notes: Some("family favourite".into()),
            tags: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn decodes_encoded_columns() {
        let r = Recipe::try_from(row()).unwrap();
        assert_eq!(r.ingredients.len(), 1);
        assert_eq!(r.ingredients[0].name, "Beef");
        assert_eq!(r.ingredients[0].amount, 500.0);
        assert_eq!(r.instructions, vec!["Brown", "Simmer"]);
        assert!(r.tags.is_empty());
        assert_eq!(r.difficulty, Difficulty::Hard);
        assert_eq!(r.prep_time, Some(15));
        assert_eq!(r.cook_time, None);
        assert_eq!(r.servings, 4);
    }

    #[test]
    fn malformed_column_is_a_decode_error() {
        let mut bad = row();
        bad.instructions = Some("not json".into());
        assert!(matches!(Recipe::try_from(bad), Err(RemoteError::Decode(_))));
    }

    #[test]
    fn encodes_sequences_as_json_text() {
        let r = Recipe::try_from(row()).unwrap();
        let encoded = RecipeRow::from(&r);
        assert_eq!(encoded.instructions.as_deref(), Some(r#"["Brown","Simmer"]"#));
        assert_eq!(encoded.tags.as_deref(), Some("[]"));
        let back = Recipe::try_from(encoded).unwrap();
        assert_eq!(back, r);
    }
}
