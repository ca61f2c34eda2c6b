use crate::recipe::Recipe;

/// Case-insensitive substring filter over title, description, ingredient names and tags.
/// Order-preserving; a blank query returns everything.
pub fn filter<'a>(recipes: &'a [Recipe], query: &str) -> Vec<&'a Recipe> {
    if query.trim().is_empty() {
        return recipes.iter().collect();
    }
    let q = query.to_lowercase();
    recipes.iter().filter(|r| matches(r, &q)).collect()
}

// `q` must already be lowercased
fn matches(recipe: &Recipe, q: &str) -> bool {
    recipe.title.to_lowercase().contains(q)
        || recipe.description.as_deref().is_some_and(|d| d.to_lowercase().contains(q))
        || recipe.ingredients.iter().any(|i| i.name.to_lowercase().contains(q))
        || recipe.tags.iter().any(|t| t.to_lowercase().contains(q))
}
