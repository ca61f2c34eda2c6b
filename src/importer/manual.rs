use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::User;
use crate::error::ValidationError;
use crate::recipe::{non_blank, Difficulty, Ingredient, Recipe, DEFAULT_SERVINGS};

/// Manual entry as typed: numbers stay raw strings until materialized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualForm {
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub difficulty: String,
    pub ingredients: Vec<IngredientForm>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngredientForm {
    pub name: String,
    pub amount: String,
    pub unit: String,
    pub notes: String,
}

impl IngredientForm {
    /// Parses the CLI shorthand `amount|unit|name|notes`; a value without `|` is just a name.
    pub fn parse_spec(spec: &str) -> Self {
        let parts: Vec<&str> = spec.splitn(4, '|').map(str::trim).collect();
        match parts.as_slice() {
            [name] => IngredientForm { name: name.to_string(), ..Default::default() },
            [amount, unit, name, rest @ ..] => IngredientForm {
                amount: amount.to_string(),
                unit: unit.to_string(),
                name: name.to_string(),
                notes: rest.first().map(|s| s.to_string()).unwrap_or_default(),
            },
            [amount, name] => IngredientForm { amount: amount.to_string(), name: name.to_string(), ..Default::default() },
            [] => IngredientForm::default(),
        }
    }
}

/// Build a recipe from form input. Only the title is validated; malformed numbers
/// fall back to defaults, blank ingredient rows and blank steps are dropped.
pub fn recipe_from_form(form: ManualForm, user: &User, now: DateTime<Utc>) -> Result<Recipe, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() { return Err(ValidationError::MissingTitle); }

    let mut recipe = Recipe::new(user.id(), title, now);
    recipe.description = non_blank(Some(form.description.trim().to_string()));
    recipe.prep_time = parse_minutes(&form.prep_time);
    recipe.cook_time = parse_minutes(&form.cook_time);
    recipe.servings = parse_int(&form.servings)
        .filter(|v| *v >= 1)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(DEFAULT_SERVINGS);
    recipe.difficulty = Difficulty::parse_or_default(Some(&form.difficulty));
    recipe.ingredients = form
        .ingredients
        .into_iter()
        .enumerate()
        .map(|(row, i)| Ingredient {
            id: Ingredient::id_for_index(row),
            name: i.name.trim().to_string(),
            amount: parse_amount(&i.amount),
            unit: i.unit.trim().to_string(),
            notes: non_blank(Some(i.notes.trim().to_string())),
        })
        .filter(|i| !i.name.is_empty())
        .collect();
    recipe.instructions = form
        .instructions
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    recipe.tags = dedupe_tags(form.tags);
    Ok(recipe)
}

fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in tags {
        let t = t.trim();
        if !t.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(t)) { out.push(t.to_string()); }
    }
    out
}

// zero, negative and unparseable all mean "not given"
fn parse_minutes(s: &str) -> Option<u32> {
    parse_int(s).filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok())
}

pub fn parse_amount(s: &str) -> f64 {
    parse_float(s).filter(|v| v.is_finite() && *v > 0.0).unwrap_or(1.0)
}

/// Leading-integer parse: "12 min" -> 12, "abc" -> None.
pub fn parse_int(s: &str) -> Option<i64> {
    let prefix = numeric_prefix(s, false)?;
    prefix.parse().ok()
}

/// Leading-decimal parse: "1.5 cups" -> 1.5, ".5" -> 0.5, "abc" -> None.
pub fn parse_float(s: &str) -> Option<f64> {
    let prefix = numeric_prefix(s, true)?;
    prefix.parse().ok()
}

fn numeric_prefix(s: &str, fractional: bool) -> Option<&str> {
    let s = s.trim_start();
    let b = s.as_bytes();
    let mut end = 0;
    if matches!(b.first(), Some(b'+' | b'-')) { end = 1; }

    let int_start = end;
    while end < b.len() && b[end].is_ascii_digit() { end += 1; }
    let mut digits = end - int_start;

    if fractional {
        if end < b.len() && b[end] == b'.' {
            let frac_start = end + 1;
            let mut k = frac_start;
            while k < b.len() && b[k].is_ascii_digit() { k += 1; }
            if k > frac_start {
                digits += k - frac_start;
                end = k;
            }
        }
        if digits > 0 && end < b.len() && (b[end] == b'e' || b[end] == b'E') {
            let mut k = end + 1;
            if k < b.len() && (b[k] == b'+' || b[k] == b'-') { k += 1; }
            let exp_start = k;
            while k < b.len() && b[k].is_ascii_digit() { k += 1; }
            if k > exp_start { end = k; }
        }
    }

    if digits == 0 { None } else { Some(&s[..end]) }
}
