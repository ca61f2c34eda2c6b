//! Command results: serialized as-is into the JSON envelope, rendered as text otherwise.

use std::fmt::Write as _;

use serde::Serialize;

use crate::auth::User;
use crate::output::types::TextView;
use crate::recipe::{Difficulty, Recipe};
use crate::scale::ViewSession;
use crate::store::{Served, Tier};

const CARD_TAGS: usize = 2;

fn tier_note(out: &mut String, tier: Tier, remote_error: Option<&str>) {
    match tier {
        Tier::Remote => {}
        Tier::Local => { let _ = writeln!(out, "(local copy: {})", remote_error.unwrap_or("remote store unavailable")); }
        Tier::Empty => { let _ = writeln!(out, "(no store reachable: {})", remote_error.unwrap_or("unknown error")); }
    }
}

fn minutes(total: u32) -> Option<u32> { if total > 0 { Some(total) } else { None } }

#[derive(Debug, Serialize)]
pub struct SavedRecipe {
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub recipe: Recipe,
}

impl From<Served<Recipe>> for SavedRecipe {
    fn from(s: Served<Recipe>) -> Self {
        SavedRecipe { tier: s.tier, remote_error: s.remote_error, recipe: s.value }
    }
}

impl TextView for SavedRecipe {
    fn render_text(&self) -> String {
        let r = &self.recipe;
        let mut out = format!("Saved \"{}\" ({})\n", r.title, r.id);
        let _ = writeln!(out, "  {} ingredients, {} steps, serves {}, {}", r.ingredients.len(), r.instructions.len(), r.servings, r.difficulty);
        tier_note(&mut out, self.tier, self.remote_error.as_deref());
        out
    }
}

/// One entry of the recipe grid.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCard {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u32>,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub more_tags: usize,
    pub from_url: bool,
}

impl From<&Recipe> for RecipeCard {
    fn from(r: &Recipe) -> Self {
        RecipeCard {
            id: r.id.clone(),
            title: r.title.clone(),
            description: r.description.clone(),
            total_time: minutes(r.total_time()),
            servings: r.servings,
            difficulty: r.difficulty,
            tags: r.tags.iter().take(CARD_TAGS).cloned().collect(),
            more_tags: r.tags.len().saturating_sub(CARD_TAGS),
            from_url: r.url.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub count: usize,
    pub recipes: Vec<RecipeCard>,
}

impl RecipeList {
    pub fn new(query: Option<String>, served: &Served<Vec<Recipe>>, matches: &[&Recipe]) -> Self {
        RecipeList {
            query,
            tier: served.tier,
            remote_error: served.remote_error.clone(),
            count: matches.len(),
            recipes: matches.iter().map(|r| RecipeCard::from(*r)).collect(),
        }
    }
}

impl TextView for RecipeList {
    fn render_text(&self) -> String {
        let mut out = String::new();
        tier_note(&mut out, self.tier, self.remote_error.as_deref());
        if self.count == 0 && self.query.is_none() {
            out.push_str("No recipes yet. Add one with `recipes add <url>` or `recipes new --title <title>`.\n");
            return out;
        }
        for c in &self.recipes {
            let mut line = format!("{}  [{}]", c.title, c.difficulty);
            if let Some(t) = c.total_time { let _ = write!(line, "  {t}m"); }
            let _ = write!(line, "  serves {}", c.servings);
            for tag in &c.tags { let _ = write!(line, "  #{tag}"); }
            if c.more_tags > 0 { let _ = write!(line, "  +{}", c.more_tags); }
            if c.from_url { line.push_str("  (url)"); }
            let _ = writeln!(out, "{line}");
            let _ = writeln!(out, "    {}", c.id);
        }
        let _ = writeln!(out, "{} recipe{} found", self.count, if self.count == 1 { "" } else { "s" });
        out
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientLine {
    pub id: String,
    pub quantity: String,
    pub unit: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub checked: bool,
}

/// Detail view of one recipe at the session's multiplier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub multiplier: f64,
    pub can_decrease: bool,
    pub base_servings: u32,
    pub servings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u32>,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub ingredients: Vec<IngredientLine>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

impl RecipeDetail {
    /// `served` is the load `recipe` came from; its tier and remote error are carried over.
    pub fn new<T>(recipe: &Recipe, session: &ViewSession, served: &Served<T>) -> Self {
        RecipeDetail {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            url: recipe.url.clone(),
            image_url: recipe.image_url.clone(),
            multiplier: session.multiplier(),
            can_decrease: session.can_decrease(),
            base_servings: recipe.servings,
            servings: session.servings(recipe),
            total_time: minutes(recipe.total_time()),
            difficulty: recipe.difficulty,
            tags: recipe.tags.clone(),
            ingredients: recipe
                .ingredients
                .iter()
                .map(|i| IngredientLine {
                    id: i.id.clone(),
                    quantity: session.quantity(i.amount),
                    unit: i.unit.clone(),
                    name: i.name.clone(),
                    notes: i.notes.clone(),
                    checked: session.is_checked(&i.id),
                })
                .collect(),
            instructions: recipe.numbered_steps().map(|(n, s)| format!("{n}. {s}")).collect(),
            notes: recipe.notes.clone(),
            tier: served.tier,
            remote_error: served.remote_error.clone(),
        }
    }
}

impl TextView for RecipeDetail {
    fn render_text(&self) -> String {
        let mut out = String::new();
        tier_note(&mut out, self.tier, self.remote_error.as_deref());
        let _ = writeln!(out, "{}", self.title);
        if let Some(d) = &self.description { let _ = writeln!(out, "{d}"); }
        let _ = writeln!(out);
        let floor = if self.can_decrease { "" } else { ", minimum" };
        let _ = writeln!(out, "Servings:   {} (x{}{floor})", self.servings, self.multiplier);
        if let Some(t) = self.total_time { let _ = writeln!(out, "Total time: {t}m"); }
        let _ = writeln!(out, "Difficulty: {}", self.difficulty);
        if !self.tags.is_empty() { let _ = writeln!(out, "Tags:       {}", self.tags.join(", ")); }
        if let Some(u) = &self.url { let _ = writeln!(out, "Original:   {u}"); }

        let _ = writeln!(out, "\nIngredients");
        for i in &self.ingredients {
            let mark = if i.checked { "[x]" } else { "[ ]" };
            let qty = if i.unit.is_empty() { i.quantity.clone() } else { format!("{} {}", i.quantity, i.unit) };
            let _ = write!(out, "  {mark} {qty} {}", i.name);
            if let Some(n) = &i.notes { let _ = write!(out, " ({n})"); }
            let _ = writeln!(out, "  <{}>", i.id);
        }

        let _ = writeln!(out, "\nInstructions");
        for step in &self.instructions {
            let _ = writeln!(out, "  {step}");
        }

        let _ = writeln!(out, "\nPersonal notes");
        match &self.notes {
            Some(n) => { let _ = writeln!(out, "{n}"); }
            None => { let _ = writeln!(out, "  No notes yet. Use `recipes notes {} <text>` to add some.", self.id); }
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct NotesUpdate {
    pub changed: bool,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub recipe: Recipe,
}

impl TextView for NotesUpdate {
    fn render_text(&self) -> String {
        let mut out = if !self.changed {
            format!("Notes for \"{}\" unchanged\n", self.recipe.title)
        } else if self.recipe.notes.is_some() {
            format!("Saved notes for \"{}\"\n", self.recipe.title)
        } else {
            format!("Cleared notes for \"{}\"\n", self.recipe.title)
        };
        tier_note(&mut out, self.tier, self.remote_error.as_deref());
        out
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<Option<&User>> for Account {
    fn from(user: Option<&User>) -> Self {
        Account {
            signed_in: user.is_some(),
            email: user.map(|u| u.email().to_string()),
            user_id: user.map(|u| u.id().to_string()),
        }
    }
}

impl TextView for Account {
    fn render_text(&self) -> String {
        match (&self.email, &self.user_id) {
            (Some(email), Some(id)) => format!("Signed in as {email} ({id})\n"),
            _ => "Not signed in\n".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InitSummary {
    pub schema: &'static str,
    pub migrations: usize,
    pub data_dir: String,
}

impl TextView for InitSummary {
    fn render_text(&self) -> String {
        format!(
            "Database initialized successfully ({} migrations, schema {})\nLocal data in {}\n",
            self.migrations, self.schema, self.data_dir
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;
    use chrono::Utc;

    fn recipe(title: &str, tags: &[&str]) -> Recipe {
        let mut r = Recipe::new("u1", title, Utc::now());
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    fn served(v: Vec<Recipe>, tier: Tier) -> Served<Vec<Recipe>> {
        Served { value: v, tier, remote_error: None }
    }

    #[test]
    fn card_keeps_two_tags_and_counts_the_rest() {
        let mut r = recipe("Curry", &["spicy", "dinner", "vegan", "quick"]);
        r.prep_time = Some(10);
        r.cook_time = Some(25);
        let card = RecipeCard::from(&r);
        assert_eq!(card.tags, vec!["spicy", "dinner"]);
        assert_eq!(card.more_tags, 2);
        assert_eq!(card.total_time, Some(35));
        assert!(!card.from_url);
        assert_eq!(RecipeCard::from(&recipe("Toast", &[])).total_time, None);
    }

    #[test]
    fn list_pluralizes_count() {
        let s = served(vec![recipe("A", &[]), recipe("B", &[])], Tier::Remote);
        let one: Vec<&Recipe> = s.value.iter().take(1).collect();
        let text = RecipeList::new(Some("a".into()), &s, &one).render_text();
        assert!(text.ends_with("1 recipe found\n"));

        let all: Vec<&Recipe> = s.value.iter().collect();
        let text = RecipeList::new(None, &s, &all).render_text();
        assert!(text.ends_with("2 recipes found\n"));
        assert!(text.contains("A  [medium]  serves 4"));
    }

    #[test]
    fn empty_list_without_query_shows_hint() {
        let s = served(Vec::new(), Tier::Local);
        let text = RecipeList::new(None, &s, &[]).render_text();
        assert!(text.starts_with("(local copy"));
        assert!(text.contains("No recipes yet"));
        let text = RecipeList::new(Some("x".into()), &s, &[]).render_text();
        assert!(text.ends_with("0 recipes found\n"));
    }

    #[test]
    fn detail_scales_and_marks_checked() {
        let mut r = recipe("Bread", &[]);
        r.servings = 3;
        r.ingredients = vec![
            Ingredient { id: "ing_0".into(), name: "Flour".into(), amount: 2.0, unit: "cups".into(), notes: None },
            Ingredient { id: "ing_1".into(), name: "Salt".into(), amount: 1.0, unit: "".into(), notes: Some("flaky".into()) },
        ];
        r.instructions = vec!["Knead".into(), "Bake".into()];
        let mut session = ViewSession::new();
        session.open(&r);
        session.adjust(-0.5);
        session.toggle("ing_1");

        let view = RecipeDetail::new(&r, &session, &served(vec![], Tier::Remote));
        assert_eq!(view.servings, 2);
        assert_eq!(view.ingredients[0].quantity, "1.0");
        assert!(view.ingredients[1].checked);
        assert!(!view.can_decrease);

        let text = view.render_text();
        assert!(text.contains("[ ] 1.0 cups Flour"));
        assert!(text.contains("[x] 0.5 Salt (flaky)"));
        assert!(text.contains("  2. Bake"));
        assert!(text.contains("No notes yet"));
    }

    #[test]
    fn detail_text_names_the_remote_failure() {
        let r = recipe("Bread", &[]);
        let mut session = ViewSession::new();
        session.open(&r);
        let from_local = Served { value: vec![r.clone()], tier: Tier::Local, remote_error: Some("pool timed out".into()) };

        let view = RecipeDetail::new(&r, &session, &from_local);
        assert_eq!(view.remote_error.as_deref(), Some("pool timed out"));
        assert!(view.render_text().starts_with("(local copy: pool timed out)\n"));
    }

    #[test]
    fn account_text() {
        assert_eq!(Account::from(None).render_text(), "Not signed in\n");
        let u = User::for_tests("id-1", "cook@example.com");
        assert_eq!(Account::from(Some(&u)).render_text(), "Signed in as cook@example.com (id-1)\n");
    }
}
