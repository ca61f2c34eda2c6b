//! Recipe import: from a URL (page extraction + structured inference) or from a
//! hand-filled form. Both paths end in [`RecipeStore::save`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Instrument, Span};
use url::Url;

use crate::auth::User;
use crate::error::{ExtractionError, ImportError};
use crate::recipe::{non_blank, Difficulty, Ingredient, Recipe, DEFAULT_SERVINGS};
use crate::store::{RecipeStore, Served};
use crate::telemetry::ctx::{LogCtx, OpMarker};
use crate::telemetry::ops::add::{Add as AddOp, Phase as AddPhase};
use crate::telemetry::ops::manual::{Manual as ManualOp, Phase as ManualPhase};

pub mod extract;
pub mod infer;
pub mod manual;

pub use extract::{ContentExtractor, HttpExtractor};
pub use infer::{ExtractedIngredient, ExtractedRecipe, LlmRecipeInference, RecipeInference};
pub use manual::{IngredientForm, ManualForm};

pub struct Importer {
    store: RecipeStore,
    extractor: Arc<dyn ContentExtractor>,
    inference: Arc<dyn RecipeInference>,
}

impl Importer {
    pub fn new(store: RecipeStore, extractor: Arc<dyn ContentExtractor>, inference: Arc<dyn RecipeInference>) -> Self {
        Self { store, extractor, inference }
    }

    /// Fetch `url`, infer a recipe from the page and save it for `user`.
    /// A page without a recipe title is rejected before anything is persisted.
    pub async fn import_from_url(
        &self,
        url: &str,
        user: &User,
        log: Option<&LogCtx<AddOp>>,
    ) -> Result<Served<Recipe>, ImportError> {
        let parsed = {
            let _validate = phase_span(log, &AddPhase::Validate).entered();
            parse_url(url)?
        };

        let content = self.extractor.extract(&parsed).instrument(phase_span(log, &AddPhase::Extract)).await?;
        if let Some(ctx) = log { ctx.extracted(content.chars().count()); }

        let extracted = self.inference.infer(&content).instrument(phase_span(log, &AddPhase::Infer)).await?;
        let recipe = recipe_from_extracted(extracted, url, user, Utc::now())?;

        let served = self.store.save(recipe).instrument(phase_span(log, &AddPhase::Persist)).await?;
        if let Some(ctx) = log {
            ctx.served(&served);
            ctx.imported(&served.value, served.tier);
        }
        Ok(served)
    }

    /// Save a recipe typed in by hand. Only a blank title is rejected.
    pub async fn import_manual(
        &self,
        form: ManualForm,
        user: &User,
        log: Option<&LogCtx<ManualOp>>,
    ) -> Result<Served<Recipe>, ImportError> {
        let recipe = {
            let _parse = phase_span(log, &ManualPhase::Parse).entered();
            manual::recipe_from_form(form, user, Utc::now())?
        };
        let served = self.store.save(recipe).instrument(phase_span(log, &ManualPhase::Persist)).await?;
        if let Some(ctx) = log { ctx.served(&served); }
        Ok(served)
    }
}

fn phase_span<O: OpMarker>(log: Option<&LogCtx<O>>, phase: &O::Phase) -> Span {
    log.map(|ctx| ctx.span(phase)).unwrap_or_else(Span::none)
}

fn parse_url(raw: &str) -> Result<Url, ExtractionError> {
    let url = Url::parse(raw.trim()).map_err(|_| ExtractionError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ExtractionError::InvalidUrl(raw.to_string())),
    }
}

/// Apply defaults to an inference result. `url` is stored exactly as requested.
pub fn recipe_from_extracted(
    x: ExtractedRecipe,
    url: &str,
    user: &User,
    now: DateTime<Utc>,
) -> Result<Recipe, ExtractionError> {
    let title = x.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() || title.eq_ignore_ascii_case("null") {
        return Err(ExtractionError::NotARecipe);
    }

    let mut recipe = Recipe::new(user.id(), title, now);
    recipe.url = Some(url.to_string());
    recipe.description = non_blank(x.description.map(|d| d.trim().to_string()));
    recipe.image_url = non_blank(x.image_url.map(|u| u.trim().to_string()));
    recipe.prep_time = whole_minutes(x.prep_time);
    recipe.cook_time = whole_minutes(x.cook_time);
    recipe.servings = x
        .servings
        .filter(|s| s.is_finite() && s.round() >= 1.0)
        .map(|s| s.round() as u32)
        .unwrap_or(DEFAULT_SERVINGS);
    recipe.difficulty = Difficulty::parse_or_default(x.difficulty.as_deref());
    recipe.ingredients = x
        .ingredients
        .unwrap_or_default()
        .into_iter()
        .filter_map(|ExtractedIngredient { name, amount, unit, notes }| {
            let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
            Some((name, amount, unit, notes))
        })
        .enumerate()
        .map(|(idx, (name, amount, unit, notes))| Ingredient {
            id: Ingredient::id_for_index(idx),
            name,
            amount: amount.filter(|a| a.is_finite() && *a > 0.0).unwrap_or(1.0),
            unit: unit.map(|u| u.trim().to_string()).unwrap_or_default(),
            notes: non_blank(notes.map(|n| n.trim().to_string())),
        })
        .collect();
    recipe.instructions = x
        .instructions
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Ok(recipe)
}

fn whole_minutes(v: Option<f64>) -> Option<u32> {
    v.filter(|m| m.is_finite() && *m >= 0.0).map(|m| m.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::extract::testing::StaticExtractor;
    use crate::importer::infer::testing::StaticInference;
    use crate::store::local::testing::MemoryFallback;
    use crate::store::remote::testing::MemoryRemote;
    use crate::store::{RemoteStore, Tier};

    struct Harness {
        remote: Arc<MemoryRemote>,
        local: Arc<MemoryFallback>,
        extractor: Arc<StaticExtractor>,
        inference: Arc<StaticInference>,
        importer: Importer,
    }

    fn harness(remote: MemoryRemote, extractor: StaticExtractor, inference: StaticInference) -> Harness {
        let remote = Arc::new(remote);
        let local = Arc::new(MemoryFallback::default());
        let extractor = Arc::new(extractor);
        let inference = Arc::new(inference);
        let store = RecipeStore::new(Some(remote.clone() as Arc<dyn RemoteStore>), local.clone());
        let importer = Importer::new(store, extractor.clone(), inference.clone());
        Harness { remote, local, extractor, inference, importer }
    }

    fn user() -> User { User::for_tests("u1", "u1@example.com") }

    fn ingredient(name: Option<&str>, amount: Option<f64>) -> ExtractedIngredient {
        ExtractedIngredient { name: name.map(str::to_string), amount, ..Default::default() }
    }

    fn pancakes() -> ExtractedRecipe {
        ExtractedRecipe {
            title: Some("Pancakes".into()),
            description: Some("".into()),
            prep_time: Some(9.6),
            cook_time: Some(-5.0),
            servings: Some(0.0),
            difficulty: Some("tricky".into()),
            ingredients: Some(vec![
                ingredient(Some("Flour"), Some(200.0)),
                ingredient(None, Some(3.0)),
                ingredient(Some("  "), None),
                ingredient(Some("Milk"), None),
            ]),
            instructions: Some(vec!["Mix".into(), " ".into(), "Fry".into()]),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn url_import_applies_defaults_and_persists() {
        let h = harness(MemoryRemote::default(), StaticExtractor::returning("page text"), StaticInference::returning(pancakes()));
        let served = h.importer.import_from_url("https://cook.test/pancakes", &user(), None).await.unwrap();
        assert_eq!(served.tier, Tier::Remote);

        let r = served.value;
        assert_eq!(r.title, "Pancakes");
        assert_eq!(r.url.as_deref(), Some("https://cook.test/pancakes"));
        assert_eq!(r.description, None);
        assert_eq!(r.prep_time, Some(10));
        assert_eq!(r.cook_time, None);
        assert_eq!(r.servings, 4);
        assert_eq!(r.difficulty, Difficulty::Medium);
        assert_eq!(r.notes, None);
        assert!(r.tags.is_empty());
        assert_eq!(r.created_at, r.updated_at);

        let ids: Vec<&str> = r.ingredients.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["ing_0", "ing_1"]);
        assert_eq!(r.ingredients[1].name, "Milk");
        assert_eq!(r.ingredients[1].amount, 1.0);
        assert_eq!(r.ingredients[1].unit, "");
        assert_eq!(r.instructions, vec!["Mix", "Fry"]);

        assert_eq!(h.remote.calls(), vec!["insert"]);
        assert_eq!(h.extractor.urls(), vec!["https://cook.test/pancakes"]);
        assert_eq!(h.inference.inputs.lock().unwrap().as_slice(), ["page text".to_string()]);
    }

    #[tokio::test]
    async fn missing_title_is_extraction_error_without_persistence() {
        let reply = ExtractedRecipe { title: None, ..pancakes() };
        let h = harness(MemoryRemote::default(), StaticExtractor::returning("not food"), StaticInference::returning(reply));
        let err = h.importer.import_from_url("https://news.test/article", &user(), None).await.unwrap_err();
        assert!(matches!(err, ImportError::Extraction(ExtractionError::NotARecipe)));
        assert!(h.remote.calls().is_empty());
        assert!(h.local.snapshot().is_empty());
    }

    #[tokio::test]
    async fn invalid_url_stops_before_fetch() {
        let h = harness(MemoryRemote::default(), StaticExtractor::returning("x"), StaticInference::returning(pancakes()));
        for bad in ["not a url", "ftp://cook.test/x", "mailto:chef@cook.test"] {
            let err = h.importer.import_from_url(bad, &user(), None).await.unwrap_err();
            assert!(matches!(err, ImportError::Extraction(ExtractionError::InvalidUrl(_))), "{bad}");
        }
        assert!(h.extractor.urls().is_empty());
    }

    #[tokio::test]
    async fn extractor_and_inference_failures_propagate() {
        let h = harness(MemoryRemote::default(), StaticExtractor::failing(), StaticInference::returning(pancakes()));
        let err = h.importer.import_from_url("https://cook.test/a", &user(), None).await.unwrap_err();
        assert!(matches!(err, ImportError::Extraction(ExtractionError::EmptyContent)));
        assert!(h.inference.inputs.lock().unwrap().is_empty());

        let h = harness(MemoryRemote::default(), StaticExtractor::returning("x"), StaticInference::failing());
        let err = h.importer.import_from_url("https://cook.test/a", &user(), None).await.unwrap_err();
        assert!(matches!(err, ImportError::Extraction(ExtractionError::Inference(_))));
        assert!(h.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn url_import_falls_back_to_local_tier() {
        let h = harness(MemoryRemote::failing(), StaticExtractor::returning("x"), StaticInference::returning(pancakes()));
        let served = h.importer.import_from_url("https://cook.test/a", &user(), None).await.unwrap();
        assert_eq!(served.tier, Tier::Local);
        assert!(served.remote_error.is_some());
        assert_eq!(h.local.snapshot(), vec![served.value]);
    }

    #[tokio::test]
    async fn manual_import_keeps_named_rows_only() {
        let h = harness(MemoryRemote::default(), StaticExtractor::failing(), StaticInference::failing());
        let form = ManualForm {
            title: "Seasoning".into(),
            ingredients: vec![
                IngredientForm { name: "".into(), amount: "2".into(), ..Default::default() },
                IngredientForm { name: "Salt".into(), amount: "abc".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        let served = h.importer.import_manual(form, &user(), None).await.unwrap();
        assert_eq!(served.value.ingredients.len(), 1);
        assert_eq!(served.value.ingredients[0].name, "Salt");
        assert_eq!(served.value.ingredients[0].amount, 1.0);
        assert_eq!(h.remote.calls(), vec!["insert"]);
    }

    #[tokio::test]
    async fn manual_import_rejects_blank_title() {
        let h = harness(MemoryRemote::default(), StaticExtractor::failing(), StaticInference::failing());
        let err = h.importer.import_manual(ManualForm::default(), &user(), None).await.unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));
        assert!(h.remote.calls().is_empty());
    }

    #[test]
    fn literal_null_title_is_not_a_recipe() {
        let x = ExtractedRecipe { title: Some("null".into()), ..Default::default() };
        assert!(matches!(recipe_from_extracted(x, "https://a.test", &user(), Utc::now()), Err(ExtractionError::NotARecipe)));
    }

    #[test]
    fn extracted_ingredient_fields_are_trimmed() {
        let x = ExtractedRecipe {
            title: Some("Soup".into()),
            ingredients: Some(vec![ExtractedIngredient {
                name: Some(" Leek ".into()),
                amount: Some(f64::NAN),
                unit: Some(" g ".into()),
                notes: Some("  ".into()),
            }]),
            ..Default::default()
        };
        let r = recipe_from_extracted(x, "https://a.test", &user(), Utc::now()).unwrap();
        assert_eq!(r.ingredients.len(), 1);
        assert_eq!(r.ingredients[0].name, "Leek");
        assert_eq!(r.ingredients[0].amount, 1.0);
        assert_eq!(r.ingredients[0].unit, "g");
        assert_eq!(r.ingredients[0].notes, None);
    }
}
