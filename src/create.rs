use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::importer::{IngredientForm, ManualForm};
use crate::recipe::Difficulty;
use crate::telemetry::{self};
use crate::views::SavedRecipe;

#[derive(Args, Debug, Default)]
pub struct NewCmd {
    /// Read the whole form from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["title", "description", "prep", "cook", "servings", "difficulty", "ingredient", "step", "tag"])]
    form: Option<PathBuf>,
    #[arg(long)] title: Option<String>,
    #[arg(long)] description: Option<String>,
    #[arg(long)] prep: Option<String>, // minutes
    #[arg(long)] cook: Option<String>, // minutes
    #[arg(long)] servings: Option<String>,
    #[arg(long, value_enum)] difficulty: Option<Difficulty>,
    /// Repeatable, `amount|unit|name|notes` (or just a name)
    #[arg(long)] ingredient: Vec<String>,
    /// Repeatable, in order
    #[arg(long)] step: Vec<String>,
    #[arg(long)] tag: Vec<String>,
}

impl NewCmd {
    fn into_form(self) -> ManualForm {
        ManualForm {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            prep_time: self.prep.unwrap_or_default(),
            cook_time: self.cook.unwrap_or_default(),
            servings: self.servings.unwrap_or_default(),
            difficulty: self.difficulty.map(|d| d.as_str().to_string()).unwrap_or_default(),
            ingredients: self.ingredient.iter().map(|s| IngredientForm::parse_spec(s)).collect(),
            instructions: self.step,
            tags: self.tag,
        }
    }
}

async fn read_form(path: &PathBuf) -> Result<ManualForm> {
    let body = tokio::fs::read(path).await.with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&body).with_context(|| format!("parse {}", path.display()))
}

pub async fn run(app: &App, mut args: NewCmd) -> Result<()> {
    let log = telemetry::manual();
    let _g = log
        .root_span_kv([
            ("form", format!("{:?}", args.form)),
            ("ingredients", args.ingredient.len().to_string()),
            ("steps", args.step.len().to_string()),
        ])
        .entered();
    let user = app.session.require_user()?;
    let form = match args.form.take() {
        Some(path) => read_form(&path).await?,
        None => args.into_form(),
    };

    match app.importer()?.import_manual(form, &user, Some(&log)).await {
        Ok(served) => log.result(&SavedRecipe::from(served)),
        Err(e) => {
            log.error_kv("save_failed", [("error", e.to_string())]);
            Err(e.into())
        }
    }
}
