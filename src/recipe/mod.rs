use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SERVINGS: u32 = 4;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[value(name = "easy")] Easy,
    #[default]
    #[value(name = "medium")] Medium,
    #[value(name = "hard")] Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Lenient parse used by the importers: unknown or missing values become `medium`.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Ingredient {
    pub fn id_for_index(index: usize) -> String { format!("ing_{index}") }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_servings() -> u32 { DEFAULT_SERVINGS }

impl Recipe {
    /// A blank recipe owned by `user_id`, stamped with `now` for both timestamps.
    pub fn new(user_id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Recipe {
            id: new_recipe_id(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            url: None,
            image_url: None,
            prep_time: None,
            cook_time: None,
            servings: DEFAULT_SERVINGS,
            difficulty: Difficulty::default(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            notes: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_time(&self) -> u32 {
        self.prep_time.unwrap_or(0) + self.cook_time.unwrap_or(0)
    }

    /// Steps paired with their 1-based number.
    pub fn numbered_steps(&self) -> impl Iterator<Item = (usize, &str)> {
        self.instructions.iter().enumerate().map(|(i, s)| (i + 1, s.as_str()))
    }

    pub fn with_notes(&self, notes: Option<String>, now: DateTime<Utc>) -> Self {
        let mut out = self.clone();
        out.notes = notes.filter(|n| !n.is_empty());
        out.updated_at = now;
        out
    }
}

pub fn new_recipe_id() -> String {
    format!("recipe_{}", Uuid::new_v4().simple())
}

/// Empty or whitespace-only strings collapse to `None`.
pub fn non_blank(s: Option<String>) -> Option<String> {
    s.and_then(|v| if v.trim().is_empty() { None } else { Some(v) })
}
