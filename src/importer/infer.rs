use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::llm::{ChatCompletionRequest, ChatMessage, ChatRole, LlmClient, ResponseFormat};

const SYSTEM_PROMPT: &str = "You turn web page content into structured recipe data. Reply with a single JSON object.";
const MAX_REPLY_TOKENS: u32 = 4096;

/// Best-effort recipe fields as returned by inference. Everything is optional;
/// a missing title means the page is not a recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecipe {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Preparation time in minutes
    pub prep_time: Option<f64>,
    /// Cooking time in minutes
    pub cook_time: Option<f64>,
    pub servings: Option<f64>,
    pub difficulty: Option<String>,
    pub ingredients: Option<Vec<ExtractedIngredient>>,
    /// Steps in order, one string per step
    pub instructions: Option<Vec<String>>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct ExtractedIngredient {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

impl ExtractedRecipe {
    /// JSON schema sent as the response format.
    pub fn schema() -> Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(ExtractedRecipe)).unwrap_or(Value::Null);
        if let Some(d) = schema.pointer_mut("/properties/difficulty") {
            d["enum"] = serde_json::json!(["easy", "medium", "hard", null]);
        }
        schema
    }

    /// Lenient read of a model reply: numbers may arrive as strings, unknown keys are ignored,
    /// and anything that is not an object reads as "no recipe".
    pub fn from_value(v: &Value) -> Self {
        let Some(obj) = v.as_object() else { return Self::default() };
        ExtractedRecipe {
            title: string(obj, "title"),
            description: string(obj, "description"),
            prep_time: number(obj.get("prepTime")),
            cook_time: number(obj.get("cookTime")),
            servings: number(obj.get("servings")),
            difficulty: string(obj, "difficulty"),
            ingredients: obj.get("ingredients").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|i| ExtractedIngredient {
                        name: string(i, "name"),
                        amount: number(i.get("amount")),
                        unit: string(i, "unit"),
                        notes: string(i, "notes"),
                    })
                    .collect()
            }),
            instructions: obj.get("instructions").and_then(Value::as_array).map(|steps| {
                steps.iter().filter_map(|s| s.as_str().map(str::to_string)).collect()
            }),
            image_url: string(obj, "imageUrl"),
        }
    }
}

fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Structured inference over page content.
#[async_trait]
pub trait RecipeInference: Send + Sync {
    async fn infer(&self, content: &str) -> Result<ExtractedRecipe, ExtractionError>;
}

pub struct LlmRecipeInference {
    client: Arc<dyn LlmClient>,
}

impl LlmRecipeInference {
    pub fn new(client: Arc<dyn LlmClient>) -> Self { Self { client } }

    pub fn build_request(content: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: vec![
                ChatMessage::new(ChatRole::System, SYSTEM_PROMPT),
                ChatMessage::new(ChatRole::User, prompt(content)),
            ],
            max_tokens: Some(MAX_REPLY_TOKENS),
            response_format: Some(ResponseFormat::JsonSchema { name: "recipe".to_string(), schema: ExtractedRecipe::schema() }),
            ..Default::default()
        }
    }
}

pub fn prompt(content: &str) -> String {
    format!("Extract recipe information from this content: {content}. If this is not a recipe, return null for title.")
}

#[async_trait]
impl RecipeInference for LlmRecipeInference {
    async fn infer(&self, content: &str) -> Result<ExtractedRecipe, ExtractionError> {
        let request = Self::build_request(content);
        let resp = match self.client.chat_completion(request.clone()).await {
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "inference failed, retrying once");
                self.client.chat_completion(request).await?
            }
            other => other?,
        };
        debug!(
            finish_reason = ?resp.finish_reason,
            prompt_tokens = ?resp.usage.as_ref().and_then(|u| u.prompt_tokens),
            completion_tokens = ?resp.usage.as_ref().and_then(|u| u.completion_tokens),
            total_tokens = ?resp.usage.as_ref().and_then(|u| u.total_tokens),
            "inference_reply"
        );
        let value: Value = serde_json::from_str(strip_code_fence(&resp.content)).map_err(ExtractionError::Decode)?;
        Ok(ExtractedRecipe::from_value(&value))
    }
}

// some models wrap JSON in ```json fences even with a response format set
fn strip_code_fence(s: &str) -> &str {
    let t = s.trim();
    let Some(rest) = t.strip_prefix("```") else { return t };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    pub struct StaticInference {
        pub reply: Option<ExtractedRecipe>,
        pub inputs: Mutex<Vec<String>>,
    }

    impl StaticInference {
        pub fn returning(reply: ExtractedRecipe) -> Self { Self { reply: Some(reply), inputs: Mutex::new(Vec::new()) } }
        pub fn failing() -> Self { Self { reply: None, inputs: Mutex::new(Vec::new()) } }
    }

    #[async_trait]
    impl RecipeInference for StaticInference {
        async fn infer(&self, content: &str) -> Result<ExtractedRecipe, ExtractionError> {
            self.inputs.lock().unwrap().push(content.to_string());
            self.reply.clone().ok_or(ExtractionError::Inference(crate::llm::OpenAiError::Timeout))
        }
    }
}
