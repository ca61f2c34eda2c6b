pub mod openai;

pub use openai::{ChatCompletionRequest, ChatMessage, ChatRole, LlmClient, OpenAiClient, OpenAiClientConfig, OpenAiError, ResponseFormat};
