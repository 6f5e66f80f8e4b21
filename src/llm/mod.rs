pub mod gemini;

use thiserror::Error;

pub use gemini::{ GeminiClient, GeminiConfig };

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model api: {0}")]
    Api(String),
}
