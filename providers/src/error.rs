use async_openai::error::OpenAIError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Openai error: {0}")]
    OpenaiError(#[from] OpenAIError),

    #[error("No response from llm: {0}")]
    LLMResponseError(String),

    #[error("Output does not conform to schema {0}: {1}")]
    SchemaViolation(String, #[source] serde_json::Error),

    #[error("Http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Search provider error: {0}")]
    SearchError(String),

    #[error("Retrieval provider error: {0}")]
    RetrievalError(String),

    #[error("Missing arg: {0}")]
    MissingArg(String),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}
