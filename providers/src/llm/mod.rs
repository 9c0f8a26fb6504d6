use crate::{Error, Result};
use async_trait::async_trait;
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;

mod openai;
pub use openai::OpenAI;

/// A JSON schema constraint attached to a generation request.
pub struct OutputSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl OutputSchema {
    pub fn new<T: JsonSchema>(name: &str) -> Result<Self> {
        let schema = schema_for!(T);
        let schema = serde_json::to_value(&schema.schema)?;
        Ok(Self {
            name: name.to_string(),
            schema,
        })
    }
}

pub struct GenerateRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub schema: Option<&'a OutputSchema>,
}

#[async_trait]
pub trait LLM {
    async fn generate<'a>(&self, request: GenerateRequest<'a>) -> Result<String>;
}

/// Ask the model for output conforming to `T`'s schema and decode it.
///
/// Decoding is explicit: a response that does not parse as `T` surfaces as
/// `Error::SchemaViolation` instead of leaking malformed text downstream.
pub async fn generate_structured<T>(
    llm: &(dyn LLM + Send + Sync),
    name: &str,
    system: &str,
    user: &str,
) -> Result<T>
where
    T: JsonSchema + DeserializeOwned,
{
    let schema = OutputSchema::new::<T>(name)?;

    let raw = llm
        .generate(GenerateRequest {
            system,
            user,
            schema: Some(&schema),
        })
        .await?;

    serde_json::from_str(&raw).map_err(|err| Error::SchemaViolation(name.to_string(), err))
}
