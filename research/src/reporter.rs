use crate::{Error, Result};
use providers::llm::{GenerateRequest, LLM};
use std::sync::Arc;
use tracing::info;

const REPORTER_PROMPT: &str = include_str!("prompts/reporter.md");

/// Synthesizes the gathered context into the final Markdown report.
pub struct Reporter {
    llm: Arc<dyn LLM + Send + Sync>,
}

impl Reporter {
    pub fn new(llm: Arc<dyn LLM + Send + Sync>) -> Self {
        Self { llm }
    }

    /// Context fragments are passed through unmodified, in research order,
    /// separated by blank lines; the model's text is returned verbatim.
    pub async fn report(&self, task: &str, context: &[String]) -> Result<String> {
        info!(fragments = context.len(), "writing final report");

        let notes = context.join("\n\n");
        let user = format!(
            "Original request: {task}\n\nResearch notes:\n{notes}\n\nWrite the final report in Markdown:"
        );

        self.llm
            .generate(GenerateRequest {
                system: REPORTER_PROMPT,
                user: &user,
                schema: None,
            })
            .await
            .map_err(|source| Error::Synthesis {
                context: context.to_vec(),
                source,
            })
    }
}
