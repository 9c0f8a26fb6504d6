use crate::{Error, Result};
use providers::llm::{self, LLM};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const PLANNER_PROMPT: &str = include_str!("prompts/planner.md");

#[derive(Deserialize, JsonSchema)]
struct Plan {
    /// Research steps to follow, in execution order.
    steps: Vec<String>,
}

/// Decomposes the research task into an ordered list of sub-tasks.
pub struct Planner {
    llm: Arc<dyn LLM + Send + Sync>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LLM + Send + Sync>) -> Self {
        Self { llm }
    }

    /// An empty plan is a valid result; callers must not assume length >= 1.
    pub async fn plan(&self, task: &str) -> Result<Vec<String>> {
        let plan: Plan =
            llm::generate_structured(self.llm.as_ref(), "research_plan", PLANNER_PROMPT, task)
                .await
                .map_err(Error::Planning)?;

        info!(steps = plan.steps.len(), "research plan generated");

        Ok(plan.steps)
    }
}
