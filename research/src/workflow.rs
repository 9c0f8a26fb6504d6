use crate::planner::Planner;
use crate::reporter::Reporter;
use crate::researcher::Researcher;
use crate::state::{StepUpdate, WorkflowState};
use crate::{Error, Result};
use providers::llm::LLM;
use providers::retrieval::RetrievalProvider;
use providers::search::SearchProvider;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Planning,
    Researching,
    Reporting,
    Done,
}

/// Sequences one research run: Planning, then Researching once per planned
/// sub-task, then Reporting. Steps run strictly one at a time; each step's
/// update is merged into the state before the next step begins.
pub struct Workflow {
    planner: Planner,
    researcher: Researcher,
    reporter: Reporter,
    max_steps: Option<usize>,
}

impl Workflow {
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    pub async fn run(&self, task: String) -> Result<WorkflowState> {
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        self.run_with_date(task, &date).await
    }

    pub async fn run_with_date(&self, task: String, date: &str) -> Result<WorkflowState> {
        let mut state = WorkflowState::new(task);
        let mut phase = Phase::Planning;

        while phase != Phase::Done {
            phase = match phase {
                Phase::Planning => {
                    let plan = self.planner.plan(&state.task).await?;
                    state.apply(StepUpdate::plan(plan));
                    Phase::Researching
                }
                Phase::Researching => {
                    if !state.steps_remaining() || self.cap_reached(&state) {
                        Phase::Reporting
                    } else {
                        let subtask = state.plan[state.current_step].clone();
                        info!(
                            step = state.current_step + 1,
                            total = state.plan.len(),
                            %subtask,
                            "researching"
                        );
                        let update = self.researcher.research(&subtask, date).await?;
                        state.apply(update);
                        Phase::Researching
                    }
                }
                Phase::Reporting => {
                    let report = self.reporter.report(&state.task, &state.context).await?;
                    state.apply(StepUpdate::report(report));
                    Phase::Done
                }
                Phase::Done => Phase::Done,
            };
        }

        Ok(state)
    }

    fn cap_reached(&self, state: &WorkflowState) -> bool {
        self.max_steps.is_some_and(|cap| state.current_step >= cap)
    }
}

pub struct WorkflowBuilder {
    llm: Option<Arc<dyn LLM + Send + Sync>>,
    search: Option<Box<dyn SearchProvider + Send + Sync>>,
    retrieval: Option<Box<dyn RetrievalProvider + Send + Sync>>,
    max_steps: Option<usize>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            llm: None,
            search: None,
            retrieval: None,
            max_steps: None,
        }
    }

    pub fn llm(mut self, llm: Arc<dyn LLM + Send + Sync>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn search(mut self, search: Box<dyn SearchProvider + Send + Sync>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn retrieval(mut self, retrieval: Box<dyn RetrievalProvider + Send + Sync>) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    /// Truncate the researching loop after this many steps. Off by default:
    /// the baseline behavior runs a plan of any length to completion.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn build(self) -> Result<Workflow> {
        let llm = self
            .llm
            .ok_or(Error::MissingArg("llm is required for workflow".to_string()))?;
        let search = self.search.ok_or(Error::MissingArg(
            "search provider is required for workflow".to_string(),
        ))?;
        let retrieval = self.retrieval.ok_or(Error::MissingArg(
            "retrieval provider is required for workflow".to_string(),
        ))?;

        Ok(Workflow {
            planner: Planner::new(llm.clone()),
            researcher: Researcher::new(llm.clone(), search, retrieval),
            reporter: Reporter::new(llm),
            max_steps: self.max_steps,
        })
    }
}
