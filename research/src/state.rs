/// Shared state for one research run, owned by the workflow and threaded
/// through every step. `context` is append-only and `current_step` only ever
/// moves forward, one increment per researched sub-task.
#[derive(Debug, Default)]
pub struct WorkflowState {
    pub task: String,
    pub plan: Vec<String>,
    pub current_step: usize,
    pub context: Vec<String>,
    pub report: Option<String>,
}

impl WorkflowState {
    pub fn new(task: String) -> Self {
        Self {
            task,
            ..Default::default()
        }
    }

    /// Merge a step's partial update. The fragment append and the cursor
    /// increment commit together so the two can never drift apart.
    pub fn apply(&mut self, update: StepUpdate) {
        if let Some(plan) = update.plan {
            self.plan = plan;
        }
        if let Some(fragment) = update.fragment {
            self.context.push(fragment);
            self.current_step += 1;
        }
        if let Some(report) = update.report {
            self.report = Some(report);
        }
    }

    pub fn steps_remaining(&self) -> bool {
        self.current_step < self.plan.len()
    }
}

/// Partial update returned by a single step.
#[derive(Debug, Default)]
pub struct StepUpdate {
    pub plan: Option<Vec<String>>,
    pub fragment: Option<String>,
    pub report: Option<String>,
}

impl StepUpdate {
    pub fn plan(plan: Vec<String>) -> Self {
        Self {
            plan: Some(plan),
            ..Default::default()
        }
    }

    pub fn fragment(fragment: String) -> Self {
        Self {
            fragment: Some(fragment),
            ..Default::default()
        }
    }

    pub fn report(report: String) -> Self {
        Self {
            report: Some(report),
            ..Default::default()
        }
    }
}
