use crate::state::StepUpdate;
use crate::{Error, Result};
use providers::llm::{self, LLM};
use providers::retrieval::RetrievalProvider;
use providers::search::SearchProvider;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const RESEARCHER_PROMPT: &str = include_str!("prompts/researcher.md");

/// Any of these words in a sub-task (case-insensitive substring) forces a
/// realtime web search, bypassing the model's judgement.
const REALTIME_TRIGGERS: &[&str] = &[
    "today", "latest", "now", "recent", "current", "breaking", "updates",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Web,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    General,
    Specific,
    Realtime,
    Deep,
}

/// Per-sub-task routing choice: what to search and where.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct Decision {
    pub search_query: String,
    pub source: Source,
    pub query_type: Intent,
}

/// Researches one sub-task: classifies it into a `Decision`, executes exactly
/// one provider call, and returns the resulting context fragment.
pub struct Researcher {
    llm: Arc<dyn LLM + Send + Sync>,
    search: Box<dyn SearchProvider + Send + Sync>,
    retrieval: Box<dyn RetrievalProvider + Send + Sync>,
}

impl Researcher {
    pub fn new(
        llm: Arc<dyn LLM + Send + Sync>,
        search: Box<dyn SearchProvider + Send + Sync>,
        retrieval: Box<dyn RetrievalProvider + Send + Sync>,
    ) -> Self {
        Self {
            llm,
            search,
            retrieval,
        }
    }

    pub async fn research(&self, subtask: &str, date: &str) -> Result<StepUpdate> {
        let decision = self.decide(subtask, date).await?;

        info!(
            query = %decision.search_query,
            source = ?decision.source,
            query_type = ?decision.query_type,
            "executing research step"
        );

        let result = match decision.source {
            Source::Web => self.search.search(&decision.search_query).await,
            Source::Local => self.retrieval.retrieve(&decision.search_query).await,
        };

        // A flaky provider must not abort the whole plan: record what went
        // wrong in place of results and let the run continue.
        let fragment = match result {
            Ok(block) => block,
            Err(err) => {
                warn!(error = %err, "provider call failed, recording placeholder");
                format!(
                    "No results could be gathered for \"{}\": {}",
                    decision.search_query, err
                )
            }
        };

        Ok(StepUpdate::fragment(fragment))
    }

    pub async fn decide(&self, subtask: &str, date: &str) -> Result<Decision> {
        if let Some(decision) = realtime_override(subtask, date) {
            info!(query = %decision.search_query, "realtime trigger matched");
            return Ok(decision);
        }

        let system = RESEARCHER_PROMPT.replace("{current_date}", date);
        let user = format!("Research step: {subtask}");

        llm::generate_structured(self.llm.as_ref(), "research_decision", &system, &user)
            .await
            .map_err(|source| Error::Classification {
                step: subtask.to_string(),
                source,
            })
    }
}

/// Deterministic first tier of the routing decision: time-sensitive sub-tasks
/// always go to the web with a date-qualified query.
fn realtime_override(subtask: &str, date: &str) -> Option<Decision> {
    let lowered = subtask.to_lowercase();

    if REALTIME_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        Some(Decision {
            search_query: format!("{subtask} {date} latest updates"),
            source: Source::Web,
            query_type: Intent::Realtime,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use providers::llm::GenerateRequest;
    use std::sync::Mutex;

    const DATE: &str = "2025-01-15";

    struct CannedLLM(&'static str);

    #[async_trait]
    impl LLM for CannedLLM {
        async fn generate<'a>(&self, _request: GenerateRequest<'a>) -> providers::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingSearch {
        queries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, query: &str) -> providers::Result<String> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(format!("web results for {query}"))
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> providers::Result<String> {
            Err(providers::Error::SearchError("connection reset".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingRetrieval {
        queries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RetrievalProvider for RecordingRetrieval {
        async fn retrieve(&self, query: &str) -> providers::Result<String> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(format!("local results for {query}"))
        }
    }

    fn researcher(
        llm: &'static str,
        search: Box<dyn SearchProvider + Send + Sync>,
        retrieval: Box<dyn RetrievalProvider + Send + Sync>,
    ) -> Researcher {
        Researcher::new(Arc::new(CannedLLM(llm)), search, retrieval)
    }

    #[test]
    fn test_realtime_override_forces_web_and_rewrites_query() {
        let decision = realtime_override("Find AI developments today", DATE).unwrap();

        assert_eq!(decision.source, Source::Web);
        assert_eq!(decision.query_type, Intent::Realtime);
        assert!(decision.search_query.contains("2025-01-15"));
        assert!(decision.search_query.contains("latest"));
        assert!(decision.search_query.contains("updates"));
        assert!(decision.search_query.contains("Find AI developments today"));
    }

    #[test]
    fn test_realtime_override_is_case_insensitive() {
        for subtask in [
            "Track BREAKING news on chip exports",
            "Summarize the Latest funding rounds",
            "What is happening NOW in robotics",
        ] {
            let decision = realtime_override(subtask, DATE).unwrap();
            assert_eq!(decision.source, Source::Web);
            assert!(decision.search_query.contains(DATE));
        }
    }

    #[test]
    fn test_realtime_override_matches_anywhere_in_text() {
        let decision =
            realtime_override("Review academic papers and then check recent preprints", DATE);
        assert!(decision.is_some());
    }

    #[test]
    fn test_no_override_without_trigger_words() {
        assert!(realtime_override("Explain the theory of lattice cryptography", DATE).is_none());
    }

    #[tokio::test]
    async fn test_trigger_step_skips_the_model_and_searches_web() -> Result<()> {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let search = RecordingSearch {
            queries: queries.clone(),
        };

        // A decision pointing at local would be obeyed if the model were
        // consulted; the override must win instead.
        let r = researcher(
            "{\"search_query\": \"q\", \"source\": \"local\", \"query_type\": \"deep\"}",
            Box::new(search),
            Box::new(RecordingRetrieval::default()),
        );

        let update = r.research("Find AI developments today", DATE).await?;

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains(DATE));
        assert!(update.fragment.unwrap().contains("web results"));
        Ok(())
    }

    #[tokio::test]
    async fn test_local_decision_dispatches_to_retrieval() -> Result<()> {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let retrieval = RecordingRetrieval {
            queries: queries.clone(),
        };

        let r = researcher(
            "{\"search_query\": \"lattice cryptography survey\", \"source\": \"local\", \"query_type\": \"deep\"}",
            Box::new(RecordingSearch::default()),
            Box::new(retrieval),
        );

        let update = r
            .research("Explain the theory of lattice cryptography", DATE)
            .await?;

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], "lattice cryptography survey");
        assert!(update.fragment.unwrap().contains("local results"));
        Ok(())
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_placeholder_fragment() -> Result<()> {
        let r = researcher(
            "{\"search_query\": \"ev market share\", \"source\": \"web\", \"query_type\": \"general\"}",
            Box::new(FailingSearch),
            Box::new(RecordingRetrieval::default()),
        );

        let update = r.research("Map the EV market", DATE).await?;

        let fragment = update.fragment.unwrap();
        assert!(fragment.contains("No results could be gathered"));
        assert!(fragment.contains("ev market share"));
        assert!(fragment.contains("connection reset"));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_decision_is_a_classification_failure() {
        let r = researcher(
            "source: web, query: stuff",
            Box::new(RecordingSearch::default()),
            Box::new(RecordingRetrieval::default()),
        );

        let result = r.research("Explain the theory of something", DATE).await;
        assert!(
            matches!(result, Err(Error::Classification { step, .. }) if step.contains("theory"))
        );
    }
}
