use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Returned instead of an empty block so callers never see a missing result.
pub const NO_SEARCH_RESULTS: &str = "No results found on the web for this query.";

#[async_trait]
pub trait SearchProvider {
    async fn search(&self, query: &str) -> Result<String>;
}

const SEARCH_TIMEOUT_SECS: u64 = 30;
const MAX_RESULTS: u32 = 5;

/// Web search backed by the Tavily search API.
pub struct TavilySearch {
    api_key: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.tavily.com".to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(SEARCH_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| Error::MissingArg("TAVILY_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    topic: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    answer: Option<String>,
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    content: String,
}

impl SearchResult {
    fn render(&self) -> String {
        format!("### {} ({})\n{}\n", self.title, self.url, self.content)
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<String> {
        debug!(%query, "searching the web");

        let request = SearchRequest {
            query,
            max_results: MAX_RESULTS,
            search_depth: "basic",
            topic: "general",
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SearchError(format!(
                "search api returned {}: {}",
                status, body
            )));
        }

        let response: SearchResponse = response.json().await?;

        if response.answer.is_none() && response.results.is_empty() {
            return Ok(NO_SEARCH_RESULTS.to_string());
        }

        let mut block = format!("Web search results for \"{}\":\n\n", query);
        if let Some(answer) = response.answer {
            block.push_str(&answer);
            block.push_str("\n\n");
        }
        for result in &response.results {
            block.push_str(&result.render());
            block.push('\n');
        }

        Ok(block.trim_end().to_string())
    }
}
