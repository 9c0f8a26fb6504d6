use crate::{Error, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Returned instead of an empty block so callers never see a missing result.
pub const NO_LOCAL_RESULTS: &str = "No relevant information found in local documents.";

#[async_trait]
pub trait RetrievalProvider {
    async fn retrieve(&self, query: &str) -> Result<String>;
}

#[async_trait]
pub trait Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

pub struct OpenAIEmbedder {
    model: String,
    client: Client<OpenAIConfig>,
}

impl OpenAIEmbedder {
    pub fn new(model: String) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            model,
            client: Client::new(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or(Error::RetrievalError(
                "embedding response is empty".to_string(),
            ))
    }
}

/// One pre-embedded document chunk. Ingestion happens out of band; the
/// pipeline only reads the finished index.
#[derive(Serialize, Deserialize)]
pub struct IndexEntry {
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Default)]
pub struct LocalIndex {
    entries: Vec<IndexEntry>,
}

impl LocalIndex {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries = serde_json::from_str(&raw)?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn top_k(&self, query: &[f32], k: usize) -> Vec<&IndexEntry> {
        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine(query, &entry.embedding), entry))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(k).map(|(_, entry)| entry).collect()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Similarity lookup over a pre-built index of embedded document chunks.
pub struct LocalRetriever {
    embedder: Arc<dyn Embedder + Send + Sync>,
    index: LocalIndex,
    top_k: usize,
}

impl LocalRetriever {
    pub fn new(embedder: Arc<dyn Embedder + Send + Sync>, index: LocalIndex, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }
}

#[async_trait]
impl RetrievalProvider for LocalRetriever {
    async fn retrieve(&self, query: &str) -> Result<String> {
        if self.index.is_empty() {
            return Ok(NO_LOCAL_RESULTS.to_string());
        }

        debug!(%query, "querying local documents");

        let embedding = self.embedder.embed(query).await?;
        let matches = self.index.top_k(&embedding, self.top_k);

        if matches.is_empty() {
            return Ok(NO_LOCAL_RESULTS.to_string());
        }

        let chunks = matches
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(format!("Sources from local documents:\n{}", chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn entry(text: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_cosine() {
        assert_eq!(cosine(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!(cosine(&[1.0, 1.0], &[1.0, 1.0]) > 0.99);
    }

    #[test]
    fn test_top_k_ranks_by_similarity() {
        let index = LocalIndex::from_entries(vec![
            entry("orthogonal", vec![0.0, 1.0]),
            entry("aligned", vec![1.0, 0.0]),
            entry("diagonal", vec![1.0, 1.0]),
        ]);

        let top = index.top_k(&[1.0, 0.0], 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].text, "aligned");
        assert_eq!(top[1].text, "diagonal");
    }

    #[tokio::test]
    async fn test_retrieve_empty_index_returns_sentinel() -> Result<()> {
        let retriever = LocalRetriever::new(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            LocalIndex::default(),
            3,
        );

        let block = retriever.retrieve("anything").await?;
        assert_eq!(block, NO_LOCAL_RESULTS);
        Ok(())
    }

    #[tokio::test]
    async fn test_retrieve_concatenates_matches() -> Result<()> {
        let index = LocalIndex::from_entries(vec![
            entry("first chunk", vec![1.0, 0.0]),
            entry("second chunk", vec![0.9, 0.1]),
            entry("unrelated", vec![0.0, 1.0]),
        ]);
        let retriever = LocalRetriever::new(Arc::new(FixedEmbedder(vec![1.0, 0.0])), index, 2);

        let block = retriever.retrieve("query").await?;
        assert!(block.starts_with("Sources from local documents:"));
        assert!(block.contains("first chunk\n\nsecond chunk"));
        assert!(!block.contains("unrelated"));
        Ok(())
    }
}
