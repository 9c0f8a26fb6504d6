use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Planning failed: {0}")]
    Planning(#[source] providers::Error),

    #[error("Classification failed for step {step:?}: {source}")]
    Classification {
        step: String,
        #[source]
        source: providers::Error,
    },

    /// Carries everything gathered before synthesis failed so a caller can
    /// salvage the research instead of losing the whole run.
    #[error("Synthesis failed: {source}")]
    Synthesis {
        context: Vec<String>,
        #[source]
        source: providers::Error,
    },

    #[error("Missing arg: {0}")]
    MissingArg(String),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}
