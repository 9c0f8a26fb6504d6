pub mod llm;
pub mod retrieval;
pub mod search;

mod error;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
