pub mod classifier;
pub mod extractor;
pub mod generator;
pub mod prompts;
pub mod service;

pub use crate::domain::model::{ChatMessage, ChatRequest, Domain, ProblemInput, SolveOutcome};
pub use crate::domain::ports::{ChatCompletion, ImageTextExtractor};
pub use crate::utils::error::Result;
