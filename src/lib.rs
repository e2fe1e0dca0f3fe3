pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::OpenAiChatClient;
pub use config::{ApiKeys, AppConfig};
pub use crate::core::{
    classifier::classify, extractor::VisionExtractor, generator::SolutionGenerator,
    service::TutorService,
};
pub use domain::model::{Domain, ProblemInput, SolveOutcome};
pub use server::{ApiServer, AppState};
pub use utils::error::{ErrorCategory, Result, SolverError};
