use crate::core::classifier;
use crate::core::generator::SolutionGenerator;
use crate::domain::model::{Domain, ProblemInput, SolveOutcome};
use crate::domain::ports::{ChatCompletion, ImageTextExtractor};
use crate::utils::error::{Result, SolverError};

pub const NO_INPUT_MESSAGE: &str =
    "No valid input provided. Please enter a math problem or upload an image.";
pub const NO_PROBLEM_TEXT_MESSAGE: &str = "No problem text provided.";

/// Entry point used by both the HTTP handlers and the CLI.
pub struct TutorService<C: ChatCompletion, E: ImageTextExtractor> {
    generator: SolutionGenerator<C>,
    extractor: E,
}

impl<C: ChatCompletion, E: ImageTextExtractor> TutorService<C, E> {
    pub fn new(generator: SolutionGenerator<C>, extractor: E) -> Self {
        Self {
            generator,
            extractor,
        }
    }

    pub fn generator(&self) -> &SolutionGenerator<C> {
        &self.generator
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub async fn solve(
        &self,
        input: ProblemInput,
        declared_domain: Option<&str>,
    ) -> Result<SolveOutcome> {
        let problem = self.problem_text(input).await?;
        if problem.is_empty() {
            return Err(SolverError::invalid_input(NO_INPUT_MESSAGE));
        }

        let domain = resolve_domain(declared_domain, &problem);
        let solution = self.generator.solve(&problem, Some(domain)).await?;

        Ok(SolveOutcome {
            problem,
            solution,
            domain,
        })
    }

    pub async fn similar(
        &self,
        problem_text: &str,
        declared_domain: Option<&str>,
        count: usize,
    ) -> Result<Vec<String>> {
        let problem = problem_text.trim();
        if problem.is_empty() {
            return Err(SolverError::invalid_input(NO_PROBLEM_TEXT_MESSAGE));
        }

        let domain = resolve_domain(declared_domain, problem);
        self.generator.similar(problem, Some(domain), count).await
    }

    async fn problem_text(&self, input: ProblemInput) -> Result<String> {
        match input {
            ProblemInput::Text(text) => Ok(text.trim().to_string()),
            ProblemInput::Image { filename, bytes } => {
                tracing::info!("Received image file: {}, size: {} bytes", filename, bytes.len());
                let text = self.extractor.extract_text(&bytes).await?;
                tracing::info!("Extracted text: {}...", preview(&text, 100));
                Ok(text)
            }
        }
    }
}

/// A blank declared domain counts as "not given". Other labels must match a
/// domain key exactly; anything else falls back to the general domain.
pub fn resolve_domain(declared: Option<&str>, problem_text: &str) -> Domain {
    match declared.filter(|d| !d.trim().is_empty()) {
        Some(label) => {
            let domain = Domain::from_label_lenient(label);
            if domain.as_str() != label {
                tracing::debug!("Unknown domain '{}', using {}", label, domain);
            }
            domain
        }
        None => classifier::classify(problem_text),
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
