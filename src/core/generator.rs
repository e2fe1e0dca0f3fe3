use crate::core::{classifier, prompts};
use crate::domain::model::{ChatMessage, ChatRequest, Domain};
use crate::domain::ports::ChatCompletion;
use crate::utils::error::{Result, SolverError};

pub const SOLVE_PREFACE: &str = "Solve this mathematics problem step-by-step:";
pub const DEFAULT_SIMILAR_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Near-deterministic for solutions.
    pub solve: Sampling,
    /// Warmer, since variety is wanted.
    pub similar: Sampling,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            solve: Sampling {
                temperature: 0.2,
                max_tokens: 4000,
            },
            similar: Sampling {
                temperature: 0.7,
                max_tokens: 1000,
            },
        }
    }
}

pub struct SolutionGenerator<C: ChatCompletion> {
    client: C,
    settings: GeneratorSettings,
}

impl<C: ChatCompletion> SolutionGenerator<C> {
    pub fn new(client: C) -> Self {
        Self::with_settings(client, GeneratorSettings::default())
    }

    pub fn with_settings(client: C, settings: GeneratorSettings) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn solve_request(&self, problem_text: &str, domain: Option<Domain>) -> (Domain, ChatRequest) {
        let domain = domain.unwrap_or_else(|| classifier::classify(problem_text));
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(prompts::template(domain)),
                ChatMessage::user(format!("{}\n\n{}", SOLVE_PREFACE, problem_text)),
            ],
            temperature: self.settings.solve.temperature,
            max_tokens: self.settings.solve.max_tokens,
        };
        (domain, request)
    }

    pub fn similar_request(
        &self,
        problem_text: &str,
        domain: Option<Domain>,
        count: usize,
    ) -> (Domain, ChatRequest) {
        let domain = domain.unwrap_or_else(|| classifier::classify(problem_text));
        let user_prompt = format!(
            "Given the following math problem, generate {} similar but distinct problems \
             of the same type and difficulty. Only output the problems, numbered:\n\n\
             Original problem:\n{}",
            count, problem_text
        );
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(prompts::template(domain)),
                ChatMessage::user(user_prompt),
            ],
            temperature: self.settings.similar.temperature,
            max_tokens: self.settings.similar.max_tokens,
        };
        (domain, request)
    }

    /// Step-by-step solution text, returned as the model produced it.
    pub async fn solve(&self, problem_text: &str, domain: Option<Domain>) -> Result<String> {
        self.ensure_configured()?;

        let (domain, request) = self.solve_request(problem_text, domain);
        let solution = self.client.complete(request).await.map_err(|e| {
            tracing::error!("Error solving math problem: {}", e);
            e
        })?;

        tracing::info!("Generated solution for {} problem", domain);
        Ok(solution)
    }

    pub async fn similar(
        &self,
        problem_text: &str,
        domain: Option<Domain>,
        count: usize,
    ) -> Result<Vec<String>> {
        self.ensure_configured()?;

        let (domain, request) = self.similar_request(problem_text, domain, count);
        let response = self.client.complete(request).await.map_err(|e| {
            tracing::error!("Error generating similar problems: {}", e);
            e
        })?;

        let problems = split_numbered_lines(&response);
        tracing::info!(
            "Generated {} similar {} problems (requested {})",
            problems.len(),
            domain,
            count
        );
        Ok(problems)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.client.is_configured() {
            return Ok(());
        }
        tracing::warn!(
            "{} client not configured, skipping request",
            self.client.service_name()
        );
        Err(SolverError::ClientNotConfigured {
            service: self.client.service_name(),
            env_var: self.client.credential_env(),
        })
    }
}

/// Keeps trimmed lines that start with a digit or a dash, in order. With no
/// such line, the whole response becomes the only entry.
pub fn split_numbered_lines(response: &str) -> Vec<String> {
    let items: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.starts_with('-') || line.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        vec![response.to_string()]
    } else {
        items
    }
}
