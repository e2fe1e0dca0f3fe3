use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subject area of a problem; selects the instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    General,
    Calculus,
    LinearAlgebra,
    Statistics,
    DifferentialEquations,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::General,
        Domain::Calculus,
        Domain::LinearAlgebra,
        Domain::Statistics,
        Domain::DifferentialEquations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Calculus => "calculus",
            Domain::LinearAlgebra => "linear_algebra",
            Domain::Statistics => "statistics",
            Domain::DifferentialEquations => "differential_equations",
        }
    }

    /// Exact label lookup for form input; anything else, including
    /// differently cased labels, maps to `General`.
    pub fn from_label_lenient(label: &str) -> Domain {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == label)
            .unwrap_or_default()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl fmt::Display for UnknownDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown domain '{}', expected one of: general, calculus, linear_algebra, statistics, differential_equations",
            self.0
        )
    }
}

impl std::error::Error for UnknownDomain {}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// What the caller handed us: typed text or an uploaded picture.
#[derive(Debug, Clone)]
pub enum ProblemInput {
    Text(String),
    Image { filename: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    /// The text that was actually solved (OCR output for images).
    pub problem: String,
    pub solution: String,
    pub domain: Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t),
            MessageContent::Parts(_) => None,
        }
    }
}

/// Sampling settings for one request. The model name is owned by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}
