use crate::domain::model::ChatRequest;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A chat-style text generation backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// False when the client could not be set up (e.g. no API key). Callers
    /// must not call `complete` in that case.
    fn is_configured(&self) -> bool;

    /// Name of the remote service, used in error messages and logs.
    fn service_name(&self) -> &'static str;

    /// Environment variable that holds this client's key.
    fn credential_env(&self) -> &'static str;

    /// Returns the text of the first choice.
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

/// Converts an uploaded picture into problem text.
#[async_trait]
pub trait ImageTextExtractor: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String>;
}
