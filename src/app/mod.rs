// Application wiring: builds the long-lived clients once and hands them to the service.

use crate::adapters::OpenAiChatClient;
use crate::config::{ApiKeys, AppConfig};
use crate::core::extractor::VisionExtractor;
use crate::core::generator::SolutionGenerator;
use crate::core::service::TutorService;
use crate::domain::ports::ChatCompletion;
use crate::server::AppState;
use crate::utils::error::Result;

pub type DefaultService = TutorService<OpenAiChatClient, VisionExtractor<OpenAiChatClient>>;

pub fn build_service(config: &AppConfig, keys: &ApiKeys) -> Result<DefaultService> {
    let text_client = OpenAiChatClient::groq(&config.generator, keys)?;
    let vision_client = OpenAiChatClient::together(&config.vision, keys)?;

    tracing::info!(
        "Text model: {} ({}), vision model: {} ({})",
        text_client.model(),
        key_status(&text_client),
        vision_client.model(),
        key_status(&vision_client),
    );

    Ok(TutorService::new(
        SolutionGenerator::with_settings(text_client, config.generator.settings()),
        VisionExtractor::with_settings(vision_client, config.vision.settings()),
    ))
}

pub fn build_state(
    config: &AppConfig,
    keys: &ApiKeys,
) -> Result<AppState<OpenAiChatClient, VisionExtractor<OpenAiChatClient>>> {
    Ok(AppState {
        service: build_service(config, keys)?,
        similar_count: config.generator.similar_count,
        max_upload_mb: config.server.max_upload_mb,
    })
}

fn key_status(client: &OpenAiChatClient) -> &'static str {
    if client.is_configured() {
        "configured"
    } else {
        "missing key"
    }
}
