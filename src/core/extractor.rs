use crate::domain::model::{ChatMessage, ChatRequest, ContentPart, ImageUrl};
use crate::domain::ports::{ChatCompletion, ImageTextExtractor};
use crate::utils::error::{Result, SolverError};
use async_trait::async_trait;
use base64::Engine;

pub const EXTRACTION_PROMPT: &str = "Extract the mathematical problem from this image. \
Provide it in standard mathematical notation or LaTeX format if complex.";

/// Anything shorter than this is treated as "nothing readable".
pub const MIN_EXTRACTED_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 500,
        }
    }
}

/// Reads the problem out of a photo by asking a vision-capable model.
pub struct VisionExtractor<C: ChatCompletion> {
    client: C,
    settings: VisionSettings,
}

impl<C: ChatCompletion> VisionExtractor<C> {
    pub fn new(client: C) -> Self {
        Self::with_settings(client, VisionSettings::default())
    }

    pub fn with_settings(client: C, settings: VisionSettings) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn build_request(&self, image: &[u8]) -> ChatRequest {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let data_url = format!("data:{};base64,{}", sniff_mime_type(image), encoded);

        ChatRequest {
            messages: vec![ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: EXTRACTION_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ])],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

#[async_trait]
impl<C: ChatCompletion> ImageTextExtractor for VisionExtractor<C> {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String> {
        if image.is_empty() {
            return Err(SolverError::invalid_input("Uploaded image is empty."));
        }
        if !self.client.is_configured() {
            return Err(SolverError::ClientNotConfigured {
                service: self.client.service_name(),
                env_var: self.client.credential_env(),
            });
        }

        tracing::debug!("Sending {} byte image to vision model", image.len());
        let response = self
            .client
            .complete(self.build_request(image))
            .await
            .map_err(|e| {
                tracing::error!("Error with {} vision request: {}", self.client.service_name(), e);
                e
            })?;

        let text = response.trim();
        if text.chars().count() < MIN_EXTRACTED_CHARS {
            tracing::warn!("Vision model returned {} usable chars", text.chars().count());
            return Err(SolverError::NoTextExtracted {
                message: format!("model returned {:?}", text),
            });
        }

        Ok(text.to_string())
    }
}

/// Picks the data-URL mime type from the file signature. Unknown formats are
/// sent as PNG.
pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
    ];

    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, mime)| *mime)
        .unwrap_or("image/png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::tests::FakeChat;
    use crate::domain::model::MessageContent;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[tokio::test]
    async fn test_empty_image_is_an_input_error() {
        let chat = FakeChat::replying("x + 1 = 2");
        let extractor = VisionExtractor::new(chat.clone());

        let err = extractor.extract_text(&[]).await.unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput { .. }));
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_not_called() {
        let chat = FakeChat::unconfigured();
        let extractor = VisionExtractor::new(chat.clone());

        let err = extractor.extract_text(PNG_HEADER).await.unwrap_err();
        assert!(matches!(err, SolverError::ClientNotConfigured { .. }));
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extracted_text_is_trimmed() {
        let chat = FakeChat::replying("\n  \\int_0^1 x^2 \\, dx \n");
        let extractor = VisionExtractor::new(chat.clone());

        let text = extractor.extract_text(PNG_HEADER).await.unwrap();
        assert_eq!(text, "\\int_0^1 x^2 \\, dx");

        let request = chat.last_request();
        assert_eq!(request.temperature, 0.1);
        assert_eq!(request.max_tokens, 500);
        match &request.messages[0].content {
            MessageContent::Parts(parts) => {
                assert_eq!(
                    parts[0],
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT.to_string()
                    }
                );
                match &parts[1] {
                    ContentPart::ImageUrl { image_url } => {
                        assert!(image_url.url.starts_with("data:image/png;base64,iVBORw0KGgo"));
                    }
                    other => panic!("unexpected part: {:?}", other),
                }
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_response_is_an_extraction_error() {
        let extractor = VisionExtractor::new(FakeChat::replying("  \n "));
        let err = extractor.extract_text(PNG_HEADER).await.unwrap_err();
        assert!(matches!(err, SolverError::NoTextExtracted { .. }));
        assert!(err.is_client_fault());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_returned() {
        let extractor = VisionExtractor::new(FakeChat::failing(500));
        let err = extractor.extract_text(PNG_HEADER).await.unwrap_err();
        assert!(matches!(err, SolverError::ApiStatus { status: 500, .. }));
    }

    #[test]
    fn test_sniff_mime_type() {
        assert_eq!(sniff_mime_type(PNG_HEADER), "image/png");
        assert_eq!(sniff_mime_type(b"\xff\xd8\xff\xe0\0\x10JFIF"), "image/jpeg");
        assert_eq!(sniff_mime_type(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_mime_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_mime_type(b"not an image"), "image/png");
    }
}
