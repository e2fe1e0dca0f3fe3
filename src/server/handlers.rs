//! Request handlers for the HTTP API.

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
    Form,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::service::TutorService;
use crate::domain::model::{ProblemInput, SolveOutcome};
use crate::domain::ports::{ChatCompletion, ImageTextExtractor};
use crate::utils::error::SolverError;
use crate::utils::validation::BYTES_PER_MB;

pub const MAX_SIMILAR_COUNT: usize = 10;

/// Shared, read-only state for every request.
pub struct AppState<C: ChatCompletion, E: ImageTextExtractor> {
    pub service: TutorService<C, E>,
    pub similar_count: usize,
    pub max_upload_mb: usize,
}

impl<C: ChatCompletion, E: ImageTextExtractor> AppState<C, E> {
    pub fn upload_limit_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub similar_problems: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub text_client_configured: bool,
    pub vision_client_configured: bool,
}

/// `{"error": ...}` body with 400 for caller mistakes (413 for oversized
/// uploads) and 500 otherwise.
#[derive(Debug)]
pub struct ApiError(pub SolverError);

impl From<SolverError> for ApiError {
    fn from(err: SolverError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if matches!(self.0, SolverError::UploadTooLarge { .. }) {
            StatusCode::PAYLOAD_TOO_LARGE
        } else if self.0.is_client_fault() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(
                "Request failed: {} (Category: {:?}); {}",
                self.0,
                self.0.category(),
                self.0.recovery_suggestion()
            );
        } else {
            tracing::info!("Rejected request: {}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.user_friendly_message() });
        (status, Json(body)).into_response()
    }
}

/// Form fields from either a multipart or a urlencoded body.
#[derive(Debug, Default)]
pub struct FormInput {
    pub fields: HashMap<String, String>,
    pub image: Option<(String, Vec<u8>)>,
}

impl FormInput {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub async fn from_request(request: Request, max_upload_mb: usize) -> Result<Self, ApiError> {
        let is_multipart = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| bad_form(e.status(), e.body_text(), max_upload_mb))?;
            Self::from_multipart(multipart, max_upload_mb).await
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &())
                .await
                .map_err(|e| bad_form(e.status(), e.body_text(), max_upload_mb))?;
            Ok(Self {
                fields,
                image: None,
            })
        }
    }

    async fn from_multipart(mut multipart: Multipart, max_upload_mb: usize) -> Result<Self, ApiError> {
        let mut input = FormInput::default();
        let bad_field = |e: MultipartError| bad_form(e.status(), e.body_text(), max_upload_mb);

        while let Some(field) = multipart.next_field().await.map_err(bad_field)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "problem_image" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_field)?;
                // 瀏覽器在未選檔時仍會送出空的 file part
                if !filename.is_empty() {
                    input.image = Some((filename, bytes.to_vec()));
                }
            } else {
                let value = field.text().await.map_err(bad_field)?;
                input.fields.insert(name, value);
            }
        }

        Ok(input)
    }
}

/// The body limit surfaces as a 413 rejection from the form extractors, either
/// up front or while the multipart stream is read.
fn bad_form(status: StatusCode, reason: String, max_upload_mb: usize) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError(SolverError::UploadTooLarge {
            max_mb: max_upload_mb,
        });
    }
    ApiError(SolverError::invalid_input(format!(
        "Invalid form data: {}",
        reason
    )))
}

pub async fn health_check<C, E>(State(state): State<Arc<AppState<C, E>>>) -> Json<HealthResponse>
where
    C: ChatCompletion + 'static,
    E: ImageTextExtractor + 'static,
{
    Json(HealthResponse {
        status: "healthy",
        service: "math-solver",
        text_client_configured: state.service.generator().client().is_configured(),
        vision_client_configured: state.service.extractor().is_configured(),
    })
}

/// `POST /solve`: `problem_image` or `problem_text`, optional `domain`.
pub async fn solve<C, E>(
    State(state): State<Arc<AppState<C, E>>>,
    request: Request,
) -> Result<Json<SolveOutcome>, ApiError>
where
    C: ChatCompletion + 'static,
    E: ImageTextExtractor + 'static,
{
    let mut form = FormInput::from_request(request, state.max_upload_mb).await?;

    let input = match form.image.take() {
        Some((filename, bytes)) => ProblemInput::Image { filename, bytes },
        None => ProblemInput::Text(form.field("problem_text").unwrap_or_default().to_string()),
    };

    let outcome = state.service.solve(input, form.field("domain")).await?;
    Ok(Json(outcome))
}

/// `POST /similar`: `problem_text`, optional `domain` and `count`.
pub async fn similar<C, E>(
    State(state): State<Arc<AppState<C, E>>>,
    request: Request,
) -> Result<Json<SimilarResponse>, ApiError>
where
    C: ChatCompletion + 'static,
    E: ImageTextExtractor + 'static,
{
    let form = FormInput::from_request(request, state.max_upload_mb).await?;
    let count = parse_count(form.field("count"), state.similar_count)?;

    let similar_problems = state
        .service
        .similar(
            form.field("problem_text").unwrap_or_default(),
            form.field("domain"),
            count,
        )
        .await?;

    Ok(Json(SimilarResponse { similar_problems }))
}

fn parse_count(raw: Option<&str>, default: usize) -> Result<usize, ApiError> {
    let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => return Ok(default),
    };

    match raw.parse::<usize>() {
        Ok(n) if (1..=MAX_SIMILAR_COUNT).contains(&n) => Ok(n),
        _ => Err(ApiError(SolverError::invalid_input(format!(
            "count must be a whole number between 1 and {}",
            MAX_SIMILAR_COUNT
        )))),
    }
}
