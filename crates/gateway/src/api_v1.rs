//! Paper API.
//!
//! Endpoints:
//!
//! - `POST /api/paper/generate`  generate a question paper
//! - `POST /v1/paper/generate`   same, under the versioned prefix
//! - `GET  /v1/syllabus`         chapters and topics the generator accepts

use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use paperforge_core::error::{PaperError, StatusClass};
use paperforge_core::paper::GenerationResult;
use paperforge_engine::RawPaperRequest;
use paperforge_engine::syllabus::SyllabusEntry;
use serde::Serialize;
use tracing::error;

use crate::SharedState;

/// Build the v1 router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/paper/generate", post(generate_handler))
        .route("/syllabus", get(syllabus_handler))
        .with_state(state)
}

// ── Error mapping ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn paper_error(err: &PaperError) -> ApiError {
    let status = match err.status_class() {
        StatusClass::InvalidRequest => StatusCode::BAD_REQUEST,
        StatusClass::Upstream => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn body_error(rejection: &BytesRejection) -> ApiError {
    (
        rejection.status(),
        Json(ErrorResponse {
            error: rejection.body_text(),
        }),
    )
}

fn unexpected_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Unexpected error occurred.".into(),
        }),
    )
}

// ── Generate ──────────────────────────────────────────────────────────────

/// Generate a paper. A body that is not a JSON object is treated as `{}`;
/// a body that cannot be read (e.g. over the size limit) is rejected.
pub(crate) async fn generate_handler(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let body = body.map_err(|rejection| body_error(&rejection))?;
    let raw = RawPaperRequest::from_json_lenient(&body);
    let generator = state.generator.clone();

    // A panic inside the pipeline surfaces as a join error. Needs `panic = "unwind"`.
    let outcome = tokio::spawn(async move { generator.generate(&raw).await }).await;

    match outcome {
        Ok(Ok(result)) => Ok(Json(result)),
        Ok(Err(e)) => Err(paper_error(&e)),
        Err(e) => {
            error!(error = %e, "Paper generation task failed");
            Err(unexpected_error())
        }
    }
}

// ── Syllabus ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusResponse {
    pub class_level: u32,
    pub subject: &'static str,
    pub chapters: Vec<SyllabusEntry>,
}

async fn syllabus_handler(State(state): State<SharedState>) -> Json<SyllabusResponse> {
    Json(SyllabusResponse {
        class_level: paperforge_engine::request::SUPPORTED_CLASS_LEVEL,
        subject: paperforge_engine::request::SUPPORTED_SUBJECT,
        chapters: state.generator.registry().entries().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let (status, body) = paper_error(&PaperError::UnsupportedScope("Only Science is supported right now.".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Only Science is supported right now.");

        let (status, _) = paper_error(&PaperError::UnknownChapter {
            unknown: vec!["X".into()],
            valid: vec!["Heredity".into()],
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for err in [
            PaperError::Embedding("e".into()),
            PaperError::Retrieval("r".into()),
            PaperError::Generation("g".into()),
            PaperError::EmptyGeneration,
        ] {
            assert_eq!(paper_error(&err).0, StatusCode::BAD_GATEWAY);
        }

        let (status, body) = unexpected_error();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Unexpected error occurred.");
    }
}
