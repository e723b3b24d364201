// HTTP response mapping for page translation results

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::core::errors::PipelineError;
use crate::core::types::{PageTranslation, RequestConfig};

/// Status code returned for each failure kind
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Configuration(_) => StatusCode::BAD_REQUEST,
        PipelineError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        PipelineError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        PipelineError::ProviderProcessing { .. } | PipelineError::Transport { .. } => {
            StatusCode::BAD_GATEWAY
        }
        PipelineError::NoTextDetected => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Fill in the server default key when the request brings none or a blank one
pub fn with_default_key(mut request: RequestConfig, default_key: Option<&str>) -> RequestConfig {
    let missing = request
        .api_key
        .as_deref()
        .map_or(true, |k| k.trim().is_empty());
    if missing {
        request.api_key = default_key.map(str::to_string);
    }
    request
}

/// Failure body shared by every endpoint
pub fn failure(status: StatusCode, kind: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "kind": kind,
            "error": message,
        })),
    )
        .into_response()
}

pub fn bad_request(message: String) -> Response {
    failure(StatusCode::BAD_REQUEST, "bad_request", message)
}

pub fn pipeline_failure(err: &PipelineError) -> Response {
    failure(status_for(err), err.kind(), err.user_message())
}

pub fn page_success(page: &PageTranslation) -> Response {
    Json(serde_json::json!({
        "success": true,
        "outcome": page.outcome,
        "blocks": page.blocks,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{Provider, ProviderError};
    use crate::core::types::{BlockBox, TargetLanguage, TextBlock, TranslationOutcome};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (
                PipelineError::Configuration("no API key provided".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::AccessDenied {
                    provider: Provider::Recognition,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                PipelineError::AccessDenied {
                    provider: Provider::ImageSource,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                PipelineError::RateLimited {
                    provider: Provider::Translation,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                PipelineError::ProviderProcessing {
                    provider: Provider::Recognition,
                    message: "E216".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                PipelineError::Transport {
                    provider: Provider::Recognition,
                    source: ProviderError::Transport {
                        status: Some(500),
                        message: "HTTP 500".into(),
                    },
                },
                StatusCode::BAD_GATEWAY,
            ),
            (PipelineError::NoTextDetected, StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (err, expected) in cases {
            assert_eq!(status_for(&err), expected, "{}", err.kind());
        }
    }

    #[tokio::test]
    async fn test_failure_body() {
        let response = pipeline_failure(&PipelineError::NoTextDetected);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "no_text_detected");
        assert_eq!(body["error"], "No text detected in the image.");
    }

    #[tokio::test]
    async fn test_success_body() {
        let page = PageTranslation {
            outcome: TranslationOutcome::Complete,
            blocks: vec![TextBlock::new(
                "hi".into(),
                BlockBox { x: 0.0, y: 0.0, w: 1.0, h: 1.0 },
            )],
        };
        let response = page_success(&page);
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["outcome"], "complete");
        assert_eq!(body["blocks"][0]["originalText"], "hi");
    }

    #[test]
    fn test_default_key_fills_missing_or_blank() {
        let missing = RequestConfig::default();
        assert_eq!(
            with_default_key(missing, Some("SERVER")).api_key.as_deref(),
            Some("SERVER")
        );

        let blank = RequestConfig::new(TargetLanguage::English, "   ");
        let filled = with_default_key(blank, Some("SERVER"));
        assert_eq!(filled.api_key.as_deref(), Some("SERVER"));
        assert_eq!(filled.target_language, TargetLanguage::English);

        let own = RequestConfig::new(TargetLanguage::English, "MINE");
        assert_eq!(
            with_default_key(own, Some("SERVER")).api_key.as_deref(),
            Some("MINE")
        );

        assert!(with_default_key(RequestConfig::default(), None)
            .api_key
            .is_none());
    }
}
