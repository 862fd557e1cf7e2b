// Handles communication with the handwriting synthesis backend

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{
    LineRequest, LineResponse, PageRequest, PageResponse, ServiceInfo, StyleDetail, StyleList,
    Tagged,
};

const GENERATE_PATH: &str = "/handwriting/generate";
const STYLES_PATH: &str = "/handwriting/styles";
const A4_PAGE_PATH: &str = "/handwriting/a4page";

/// Backend client.
///
/// Constructed once and shared by reference; every call resolves to either
/// the typed payload or an [`ApiError`] naming the failure category.
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ApiConfig::from_env()?))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Line mode: one SVG for all lines.
    pub async fn generate_lines(&self, request: &LineRequest) -> Result<LineResponse, ApiError> {
        let url = self.config.endpoint(GENERATE_PATH);
        let result = self
            .fetch::<LineResponse>(self.http.post(url).json(request))
            .await
            .and_then(reject_error_tag);
        logged("generate", result)
    }

    /// Page mode: the backend splits the text into pages.
    pub async fn generate_pages(&self, request: &PageRequest) -> Result<PageResponse, ApiError> {
        let url = self.config.endpoint(A4_PAGE_PATH);
        let result = self
            .fetch::<PageResponse>(self.http.post(url).json(request))
            .await
            .and_then(reject_error_tag)
            .and_then(check_page_count);
        logged("a4page", result)
    }

    pub async fn list_styles(&self) -> Result<StyleList, ApiError> {
        let url = self.config.endpoint(STYLES_PATH);
        let result = self.fetch(self.http.get(url)).await;
        logged("list_styles", result)
    }

    pub async fn style_detail(&self, style_id: u32) -> Result<StyleDetail, ApiError> {
        let url = self.config.endpoint(&format!("{STYLES_PATH}/{style_id}"));
        let result = self.fetch(self.http.get(url)).await;
        logged("style_detail", result)
    }

    /// Reachability check against the service root.
    pub async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
        let result = self.fetch(self.http.get(self.config.root())).await;
        logged("service_info", result)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let request = builder.build()?;
        debug!(method = %request.method(), url = %request.url(), "backend call");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_error_body(status, &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

fn reject_error_tag<T: Tagged>(response: T) -> Result<T, ApiError> {
    if response.is_error() {
        let detail = if response.message().trim().is_empty() {
            "Generation failed".to_string()
        } else {
            response.message().to_string()
        };
        return Err(ApiError::Application {
            status: reqwest::StatusCode::OK,
            detail,
        });
    }
    Ok(response)
}

fn check_page_count(response: PageResponse) -> Result<PageResponse, ApiError> {
    match response.page_count {
        Some(count) if count as usize != response.pages.len() => {
            Err(ApiError::InvalidResponse(format!(
                "page_count is {count} but {} pages were returned",
                response.pages.len()
            )))
        }
        _ => Ok(response),
    }
}

// Diagnostics only; the result passes through untouched.
fn logged<T>(operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(err) = &result {
        match err {
            ApiError::Application { status, detail } => warn!(
                operation,
                category = "application",
                status = status.as_u16(),
                %detail,
                "backend call failed"
            ),
            other => warn!(
                operation,
                category = %other.kind(),
                error = %other,
                "backend call failed"
            ),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(ApiConfig::new(server.uri()).unwrap())
    }

    #[tokio::test]
    async fn generate_lines_posts_per_line_arrays() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/handwriting/generate"))
            .and(body_json(serde_json::json!({
                "lines": ["hello", "world"],
                "biases": [0.5, 0.5],
                "stroke_colors": ["black", "black"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "svg_content": "<svg>lines</svg>",
                "message": "Handwriting generated successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = LineRequest {
            lines: vec!["hello".into(), "world".into()],
            biases: Some(vec![0.5, 0.5]),
            stroke_colors: Some(vec!["black".into(), "black".into()]),
            ..Default::default()
        };
        let response = client_for(&server).generate_lines(&request).await.unwrap();
        assert_eq!(response.svg_content, "<svg>lines</svg>");
    }

    #[tokio::test]
    async fn error_status_promotes_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/handwriting/a4page"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(serde_json::json!({ "detail": "rate limit exceeded" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_pages(&PageRequest {
                text: "hi".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            ApiError::Application { status, detail } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(detail, "rate limit exceeded");
            }
            other => panic!("expected application failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_tag_in_success_body_is_an_application_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/handwriting/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "svg_content": "",
                "message": "Invalid character detected"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_lines(&LineRequest {
                lines: vec!["~".into()],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Application);
        assert_eq!(err.to_string(), "Invalid character detected");
    }

    #[tokio::test]
    async fn mismatched_page_count_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/handwriting/a4page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "pages": ["<svg>1</svg>"],
                "message": "ok",
                "line_count": 30,
                "page_count": 2
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_pages(&PageRequest {
                text: "hi".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidResponse);
    }

    #[tokio::test]
    async fn undecodable_body_is_an_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/handwriting/styles"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_styles().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidResponse);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_failure() {
        let client = ApiClient::new(ApiConfig::new("http://127.0.0.1:1").unwrap());
        let err = client.list_styles().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn service_info_hits_unversioned_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "Welcome to Kalam3 API" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let info = client_for(&server).service_info().await.unwrap();
        assert_eq!(info.message, "Welcome to Kalam3 API");
    }
}
