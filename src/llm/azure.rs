//! Azure `OpenAI` responses endpoint with the image generation tool

use super::types::{ErrorResponse, OutputItem, RequestTurn, ResponsesRequest, ResponsesResponse, ToolSpec};
use super::{ImageEditService, LlmError};
use crate::config::AzureConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Header naming the deployment that renders images
const IMAGE_DEPLOYMENT_HEADER: &str = "x-ms-oai-image-generation-deployment";

/// Azure `OpenAI` service implementation
pub struct AzureResponsesService {
    client: Client,
    url: String,
    api_key: String,
    api_version: String,
    chat_deployment: String,
    image_deployment: String,
}

impl AzureResponsesService {
    pub fn new(config: &AzureConfig, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: Self::responses_url(&config.endpoint),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            chat_deployment: config.chat_deployment.clone(),
            image_deployment: config.image_deployment.clone(),
        })
    }

    fn responses_url(endpoint: &str) -> String {
        format!("{}/openai/v1/responses", endpoint.trim_end_matches('/'))
    }

    fn build_body<'a>(&'a self, turns: &'a [RequestTurn]) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.chat_deployment,
            input: turns,
            tools: vec![ToolSpec::IMAGE_GENERATION],
        }
    }

    fn parse_success(body: &str) -> Result<Vec<OutputItem>, LlmError> {
        let parsed: ResponsesResponse = serde_json::from_str(body)
            .map_err(|e| LlmError::unknown(format!("Failed to parse response: {e}")))?;
        Ok(parsed.output)
    }

    fn parse_failure(status: reqwest::StatusCode, body: &str) -> LlmError {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(error_resp) => {
                if let Some(code) = &error_resp.error.code {
                    tracing::debug!(status = status.as_u16(), code = %code, "Service error code");
                }
                LlmError::from_status(status.as_u16(), &error_resp.error.message)
            }
            Err(_) => LlmError::from_status(status.as_u16(), body),
        }
    }
}

#[async_trait]
impl ImageEditService for AzureResponsesService {
    async fn respond(&self, turns: &[RequestTurn]) -> Result<Vec<OutputItem>, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .header(IMAGE_DEPLOYMENT_HEADER, &self.image_deployment)
            .header("Content-Type", "application/json")
            .json(&self.build_body(turns))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_failure(status, &body));
        }

        Self::parse_success(&body)
    }

    fn model_id(&self) -> &str {
        &self.chat_deployment
    }
}
