use std::time::Duration;

use reqwest::Client;

use super::error::ApiError;
use super::types::{JobHandle, StatusResponse, SubmitRequest};

const MODEL: &str = "image-effects";
const TOOL_TYPE: &str = "image-effects";

/// Transport seam for job submission and status queries.
///
/// Implemented by [`EffectsClient`] against the real API and by scripted
/// mocks in tests.
#[allow(async_fn_in_trait)]
pub trait EffectsApi {
    async fn submit(&self, image_url: &str) -> Result<JobHandle, ApiError>;
    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, ApiError>;
}

pub struct EffectsClient {
    client: Client,
    base_url: String,
    user_id: String,
    effect_id: String,
}

impl EffectsClient {
    /// Create a client with the base URL, caller identity and effect id from
    /// config. Tests point the base URL at a local mock server.
    pub fn new(base_url: String, user_id: String, effect_id: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url,
            user_id,
            effect_id,
        }
    }
}

impl EffectsApi for EffectsClient {
    async fn submit(&self, image_url: &str) -> Result<JobHandle, ApiError> {
        let req = SubmitRequest {
            model: MODEL.to_string(),
            tool_type: TOOL_TYPE.to_string(),
            effect_id: self.effect_id.clone(),
            image_url: image_url.to_string(),
            user_id: self.user_id.clone(),
            remove_watermark: true,
            is_private: true,
        };

        let response = self
            .client
            .post(format!("{}/image-gen", self.base_url))
            .header("accept", "application/json, text/plain, */*")
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<JobHandle>().await?;
        Ok(body)
    }

    async fn job_status(&self, job_id: &str) -> Result<StatusResponse, ApiError> {
        let response = self
            .client
            .get(format!(
                "{}/image-gen/{}/{}/status",
                self.base_url, self.user_id, job_id
            ))
            .header("accept", "application/json, text/plain, */*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "status check failed".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<StatusResponse>().await?;
        Ok(body)
    }
}
