//! Analysis gateway over HTTP

use super::protocol::{
    ANALYZE_PATH, AnalysisResponse, AnalyzeBody, CHAT_FOLLOWUP_PATH, CHAT_PATH, ChatBody,
    ChatResponse, DetectResponse, HEALTH_PATH, IDENTIFY_PATH, IdentifyBody, IdentifyResponse,
    error_message,
};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shoplens_application::ports::analysis_gateway::{
    AnalysisGateway, ChatAnalyzeRequest, ChatFollowupRequest, ChatReply, DeepAnalysisRequest,
    GatewayError, IdentifyRequest,
};
use shoplens_domain::{AnalysisReport, Detections, Identification, ImageAsset};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("shoplens/", env!("CARGO_PKG_VERSION"));

/// [`AnalysisGateway`] backed by the service's JSON API.
///
/// One shared [`reqwest::Client`]; every request carries the caller's bearer
/// token and the configured timeout.
pub struct HttpAnalysisGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalysisGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let gateway = Self::with_client(client, base_url);
        info!("HttpAnalysisGateway initialized for {}", gateway.base_url);
        Ok(gateway)
    }

    /// Create a gateway around an existing client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, token: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(GatewayError::ServerError {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ConnectionError(error.to_string())
    }
}

#[async_trait]
impl AnalysisGateway for HttpAnalysisGateway {
    async fn detect(&self, token: &str, image: &ImageAsset) -> Result<Detections, GatewayError> {
        let response: DetectResponse = self
            .post(ANALYZE_PATH, token, &AnalyzeBody::detect(image))
            .await?;
        let detections = response.into_detections();
        debug!(count = detections.len(), "detection response");
        Ok(detections)
    }

    async fn identify(
        &self,
        token: &str,
        request: IdentifyRequest<'_>,
    ) -> Result<Identification, GatewayError> {
        let response: IdentifyResponse = self
            .post(IDENTIFY_PATH, token, &IdentifyBody::from(&request))
            .await?;
        response.into_identification()
    }

    async fn deep_analyze(
        &self,
        token: &str,
        request: DeepAnalysisRequest<'_>,
    ) -> Result<AnalysisReport, GatewayError> {
        let response: AnalysisResponse = self
            .post(ANALYZE_PATH, token, &AnalyzeBody::deep(&request))
            .await?;
        Ok(response.into())
    }

    async fn chat_analyze(
        &self,
        token: &str,
        request: ChatAnalyzeRequest<'_>,
    ) -> Result<ChatReply, GatewayError> {
        let response: ChatResponse = self
            .post(CHAT_PATH, token, &ChatBody::from(&request))
            .await?;
        Ok(response.into())
    }

    async fn chat_followup(
        &self,
        token: &str,
        request: ChatFollowupRequest<'_>,
    ) -> Result<ChatReply, GatewayError> {
        let response: ChatResponse = self
            .post(CHAT_FOLLOWUP_PATH, token, &ChatBody::from(&request))
            .await?;
        Ok(response.into())
    }

    async fn health(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let bytes = response.bytes().await.unwrap_or_default();
            Err(GatewayError::ServerError {
                status: status.as_u16(),
                message: error_message(&bytes),
            })
        }
    }
}
