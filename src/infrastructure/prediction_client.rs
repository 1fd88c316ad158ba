// HTTP client for the prediction backend
use crate::domain::evidence::{AnswerResponse, ForecastResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("failed to reach prediction backend: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("forecast error: {0}")]
    Forecast(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionSelection {
    pub region_name: Option<String>,
    pub region_fips: Option<String>,
    pub region_state: Option<String>,
    pub crop: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub crops: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context: Option<u32>,
    pub selection: RegionSelection,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastRequest {
    pub region: String,
    pub crop: String,
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: String,
    client: reqwest::Client,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post_json<Req, Resp>(&self, endpoint: &'static str, body: &Req) -> Result<Resp, PredictionError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::Status { endpoint, status, body });
        }

        Ok(response.json::<Resp>().await?)
    }

    /// Retrieval + prediction for a natural-language query
    pub async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, PredictionError> {
        self.post_json("answer", request).await
    }

    pub async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse, PredictionError> {
        let forecast: ForecastResponse = self.post_json("forecast", request).await?;
        if let Some(error) = forecast.error.clone() {
            return Err(PredictionError::Forecast(error));
        }
        Ok(forecast)
    }
}
