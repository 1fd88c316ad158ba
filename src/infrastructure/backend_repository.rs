// Seed repository backed by the prediction backend
use crate::application::seed_repository::SeedRepository;
use crate::domain::evidence::CountySeed;
use crate::domain::region::County;
use crate::infrastructure::prediction_client::{
    AnswerRequest, ForecastRequest, PredictionClient, RegionSelection,
};
use anyhow::{Context, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct BackendSeedRepository {
    client: PredictionClient,
    /// County lookup table; the backend is only asked for seeds
    counties: Vec<County>,
}

impl BackendSeedRepository {
    pub fn new(client: PredictionClient, counties: Vec<County>) -> Self {
        Self { client, counties }
    }

    fn build_query(county: &County, crop: &str) -> String {
        format!(
            "Using the latest remote-sensing, weather and risk signals, analyze {} in {} with actionable recommendations.",
            crop,
            county.display_name()
        )
    }

    fn answer_request(county: &County, crop: &str) -> AnswerRequest {
        AnswerRequest {
            query: Self::build_query(county, crop),
            max_context: None,
            selection: RegionSelection {
                region_name: Some(county.display_name()),
                region_fips: Some(county.fips.clone()),
                region_state: Some(county.state.clone()),
                crop: Some(crop.to_string()),
                crops: vec![crop.to_string()],
            },
        }
    }
}

#[async_trait]
impl SeedRepository for BackendSeedRepository {
    async fn list_counties(&self) -> Result<Vec<County>> {
        Ok(self.counties.clone())
    }

    async fn county_seed(&self, county: &County, crop: &str) -> Result<Option<CountySeed>> {
        let answer_request = Self::answer_request(county, crop);
        let forecast_request = ForecastRequest {
            region: county.display_name(),
            crop: crop.to_string(),
        };

        let (answer, forecast) = futures::try_join!(
            async {
                self.client
                    .answer(&answer_request)
                    .await
                    .context("Failed to fetch answer from prediction backend")
            },
            async {
                self.client
                    .forecast(&forecast_request)
                    .await
                    .context("Failed to fetch forecast from prediction backend")
            },
        )?;

        if answer.feature_context.is_empty() && forecast.forecast_data.is_empty() {
            tracing::debug!("Backend returned no series data for {}", county.fips);
            return Ok(None);
        }

        Ok(Some(CountySeed { answer, forecast }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_request_carries_selection() {
        let county = County {
            fips: "17113".to_string(),
            name: "McLean".to_string(),
            state: "IL".to_string(),
            centroid: [40.6, -88.82],
            bbox: [-89.22, 40.32, -88.42, 40.88],
        };
        let request = BackendSeedRepository::answer_request(&county, "Soybean");

        assert!(request.query.contains("Soybean"));
        assert!(request.query.contains("McLean County, IL"));
        assert_eq!(request.selection.region_fips.as_deref(), Some("17113"));
        assert_eq!(request.selection.crops, vec!["Soybean".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_an_error() {
        // port 9 (discard) is not expected to serve HTTP
        let repo = BackendSeedRepository::new(PredictionClient::new("http://127.0.0.1:9"), vec![]);
        let county = County {
            fips: "17167".to_string(),
            name: "Sangamon".to_string(),
            state: "IL".to_string(),
            centroid: [39.76, -89.66],
            bbox: [-89.99, 39.52, -89.22, 39.98],
        };
        assert!(repo.county_seed(&county, "Corn").await.is_err());
    }
}
