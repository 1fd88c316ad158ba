// Live dashboard service - Streams simulated windows for a selected region
use crate::application::region_service::RegionService;
use crate::application::seed_repository::SeedRepository;
use crate::application::session::{SessionUpdate, SimulatorSession};
use crate::domain::live::LiveMessage;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Clone)]
pub struct LiveDashboardService {
    repository: Arc<dyn SeedRepository>,
    regions: RegionService,
}

impl LiveDashboardService {
    pub fn new(repository: Arc<dyn SeedRepository>) -> Self {
        let regions = RegionService::new(repository.clone());
        Self { repository, regions }
    }

    /// Open a live stream for `fips`. Returns `None` for an unknown county.
    ///
    /// The session backing the stream lives until the receiver is dropped.
    pub async fn stream_region(
        &self,
        fips: &str,
        crop: &str,
    ) -> anyhow::Result<Option<mpsc::Receiver<LiveMessage>>> {
        let Some(county) = self.regions.find_county(fips).await? else {
            return Ok(None);
        };

        // A failed seed lookup degrades to "no data" for this region
        let seed = match self.repository.county_seed(&county, crop).await {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!("Error fetching seed for {}: {:#}", fips, e);
                None
            }
        };

        // Seeds without any usable history leave both windows empty, which is "no data"
        let session = seed.as_ref().and_then(|seed| {
            let mut session = SimulatorSession::new();
            session.start(seed, chrono::Utc::now().timestamp_millis());
            session.is_running().then_some(session)
        });

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let region_msg = LiveMessage::Region {
            county: county.clone(),
            crop: crop.to_string(),
            has_data: session.is_some(),
            answer: seed.as_ref().map(|s| s.answer.answer.clone()),
            predictions: seed
                .as_ref()
                .map(|s| s.answer.predictions.clone())
                .unwrap_or_default(),
        };
        let _ = tx.send(region_msg).await;

        let Some(session) = session else {
            tracing::debug!("No seed data for {}, sending empty windows", county.fips);
            let _ = tx.send(LiveMessage::Series { points: Vec::new() }).await;
            let _ = tx.send(LiveMessage::Weather { points: Vec::new() }).await;
            return Ok(Some(rx));
        };

        let fips = county.fips.clone();
        tokio::spawn(async move {
            tracing::debug!("Live session opened for {}", fips);
            let mut updates = Box::pin(session.updates());
            loop {
                // an idle family never wakes `updates`, so watch for the client leaving too
                let update = tokio::select! {
                    update = updates.next() => update,
                    _ = tx.closed() => None,
                };
                let Some(update) = update else {
                    break;
                };
                let msg = match update {
                    SessionUpdate::Series(points) => LiveMessage::Series { points },
                    SessionUpdate::Weather(points) => LiveMessage::Weather { points },
                };
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            drop(session);
            tracing::debug!("Live session closed for {}", fips);
        });

        Ok(Some(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::window::{SERIES_WINDOW, WEATHER_WINDOW};
    use crate::domain::evidence::{
        AnswerResponse, CountySeed, FeatureContext, FeatureContextRecord, ForecastEntry,
        ForecastResponse, RiskLevel,
    };
    use crate::domain::region::County;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct InMemoryRepository {
        counties: Vec<County>,
        seeds: HashMap<String, CountySeed>,
    }

    #[async_trait]
    impl SeedRepository for InMemoryRepository {
        async fn list_counties(&self) -> anyhow::Result<Vec<County>> {
            Ok(self.counties.clone())
        }

        async fn county_seed(&self, county: &County, _crop: &str) -> anyhow::Result<Option<CountySeed>> {
            if county.fips == "17119" {
                anyhow::bail!("backend unavailable");
            }
            Ok(self.seeds.get(&county.fips).cloned())
        }
    }

    fn county(fips: &str, name: &str) -> County {
        County {
            fips: fips.to_string(),
            name: name.to_string(),
            state: "IL".to_string(),
            centroid: [40.0, -89.0],
            bbox: [-90.0, 39.5, -88.5, 40.5],
        }
    }

    /// Answer text but no feature records and no forecast entries
    fn empty_seed() -> CountySeed {
        CountySeed {
            answer: AnswerResponse {
                answer: "Peoria outlook".to_string(),
                predictions: vec![],
                feature_context: vec![],
            },
            forecast: ForecastResponse {
                region: "Peoria County".to_string(),
                crop: "Corn".to_string(),
                growth_stage: "VT-R1".to_string(),
                forecast_data: vec![],
                error: None,
            },
        }
    }

    fn alive_tasks() -> usize {
        tokio::runtime::Handle::current().metrics().num_alive_tasks()
    }

    fn service() -> LiveDashboardService {
        let seed = CountySeed {
            answer: AnswerResponse {
                answer: "Sangamon outlook".to_string(),
                predictions: vec![],
                feature_context: vec![FeatureContext {
                    region_id: "17167".to_string(),
                    region_name: "Sangamon County".to_string(),
                    crop: "Corn".to_string(),
                    score: 0.9,
                    records: vec![FeatureContextRecord {
                        avg_temp_c: Some(29.2),
                        ..Default::default()
                    }],
                }],
            },
            forecast: ForecastResponse {
                region: "Sangamon County".to_string(),
                crop: "Corn".to_string(),
                growth_stage: "VT-R1".to_string(),
                forecast_data: vec![ForecastEntry {
                    time: "2024-07-15".to_string(),
                    temp: 31.0,
                    precip: 5.5,
                    wind: 11.0,
                    risk_level: RiskLevel::Medium,
                    risk_detail: "Heat index watch".to_string(),
                    source: "HRRR".to_string(),
                }],
                error: None,
            },
        };

        let repository = InMemoryRepository {
            counties: vec![
                county("17167", "Sangamon"),
                county("17113", "McLean"),
                county("17119", "Madison"),
                county("17143", "Peoria"),
            ],
            seeds: HashMap::from([
                ("17167".to_string(), seed),
                ("17143".to_string(), empty_seed()),
            ]),
        };
        LiveDashboardService::new(Arc::new(repository))
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_county() {
        assert!(service().stream_region("99999", "Corn").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_region_without_data_sends_empty_windows() {
        let mut rx = service().stream_region("17113", "Soybean").await.unwrap().unwrap();

        match rx.recv().await {
            Some(LiveMessage::Region { has_data, county, .. }) => {
                assert!(!has_data);
                assert_eq!(county.fips, "17113");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(rx.recv().await, Some(LiveMessage::Series { points: vec![] }));
        assert_eq!(rx.recv().await, Some(LiveMessage::Weather { points: vec![] }));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_failure_degrades_to_no_data() {
        let mut rx = service().stream_region("17119", "Corn").await.unwrap().unwrap();
        assert!(matches!(rx.recv().await, Some(LiveMessage::Region { has_data: false, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_pushes_initial_and_ticked_windows() {
        let mut rx = service().stream_region("17167", "Corn").await.unwrap().unwrap();

        match rx.recv().await {
            Some(LiveMessage::Region { has_data, answer, .. }) => {
                assert!(has_data);
                assert_eq!(answer.as_deref(), Some("Sangamon outlook"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut series_msgs = 0;
        let mut weather_msgs = 0;
        while series_msgs < 2 || weather_msgs < 2 {
            match rx.recv().await {
                Some(LiveMessage::Series { points }) => {
                    assert_eq!(points.len(), SERIES_WINDOW);
                    series_msgs += 1;
                }
                Some(LiveMessage::Weather { points }) => {
                    assert_eq!(points.len(), WEATHER_WINDOW);
                    weather_msgs += 1;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_without_history_is_no_data() {
        let mut rx = service().stream_region("17143", "Corn").await.unwrap().unwrap();

        match rx.recv().await {
            Some(LiveMessage::Region { has_data, answer, .. }) => {
                assert!(!has_data);
                assert_eq!(answer.as_deref(), Some("Peoria outlook"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(rx.recv().await, Some(LiveMessage::Series { points: vec![] }));
        assert_eq!(rx.recv().await, Some(LiveMessage::Weather { points: vec![] }));
        assert_eq!(rx.recv().await, None);

        tokio::time::sleep(std::time::Duration::from_secs(3_600)).await;
        assert_eq!(alive_tasks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_disconnect_ends_session() {
        let mut rx = service().stream_region("17167", "Corn").await.unwrap().unwrap();
        for _ in 0..3 {
            assert!(rx.recv().await.is_some());
        }
        // forwarding task plus one timer per family
        assert_eq!(alive_tasks(), 3);

        drop(rx);
        // well before the next tick, so only the closed channel can end the task
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(alive_tasks(), 0);
    }
}
