// Region service - Use cases for listing and locating counties
use crate::application::seed_repository::SeedRepository;
use crate::domain::region::{find_nearest_county, County};
use std::sync::Arc;

#[derive(Clone)]
pub struct RegionService {
    repository: Arc<dyn SeedRepository>,
}

impl RegionService {
    pub fn new(repository: Arc<dyn SeedRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_counties(&self) -> anyhow::Result<Vec<County>> {
        self.repository.list_counties().await
    }

    pub async fn find_county(&self, fips: &str) -> anyhow::Result<Option<County>> {
        let counties = self.repository.list_counties().await?;
        Ok(counties.into_iter().find(|c| c.fips == fips))
    }

    /// County whose centroid is closest to a clicked map position
    pub async fn nearest_county(&self, lat: f64, lng: f64) -> anyhow::Result<Option<County>> {
        let counties = self.repository.list_counties().await?;
        Ok(find_nearest_county(lat, lng, &counties).cloned())
    }
}
