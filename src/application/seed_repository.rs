// Repository trait for region lookup and simulation seed data
use crate::domain::evidence::CountySeed;
use crate::domain::region::County;
use async_trait::async_trait;

#[async_trait]
pub trait SeedRepository: Send + Sync {
    /// Counties available for selection
    async fn list_counties(&self) -> anyhow::Result<Vec<County>>;

    /// Seed data for a county and crop. `None` when the region has no data.
    async fn county_seed(&self, county: &County, crop: &str) -> anyhow::Result<Option<CountySeed>>;
}
