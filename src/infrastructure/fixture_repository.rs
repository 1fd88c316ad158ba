// Offline seed dataset loaded from a JSON file
use crate::application::seed_repository::SeedRepository;
use crate::domain::evidence::CountySeed;
use crate::domain::region::County;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureDataset {
    #[serde(default)]
    pub counties: Vec<County>,
    /// Keyed by county fips
    #[serde(default)]
    pub seeds: HashMap<String, CountySeed>,
}

#[derive(Debug, Clone)]
pub struct FixtureRepository {
    dataset: FixtureDataset,
}

impl FixtureRepository {
    pub fn new(dataset: FixtureDataset) -> Self {
        Self { dataset }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures from {}", path.display()))?;
        let dataset: FixtureDataset = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixtures in {}", path.display()))?;

        tracing::debug!(
            "Loaded {} counties, {} seeds from {}",
            dataset.counties.len(),
            dataset.seeds.len(),
            path.display()
        );
        Ok(Self::new(dataset))
    }

    pub fn counties(&self) -> &[County] {
        &self.dataset.counties
    }
}

#[async_trait]
impl SeedRepository for FixtureRepository {
    async fn list_counties(&self) -> Result<Vec<County>> {
        Ok(self.dataset.counties.clone())
    }

    async fn county_seed(&self, county: &County, _crop: &str) -> Result<Option<CountySeed>> {
        Ok(self.dataset.seeds.get(&county.fips).cloned())
    }
}
