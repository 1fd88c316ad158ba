use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub seeds: SeedSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    /// Offline dataset on disk
    Fixtures,
    /// Prediction backend over HTTP
    Backend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedSettings {
    pub source: SeedSource,
    pub fixtures_path: String,
    pub backend_url: String,
    pub default_crop: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub filter: String,
}

fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("seeds.source", "fixtures")?
        .set_default("seeds.fixtures_path", "config/fixtures.json")?
        .set_default("seeds.backend_url", "http://127.0.0.1:8002")?
        .set_default("seeds.default_crop", "Corn")?
        .set_default("log.filter", "info")?)
}

/// Defaults, then `config/app.*` if present, then `CROPWATCH__*` environment variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("CROPWATCH").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
