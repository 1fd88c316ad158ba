// Simulator session - one series ticker and one weather ticker per selection
use crate::application::step::{shared_noise, RngNoise, SharedNoise};
use crate::application::ticker::Ticker;
use crate::application::window::{AgronomicFamily, WeatherFamily};
use crate::domain::evidence::{build_weather_series, extract_time_series, CountySeed};
use crate::domain::series::{TimeSeriesPoint, WeatherSeriesPoint};
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Series(Vec<TimeSeriesPoint>),
    Weather(Vec<WeatherSeriesPoint>),
}

/// Live simulation state for one region selection.
///
/// Dropping the session stops both tickers and every `on_update` listener.
pub struct SimulatorSession {
    series: Ticker<AgronomicFamily>,
    weather: Ticker<WeatherFamily>,
    listeners: Vec<JoinHandle<()>>,
}

impl SimulatorSession {
    pub fn new() -> Self {
        Self::with_noise(shared_noise(RngNoise::from_entropy()))
    }

    pub fn with_noise(noise: SharedNoise) -> Self {
        Self {
            series: Ticker::new(noise.clone()),
            weather: Ticker::new(noise),
            listeners: Vec::new(),
        }
    }

    /// Seed both tickers, replacing whatever was running
    pub fn start(&mut self, seed: &CountySeed, now_ms: i64) {
        self.start_weather(build_weather_series(&seed.forecast, now_ms));
        self.start_series(extract_time_series(&seed.answer, now_ms));
    }

    pub fn start_series(&mut self, seed: Vec<TimeSeriesPoint>) {
        self.series.start(seed);
    }

    pub fn start_weather(&mut self, seed: Vec<WeatherSeriesPoint>) {
        self.weather.start(seed);
    }

    pub fn stop(&mut self) {
        self.weather.stop();
        self.series.stop();
    }

    pub fn is_running(&self) -> bool {
        self.series.is_running() || self.weather.is_running()
    }

    pub fn series(&self) -> &Ticker<AgronomicFamily> {
        &self.series
    }

    pub fn weather(&self) -> &Ticker<WeatherFamily> {
        &self.weather
    }

    pub fn subscribe_series(&self) -> watch::Receiver<Vec<TimeSeriesPoint>> {
        self.series.subscribe()
    }

    pub fn subscribe_weather(&self) -> watch::Receiver<Vec<WeatherSeriesPoint>> {
        self.weather.subscribe()
    }

    /// Stream of every published window of both families, current ones first
    pub fn updates(&self) -> impl futures::Stream<Item = SessionUpdate> + Send + use<> {
        let series = WatchStream::new(self.subscribe_series()).map(SessionUpdate::Series);
        let weather = WatchStream::new(self.subscribe_weather()).map(SessionUpdate::Weather);
        futures::stream::select(series, weather)
    }

    /// Invoke `callback` for every published window until the session is dropped
    pub fn on_update<C>(&mut self, callback: C)
    where
        C: Fn(SessionUpdate) + Send + 'static,
    {
        let mut updates = Box::pin(self.updates());
        self.listeners.push(tokio::spawn(async move {
            while let Some(update) = updates.next().await {
                callback(update);
            }
        }));
    }
}

impl Default for SimulatorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatorSession {
    fn drop(&mut self) {
        self.stop();
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
    }
}
