// Messages pushed to live dashboard clients
use super::evidence::PredictionResult;
use super::region::County;
use super::series::{TimeSeriesPoint, WeatherSeriesPoint};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// First message of every stream
    Region {
        county: County,
        crop: String,
        has_data: bool,
        answer: Option<String>,
        predictions: Vec<PredictionResult>,
    },
    Series { points: Vec<TimeSeriesPoint> },
    Weather { points: Vec<WeatherSeriesPoint> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_tagging() {
        let msg = LiveMessage::Weather {
            points: vec![WeatherSeriesPoint::new(0, 28.0, 8.0, 2.0)],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "weather");
        assert_eq!(json["points"][0]["wind"], 8.0);
    }
}
