// Region lookup models
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct County {
    pub fips: String,
    pub name: String,
    pub state: String,
    /// `[lat, lon]`
    pub centroid: [f64; 2],
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub bbox: [f64; 4],
}

impl County {
    pub fn display_name(&self) -> String {
        format!("{} County, {}", self.name, self.state)
    }
}

/// Great-circle distance in kilometres
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

pub fn find_nearest_county(lat: f64, lon: f64, counties: &[County]) -> Option<&County> {
    counties.iter().min_by(|a, b| {
        let da = haversine_km(lat, lon, a.centroid[0], a.centroid[1]);
        let db = haversine_km(lat, lon, b.centroid[0], b.centroid[1]);
        da.total_cmp(&db)
    })
}
