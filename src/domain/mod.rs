// Domain layer - Plain data models
pub mod evidence;
pub mod live;
pub mod region;
pub mod series;
