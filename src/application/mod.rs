// Application layer - Use cases and the live simulator
pub mod baseline;
pub mod live_service;
pub mod region_service;
pub mod seed_repository;
pub mod session;
pub mod stats;
pub mod step;
pub mod ticker;
pub mod window;
