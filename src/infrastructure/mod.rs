// Infrastructure layer - External dependencies and adapters
pub mod backend_repository;
pub mod chunked_json;
pub mod config;
pub mod fixture_repository;
pub mod http_response;
pub mod prediction_client;
