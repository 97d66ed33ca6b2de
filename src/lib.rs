pub mod api;
pub mod dashboard;
pub mod http_client;
pub mod provider;
pub mod state;
pub mod stats;
