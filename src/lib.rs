pub mod cache_gate;
pub mod config;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod persist;
pub mod picks_fetch;
pub mod provider;
pub mod state;
