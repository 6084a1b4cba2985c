pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    application_api::{ApplicationApi, HttpApplicationApi},
    transition_executor::TransitionExecutor,
};

#[derive(Clone)]
pub struct AppState {
    pub executor: TransitionExecutor,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let api = HttpApplicationApi::new(
            config.backend_api_url.clone(),
            config.backend_api_token.clone(),
            config.backend_timeout,
        )
        .map_err(|e| Error::Config(format!("Backend application API: {}", e)))?;

        Ok(Self::with_api(Arc::new(api), config.bulk_concurrency))
    }

    /// State around any collaborator, used by tests to swap in a fake backend.
    pub fn with_api(api: Arc<dyn ApplicationApi>, bulk_concurrency: usize) -> Self {
        Self {
            executor: TransitionExecutor::new(api).with_bulk_concurrency(bulk_concurrency),
        }
    }
}
