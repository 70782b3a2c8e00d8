use crate::api_client::{ApiClient, ApiError};
use crate::config::Config;
use std::sync::Arc;

/// Shared, read-only handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api_client: Arc<ApiClient>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let api_client = ApiClient::new(&config.data_url, config.http_timeout)?;

        Ok(Self {
            config: Arc::new(config),
            api_client: Arc::new(api_client),
        })
    }
}
