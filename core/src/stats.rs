//! Read-only queries over `/stats/:type`.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::config::ManagerOptions;
use crate::error::{ApiError, ConfigError};
use crate::rest::{Params, RestClient};
use crate::transport::Transport;
use crate::types::{DailyStats, DailyStatsParams};

const DAILY: &str = "daily";
const ACTIVE_USERS: &str = "active-users";

/// Manager for the stats endpoint.
#[derive(Debug)]
pub struct StatsManager<T> {
    stats: RestClient<T>,
}

impl<T> Clone for StatsManager<T> {
    fn clone(&self) -> Self {
        Self {
            stats: self.stats.clone(),
        }
    }
}

impl<T: Transport> StatsManager<T> {
    /// Validate `options` and bind `{base_url}/stats/:type`.
    ///
    /// No request is sent.
    pub fn new(options: &ManagerOptions, transport: Arc<T>) -> Result<Self, ConfigError> {
        let stats = RestClient::for_manager(options, "stats/:type", transport)?;
        Ok(Self { stats })
    }

    pub fn resource(&self) -> &RestClient<T> {
        &self.stats
    }

    /// Daily totals between `params.from` and `params.to`.
    ///
    /// `DailyStatsParams::default()` asks for the server's default range.
    #[instrument(skip(self))]
    pub async fn get_daily(&self, params: DailyStatsParams) -> Result<Vec<DailyStats>, ApiError> {
        let mut query = match serde_json::to_value(&params)
            .map_err(|e| ApiError::Serialization(e.to_string()))?
        {
            Value::Object(map) => map,
            _ => Params::new(),
        };
        query.insert("type".to_string(), Value::String(DAILY.to_string()));
        self.stats.get_all(&query).await
    }

    /// Number of users active in the last 30 days.
    #[instrument(skip(self))]
    pub async fn get_active_users_count(&self) -> Result<u64, ApiError> {
        let mut query = Params::new();
        query.insert("type".to_string(), Value::String(ACTIVE_USERS.to_string()));
        self.stats.get_all(&query).await
    }
}

#[cfg(feature = "ureq")]
impl StatsManager<crate::transport::UreqTransport> {
    /// Build a manager that talks HTTP through ureq.
    pub fn with_ureq(options: &ManagerOptions) -> Result<Self, ConfigError> {
        Self::new(options, Arc::new(crate::transport::UreqTransport::new()))
    }
}
