//! Users service.

use serde::Deserialize;
use tracing::instrument;

use super::ApiExecutor;
use crate::errors::{MandrillError, MandrillResult};

const PING_PATH: &str = "users/ping2.json";

#[derive(Debug, Deserialize)]
struct PingResponse {
    #[serde(rename = "PING")]
    ping: String,
}

/// Users service for account checks.
#[derive(Debug, Clone)]
pub struct UsersService {
    executor: ApiExecutor,
}

impl UsersService {
    /// Creates a new users service.
    pub fn new(executor: ApiExecutor) -> Self {
        Self { executor }
    }

    /// Checks that the API key is valid.
    ///
    /// Returns the `PONG!` reply on success.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> MandrillResult<String> {
        let response: PingResponse = self
            .executor
            .post(PING_PATH, &serde_json::Map::new())
            .await?;

        if response.ping.is_empty() {
            return Err(MandrillError::Serialization {
                message: "Empty ping reply".to_string(),
            });
        }

        Ok(response.ping)
    }
}
