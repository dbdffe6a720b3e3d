//! Service implementations for the Mandrill API.
//!
//! Each service groups the calls of one Mandrill API section. They share an
//! [`ApiExecutor`] that injects the API key, posts JSON, and maps error
//! bodies onto [`MandrillError`].

mod messages;
mod users;

pub use messages::MessagesService;
pub use users::UsersService;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::errors::{ApiErrorResponse, MandrillError, MandrillResult};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::observability::LogConfig;

/// Shared request execution for all services.
#[derive(Clone)]
pub struct ApiExecutor {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    headers: Vec<(String, String)>,
    log_config: LogConfig,
}

impl ApiExecutor {
    /// Creates a new executor.
    pub fn new(transport: Arc<dyn HttpTransport>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            transport,
            auth,
            headers: Vec::new(),
            log_config: LogConfig::default(),
        }
    }

    /// Adds headers sent with every request.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Posts `payload` to `path` and parses the JSON response.
    pub async fn post<Req, Resp>(&self, path: &str, payload: &Req) -> MandrillResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = self.build_request(path, payload)?;

        if self.log_config.log_request_bodies {
            tracing::debug!(
                path,
                body = %self.log_config.loggable_body(&request.body),
                "Sending Mandrill request"
            );
        }

        let response = self.transport.send(request).await?;
        parse_response(response)
    }

    fn build_request<Req>(&self, path: &str, payload: &Req) -> MandrillResult<HttpRequest>
    where
        Req: Serialize + ?Sized,
    {
        let mut body = match serde_json::to_value(payload)? {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            _ => {
                return Err(MandrillError::Serialization {
                    message: "Request payload must be a JSON object".to_string(),
                })
            }
        };

        self.auth.apply_auth(&mut body);

        let bytes = serde_json::to_vec(&body)?;
        let mut request = HttpRequest::post(path, bytes);
        for (name, value) in &self.headers {
            request = request.with_header(name, value);
        }

        Ok(request)
    }
}

impl std::fmt::Debug for ApiExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiExecutor")
            .field("auth", &self.auth.hint())
            .field("headers", &self.headers.len())
            .finish()
    }
}

/// Parses a Mandrill response, mapping error bodies to errors.
fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> MandrillResult<T> {
    if !response.is_success() {
        return Err(parse_error_response(&response));
    }

    response.json().map_err(|e| MandrillError::Serialization {
        message: format!("Failed to parse response: {}", e),
    })
}

fn parse_error_response(response: &HttpResponse) -> MandrillError {
    match response.json::<ApiErrorResponse>() {
        Ok(body) if body.status == "error" => MandrillError::from_api(body),
        _ => MandrillError::Server {
            message: format!(
                "HTTP error: {}",
                String::from_utf8_lossy(&response.body).trim()
            ),
            status_code: response.status,
        },
    }
}
