//! Messages service: the two send operations.

use tracing::instrument;

use super::ApiExecutor;
use crate::errors::MandrillResult;
use crate::types::{SendRequest, SendResponseEntry, SendTemplateRequest};

const SEND_PATH: &str = "messages/send.json";
const SEND_TEMPLATE_PATH: &str = "messages/send-template.json";

/// Messages service for sending literal and template messages.
#[derive(Debug, Clone)]
pub struct MessagesService {
    executor: ApiExecutor,
}

impl MessagesService {
    /// Creates a new messages service.
    pub fn new(executor: ApiExecutor) -> Self {
        Self { executor }
    }

    /// Sends a message with literal subject and bodies.
    #[instrument(skip(self, request), fields(recipients = request.message.to.len()))]
    pub async fn send(&self, request: &SendRequest) -> MandrillResult<Vec<SendResponseEntry>> {
        self.executor.post(SEND_PATH, request).await
    }

    /// Sends a message rendered from a stored template.
    #[instrument(
        skip(self, request),
        fields(template = %request.template_name, recipients = request.message.to.len())
    )]
    pub async fn send_template(
        &self,
        request: &SendTemplateRequest,
    ) -> MandrillResult<Vec<SendResponseEntry>> {
        self.executor.post(SEND_TEMPLATE_PATH, request).await
    }
}
