//! Messengers that do not need a terminal.

use super::{Messenger, TransportError};
use crate::render::RenderInstruction;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Posts each instruction as JSON to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookMessenger {
    client: reqwest::Client,
    url: String,
}

impl WebhookMessenger {
    /// Creates a messenger posting to `url`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    #[instrument(skip(url), fields(url = %url))]
    pub fn new(url: String, timeout: Duration) -> Result<Self, TransportError> {
        info!("Creating webhook messenger");
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl Messenger for WebhookMessenger {
    #[instrument(skip(self, instruction), fields(chat_id = instruction.chat_id, mode = %instruction.mode))]
    async fn deliver(&self, instruction: &RenderInstruction) -> Result<(), TransportError> {
        let response = self.client.post(&self.url).json(instruction).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(format!(
                "Webhook answered with status {status}"
            )));
        }
        debug!(%status, "Instruction delivered");
        Ok(())
    }
}

/// Only logs instructions; used when replies travel in the HTTP response.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMessenger;

#[async_trait::async_trait]
impl Messenger for LogMessenger {
    async fn deliver(&self, instruction: &RenderInstruction) -> Result<(), TransportError> {
        info!(
            chat_id = instruction.chat_id,
            mode = %instruction.mode,
            text = %instruction.text,
            buttons = instruction.buttons.is_some(),
            "Render instruction"
        );
        Ok(())
    }
}
