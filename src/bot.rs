//! The bot: router, orchestrator, services and messenger wired together.
//!
//! [`Bot::on_inbound`] is the single entry point every transport calls. It
//! holds the chat's lock from routing until the last instruction has been
//! handed to the messenger, so replies for one chat never interleave.

use crate::error::OrchestratorError;
use crate::orchestrator::Orchestrator;
use crate::render::RenderInstruction;
use crate::router::{Inbound, Input, Intent, Route, Router};
use crate::services::{ServiceError, Services};
use crate::session::{ChatId, ChatSlot};
use crate::texts;
use crate::transport::Messenger;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// A chat bot serving any number of chats.
pub struct Bot {
    orchestrator: Orchestrator,
    router: Router,
    services: Services,
    messenger: Arc<dyn Messenger>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("orchestrator", &self.orchestrator)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

impl Bot {
    /// Creates a bot.
    #[instrument(skip_all)]
    pub fn new(
        orchestrator: Orchestrator,
        router: Router,
        services: Services,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        info!(services = ?services, "Creating bot");
        Self {
            orchestrator,
            router,
            services,
            messenger,
        }
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Handles one inbound event and delivers the replies.
    ///
    /// Returns the instructions produced. State changes are kept even when
    /// delivery fails.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::TransportFailure`](crate::ErrorKind::TransportFailure)
    /// when the messenger rejects an instruction. Instructions after the
    /// failed one are not attempted.
    #[instrument(skip(self, inbound))]
    pub async fn on_inbound(
        &self,
        chat_id: ChatId,
        inbound: Inbound,
    ) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        let store = self.orchestrator.store().clone();
        let mut slot = store.lock(chat_id).await;

        let instructions = self.process(&mut slot, inbound).await;
        let delivered = self.deliver(&instructions).await;

        drop(slot);
        store.release(chat_id);

        delivered.map(|()| instructions)
    }

    async fn process(&self, slot: &mut ChatSlot, inbound: Inbound) -> Vec<RenderInstruction> {
        let chat_id = slot.chat_id();
        let input = match inbound {
            Inbound::Command { name, args } => Input::Command { name, args },
            Inbound::Text { text } => Input::Text(text),
            Inbound::ButtonPress { index } => Input::ButtonPress(index),
            Inbound::Voice { audio } => match self.transcribe(audio).await {
                Ok(text) => Input::Text(text),
                Err(reply) => return vec![RenderInstruction::send(chat_id, reply)],
            },
        };

        match self.router.route(slot.state(), input) {
            Route::Game(event) => self.orchestrator.transition(slot, event),
            Route::Intent(intent) => self.answer(chat_id, intent).await,
        }
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, String> {
        let Some(transcriber) = self.services.transcriber() else {
            return Err(texts::NOT_CONFIGURED.to_string());
        };
        match transcriber.transcribe(audio).await {
            Ok(text) => {
                debug!(text = %text, "Voice transcribed");
                Ok(text)
            }
            Err(e) => Err(service_failure(e)),
        }
    }

    #[instrument(skip(self))]
    async fn answer(&self, chat_id: ChatId, intent: Intent) -> Vec<RenderInstruction> {
        let replies = match intent {
            Intent::Joke { about } => {
                let joke = match self.services.jokes() {
                    None => texts::NOT_CONFIGURED.to_string(),
                    Some(jokes) => match jokes.call(&about).await {
                        Ok(Some(joke)) => joke,
                        Ok(None) => texts::NO_JOKE.to_string(),
                        Err(e) => service_failure(e),
                    },
                };
                vec![texts::joke_intro(&about), joke]
            }
            Intent::Translate(text) => {
                let reply = match self.services.translator() {
                    None => texts::NOT_CONFIGURED.to_string(),
                    Some(translator) => match translator.call(&text).await {
                        Ok(Some(translation)) => translation,
                        Ok(None) => texts::echo(&text),
                        Err(e) => service_failure(e),
                    },
                };
                vec![reply]
            }
            Intent::Solve(task) if task.trim().is_empty() => vec![texts::SOLVE_USAGE.to_string()],
            Intent::Solve(task) => {
                let reply = match self.services.solver() {
                    None => texts::NOT_CONFIGURED.to_string(),
                    Some(solver) => match solver.call(task.trim()).await {
                        Ok(Some(answer)) => answer,
                        Ok(None) => texts::SOLVE_UNKNOWN.to_string(),
                        Err(e) => service_failure(e),
                    },
                };
                vec![reply]
            }
            Intent::Echo(text) => vec![texts::echo(&text)],
            Intent::UnknownCommand(name) => vec![texts::unknown_command(&name)],
        };
        replies
            .into_iter()
            .map(|text| RenderInstruction::send(chat_id, text))
            .collect()
    }

    async fn deliver(&self, instructions: &[RenderInstruction]) -> Result<(), OrchestratorError> {
        for instruction in instructions {
            if let Err(e) = self.messenger.deliver(instruction).await {
                error!(error = %e, chat_id = instruction.chat_id, "Delivery failed");
                return Err(e.into());
            }
        }
        debug!(count = instructions.len(), "Instructions delivered");
        Ok(())
    }
}

fn service_failure(err: ServiceError) -> String {
    warn!(error = %err, "Service call failed");
    err.message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StandardEngines;
    use crate::transport::LogMessenger;

    fn bot() -> Bot {
        Bot::new(
            Orchestrator::new(Arc::new(StandardEngines::default())),
            Router::with_keywords().unwrap(),
            Services::none(),
            Arc::new(LogMessenger),
        )
    }

    #[tokio::test]
    async fn test_unconfigured_services_answer_plainly() {
        let bot = bot();
        let out = bot
            .on_inbound(1, Inbound::from_text("/solve 2+2"))
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, texts::NOT_CONFIGURED);

        let out = bot
            .on_inbound(1, Inbound::Voice { audio: vec![1, 2] })
            .await
            .unwrap();
        assert_eq!(out[0].text, texts::NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_solve_without_task_shows_usage() {
        let out = bot()
            .on_inbound(1, Inbound::from_text("/solve"))
            .await
            .unwrap();
        assert_eq!(out[0].text, texts::SOLVE_USAGE);
    }
}
