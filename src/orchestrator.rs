//! Turn orchestrator: the per-chat state machine.
//!
//! [`Orchestrator::transition`] is a pure function of the chat's slot, the
//! incoming [`Event`] and the engines. Every `(state, event)` pair has an
//! outcome; input that does not fit the state is answered with a corrective
//! render instead of an error escaping to the caller.
//!
//! A grid move is two plies: the player's, then the engine's. The game can
//! end on either ply, so the terminal check runs after each and a finished
//! game produces exactly one terminal render.

use crate::engine::{BoardSize, EngineRegistry, GridEngine};
use crate::error::{ErrorKind, OrchestratorError};
use crate::event::{Event, GameChoice};
use crate::render::{ButtonGrid, RenderCache, RenderInstruction};
use crate::session::{
    ChatId, ChatSlot, GameBoard, GameKind, Session, SessionState, SessionStore, Setup,
};
use crate::texts;
use chatplay_games::{Marker, MatchesCode, MatchesPhase};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of the plies played for one cell press.
enum PlyOutcome {
    /// The game ended.
    Finished,
    /// The game goes on; carries the board render if any cell changed.
    Continues(Option<RenderInstruction>),
}

/// Drives chat sessions through the game state machine.
#[derive(Clone)]
pub struct Orchestrator {
    engines: Arc<dyn EngineRegistry>,
    store: SessionStore,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator with an empty store.
    #[instrument(skip(engines))]
    pub fn new(engines: Arc<dyn EngineRegistry>) -> Self {
        Self::with_store(engines, SessionStore::new())
    }

    /// Creates an orchestrator over an existing store.
    #[instrument(skip(engines, store))]
    pub fn with_store(engines: Arc<dyn EngineRegistry>, store: SessionStore) -> Self {
        info!("Creating orchestrator");
        Self { engines, store }
    }

    /// The session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Locks the chat, runs one transition and releases the chat.
    #[instrument(skip(self, event))]
    pub async fn handle(&self, chat_id: ChatId, event: Event) -> Vec<RenderInstruction> {
        let mut slot = self.store.lock(chat_id).await;
        let instructions = self.transition(&mut slot, event);
        drop(slot);
        self.store.release(chat_id);
        instructions
    }

    /// Runs one transition on a locked slot.
    #[instrument(skip(self, slot), fields(chat_id = slot.chat_id(), state = %slot.state()))]
    pub fn transition(&self, slot: &mut ChatSlot, event: Event) -> Vec<RenderInstruction> {
        debug!(?event, "Handling event");
        let instructions = match self.step(slot, event) {
            Ok(instructions) => instructions,
            Err(err) => self.recover(slot, err),
        };
        debug!(
            next = %slot.state(),
            count = instructions.len(),
            "Transition complete"
        );
        instructions
    }

    fn step(
        &self,
        slot: &mut ChatSlot,
        event: Event,
    ) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        use SessionState as S;

        match (slot.state(), event) {
            (_, Event::ExitCommand) => Ok(self.exit(slot)),
            (_, Event::ResetCommand) => Ok(self.reset(slot)),

            (S::Idle, Event::StartCommand(GameChoice::Matches)) => self.start_matches(slot),
            (S::Idle, Event::StartCommand(GameChoice::TicTacToe)) => {
                slot.set_setup(Setup::AwaitingBoardSize);
                Ok(vec![RenderInstruction::send(
                    slot.chat_id(),
                    texts::BOARD_SIZE_PROMPT,
                )])
            }
            (_, Event::StartCommand(_)) => Err(OrchestratorError::invalid_input(texts::BUSY_NOTICE)),
            (S::Idle, _) => Err(OrchestratorError::no_active_session(texts::NO_GAME_NOTICE)),

            (S::AwaitingBoardSize, Event::SizeChoice(text)) => self.choose_size(slot, &text),
            (S::AwaitingBoardSize, _) => {
                Err(OrchestratorError::invalid_input(texts::BOARD_SIZE_REPROMPT))
            }

            (S::AwaitingSide, Event::SideChoice(marker)) => self.choose_side(slot, marker),
            (S::AwaitingSide, _) => Err(OrchestratorError::invalid_input(texts::SIDE_REPROMPT)),

            (S::GridGameInProgress, Event::CellPress(index)) => self.press_cell(slot, index),
            (S::GridGameInProgress, _) => {
                Err(OrchestratorError::invalid_input(texts::USE_BUTTONS_NOTICE))
            }

            (S::AwaitingMatchesFirstMove | S::MatchesInProgress, Event::MatchesText(text)) => {
                self.matches_turn(slot, &text)
            }
            (S::AwaitingMatchesFirstMove, _) => Err(OrchestratorError::invalid_input(
                texts::MATCHES_FIRST_MOVE_PROMPT,
            )),
            (S::MatchesInProgress, _) => {
                Err(OrchestratorError::invalid_input(texts::MATCHES_TAKE_NOTICE))
            }
        }
    }

    /// Turns an error into the render that answers it.
    fn recover(&self, slot: &mut ChatSlot, err: OrchestratorError) -> Vec<RenderInstruction> {
        let chat_id = slot.chat_id();
        match err.kind {
            ErrorKind::InvalidInput => {
                warn!(error = %err, "Invalid input");
                vec![self.corrective(slot, err.message)]
            }
            ErrorKind::NoActiveSession => {
                info!(error = %err, "Event without a session");
                vec![RenderInstruction::send(chat_id, err.message)]
            }
            ErrorKind::EngineFailure | ErrorKind::TransportFailure => {
                error!(error = %err, "Session aborted");
                slot.reset();
                vec![RenderInstruction::send(chat_id, texts::ENGINE_FAILURE_NOTICE)]
            }
        }
    }

    /// Re-renders the current prompt with `notice` as its text.
    fn corrective(&self, slot: &ChatSlot, notice: String) -> RenderInstruction {
        let chat_id = slot.chat_id();
        match (slot.state(), slot.session()) {
            (SessionState::GridGameInProgress, Some(session)) => {
                let grid = match (session.game_kind(), session.board()) {
                    (GameKind::Grid(size), GameBoard::Grid(_)) => Some(ButtonGrid::board(
                        session.render_cache().cells(),
                        size.side(),
                    )),
                    _ => None,
                };
                let edit = RenderInstruction::edit(chat_id, notice);
                match grid {
                    Some(grid) => edit.with_buttons(grid),
                    None => edit,
                }
            }
            (SessionState::AwaitingSide, _) => {
                RenderInstruction::send(chat_id, notice).with_buttons(ButtonGrid::side_choice())
            }
            _ => RenderInstruction::send(chat_id, notice),
        }
    }

    fn exit(&self, slot: &mut ChatSlot) -> Vec<RenderInstruction> {
        slot.reset();
        vec![RenderInstruction::send(slot.chat_id(), texts::GAME_FINISHED)]
    }

    fn reset(&self, slot: &mut ChatSlot) -> Vec<RenderInstruction> {
        slot.reset();
        vec![RenderInstruction::send(slot.chat_id(), texts::help_menu())]
    }

    fn start_matches(&self, slot: &mut ChatSlot) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        let chat_id = slot.chat_id();
        let engine = self.engines.matches();
        slot.create_session(Session::matches(chat_id, engine.new_game()))?;
        Ok(vec![
            RenderInstruction::send(chat_id, engine.rules()),
            RenderInstruction::send(chat_id, texts::MATCHES_FIRST_MOVE_PROMPT),
        ])
    }

    fn choose_size(
        &self,
        slot: &mut ChatSlot,
        text: &str,
    ) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        let size = BoardSize::from_choice(text)
            .ok_or_else(|| OrchestratorError::invalid_input(texts::BOARD_SIZE_REPROMPT))?;
        debug!(%size, "Board size chosen");
        slot.set_setup(Setup::AwaitingSide(size));
        Ok(vec![
            RenderInstruction::send(slot.chat_id(), texts::SIDE_PROMPT)
                .with_buttons(ButtonGrid::side_choice()),
        ])
    }

    #[instrument(skip(self, slot), fields(chat_id = slot.chat_id()))]
    fn choose_side(
        &self,
        slot: &mut ChatSlot,
        human: Marker,
    ) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        let Setup::AwaitingSide(size) = slot.setup() else {
            return Err(OrchestratorError::invalid_input(texts::BOARD_SIZE_PROMPT));
        };
        let engine = self.engines.grid(size);
        let mut board = engine.new_game();

        // Opening ply for the engine when the player moves second; it is
        // shown in the first board message rather than as an edit.
        if engine.to_move(&board) != human {
            let cell = engine.engine_move(&board)?;
            engine.apply(&mut board, cell)?;
            info!(cell, "Engine opened the game");
        }

        let view = engine.view(&board);
        let grid = ButtonGrid::board(&view, size.side());
        let chat_id = slot.chat_id();
        slot.create_session(Session::grid(
            chat_id,
            size,
            board,
            human,
            RenderCache::new(view),
        ))?;

        Ok(vec![
            RenderInstruction::send(chat_id, texts::BOARD_CAPTION).with_buttons(grid),
        ])
    }

    #[instrument(skip(self, slot), fields(chat_id = slot.chat_id()))]
    fn press_cell(
        &self,
        slot: &mut ChatSlot,
        index: usize,
    ) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        let chat_id = slot.chat_id();
        let session = slot
            .session_mut()
            .ok_or_else(|| OrchestratorError::no_active_session(texts::NO_GAME_NOTICE))?;
        let (GameKind::Grid(size), Some(human)) = (session.game_kind(), session.human_symbol())
        else {
            return Err(OrchestratorError::invalid_input(texts::USE_BUTTONS_NOTICE));
        };
        let engine = self.engines.grid(size);

        match play_plies(engine, session, index, chat_id, human)? {
            PlyOutcome::Continues(render) => Ok(render.into_iter().collect()),
            PlyOutcome::Finished => Ok(self.finish_grid(slot, engine)),
        }
    }

    /// Produces the terminal render and destroys the session.
    fn finish_grid(&self, slot: &mut ChatSlot, engine: &dyn GridEngine) -> Vec<RenderInstruction> {
        let chat_id = slot.chat_id();
        let Some(session) = slot.take_session() else {
            return Vec::new();
        };
        let GameBoard::Grid(board) = session.board() else {
            return Vec::new();
        };

        let winner = engine.winner(board);
        let mut text = match (winner, engine.size()) {
            (None, _) => texts::DRAW_TEXT.to_string(),
            (Some(marker), BoardSize::Three) => format!("Player {marker} wins!"),
            (Some(marker), BoardSize::Eight) if Some(marker) == session.human_symbol() => {
                texts::HUMAN_WON_TEXT.to_string()
            }
            (Some(_), BoardSize::Eight) => texts::AI_WON_TEXT.to_string(),
        };
        text.push_str(texts::NEW_GAME_HINT);
        info!(chat_id, ?winner, moves = board.move_count(), "Grid game finished");

        let grid = ButtonGrid::board(&engine.view(board), engine.size().side());
        vec![RenderInstruction::edit(chat_id, text).with_buttons(grid)]
    }

    #[instrument(skip(self, slot, text), fields(chat_id = slot.chat_id()))]
    fn matches_turn(
        &self,
        slot: &mut ChatSlot,
        text: &str,
    ) -> Result<Vec<RenderInstruction>, OrchestratorError> {
        let chat_id = slot.chat_id();
        let engine = self.engines.matches();
        let session = slot
            .session_mut()
            .ok_or_else(|| OrchestratorError::no_active_session(texts::NO_GAME_NOTICE))?;
        let (board, _) = session.parts_mut();
        let GameBoard::Matches(game) = board else {
            return Err(OrchestratorError::invalid_input(texts::USE_BUTTONS_NOTICE));
        };

        let reply = engine.get_response(game, text)?;
        let choosing = game.phase() == MatchesPhase::AwaitingFirstMoveChoice;
        let instructions = reply
            .lines
            .into_iter()
            .map(|line| RenderInstruction::send(chat_id, line))
            .collect();

        if reply.code == MatchesCode::Continue {
            if !choosing {
                session.set_state(SessionState::MatchesInProgress);
            }
        } else {
            info!(code = %reply.code, "Matches game finished");
            slot.take_session();
        }
        Ok(instructions)
    }
}

/// Plays the player's ply and, if the game goes on, the engine's reply.
fn play_plies(
    engine: &dyn GridEngine,
    session: &mut Session,
    index: usize,
    chat_id: ChatId,
    human: Marker,
) -> Result<PlyOutcome, OrchestratorError> {
    let (board, cache) = session.parts_mut();
    let GameBoard::Grid(board) = board else {
        return Err(OrchestratorError::invalid_input(texts::USE_BUTTONS_NOTICE));
    };

    if engine.to_move(board) != human || !engine.legal(board, index) {
        debug!(index, "Rejected cell press");
        return Err(OrchestratorError::invalid_input(texts::BLANK_CELL_NOTICE));
    }
    engine.apply(board, index)?;
    if engine.is_terminal(board) {
        return Ok(PlyOutcome::Finished);
    }

    let reply = engine.engine_move(board)?;
    engine.apply(board, reply)?;
    debug!(index, reply, "Plies played");
    if engine.is_terminal(board) {
        return Ok(PlyOutcome::Finished);
    }

    let view = engine.view(board);
    // An engine may apply a move without touching the cells.
    if cache.diff(&view).is_empty() {
        return Ok(PlyOutcome::Continues(None));
    }
    let grid = ButtonGrid::board(&view, engine.size().side());
    cache.update(view);
    Ok(PlyOutcome::Continues(Some(
        RenderInstruction::edit(chat_id, texts::BOARD_CAPTION).with_buttons(grid),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StandardEngines;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Arc::new(StandardEngines::default()))
    }

    #[test]
    fn test_every_state_answers_stray_text() {
        let orch = orchestrator();
        let mut slot = ChatSlot::new(1);
        let setups: [&[Event]; 4] = [
            &[],
            &[Event::StartCommand(GameChoice::TicTacToe)],
            &[
                Event::StartCommand(GameChoice::TicTacToe),
                Event::SizeChoice("3".into()),
            ],
            &[Event::StartCommand(GameChoice::Matches)],
        ];
        for setup in setups {
            slot.reset();
            for event in setup {
                orch.transition(&mut slot, event.clone());
            }
            let before = slot.state();
            let out = orch.transition(&mut slot, Event::Unrecognized("hello".into()));
            assert_eq!(out.len(), 1, "state {before}");
            assert_eq!(slot.state(), before);
        }
    }

    #[test]
    fn test_matches_in_progress_asks_for_a_number() {
        let orch = orchestrator();
        let mut slot = ChatSlot::new(1);
        orch.transition(&mut slot, Event::StartCommand(GameChoice::Matches));
        orch.transition(&mut slot, Event::MatchesText("y".into()));
        assert_eq!(slot.state(), SessionState::MatchesInProgress);

        for event in [Event::CellPress(2), Event::Unrecognized("hello".into())] {
            let out = orch.transition(&mut slot, event);
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].text, texts::MATCHES_TAKE_NOTICE);
            assert_eq!(slot.state(), SessionState::MatchesInProgress);
        }
    }

    #[test]
    fn test_start_while_busy_keeps_game() {
        let orch = orchestrator();
        let mut slot = ChatSlot::new(1);
        orch.transition(&mut slot, Event::StartCommand(GameChoice::Matches));
        let out = orch.transition(&mut slot, Event::StartCommand(GameChoice::TicTacToe));
        assert_eq!(out[0].text, texts::BUSY_NOTICE);
        assert_eq!(slot.state(), SessionState::AwaitingMatchesFirstMove);
    }
}
