//! Per-chat session state and the session store.

use crate::engine::BoardSize;
use crate::error::OrchestratorError;
use crate::render::RenderCache;
use crate::texts;
use chatplay_games::{GridBoard, Marker, MatchesGame};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a chat.
pub type ChatId = i64;

/// Exclusive handle on one chat's slot.
pub type ChatGuard = OwnedMutexGuard<ChatSlot>;

/// State of a chat's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum SessionState {
    /// No game and no setup in progress.
    Idle,
    /// Matches game created, waiting for the y/n first move answer.
    AwaitingMatchesFirstMove,
    /// Tic-tac-toe requested, waiting for "3" or "8".
    AwaitingBoardSize,
    /// Board size known, waiting for X or O.
    AwaitingSide,
    /// A grid game is being played.
    GridGameInProgress,
    /// A matches game is being played.
    MatchesInProgress,
}

/// Which game a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum GameKind {
    /// The matches counting game.
    Matches,
    /// A grid game of the given size.
    #[display("GridGame({_0})")]
    Grid(BoardSize),
}

/// Engine-owned game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameBoard {
    /// Board of a grid game.
    Grid(GridBoard),
    /// Pile of a matches game.
    Matches(MatchesGame),
}

/// One in-progress game.
#[derive(Debug, Clone)]
pub struct Session {
    chat_id: ChatId,
    game_kind: GameKind,
    state: SessionState,
    board: GameBoard,
    human_symbol: Option<Marker>,
    render_cache: RenderCache,
}

impl Session {
    /// A matches game waiting for the first move answer.
    #[instrument(skip(game))]
    pub fn matches(chat_id: ChatId, game: MatchesGame) -> Self {
        info!(chat_id, "Creating matches session");
        Self {
            chat_id,
            game_kind: GameKind::Matches,
            state: SessionState::AwaitingMatchesFirstMove,
            board: GameBoard::Matches(game),
            human_symbol: None,
            render_cache: RenderCache::default(),
        }
    }

    /// A grid game where the player controls `human_symbol`.
    #[instrument(skip(board, render_cache))]
    pub fn grid(
        chat_id: ChatId,
        size: BoardSize,
        board: GridBoard,
        human_symbol: Marker,
        render_cache: RenderCache,
    ) -> Self {
        info!(chat_id, %size, %human_symbol, "Creating grid session");
        Self {
            chat_id,
            game_kind: GameKind::Grid(size),
            state: SessionState::GridGameInProgress,
            board: GameBoard::Grid(board),
            human_symbol: Some(human_symbol),
            render_cache,
        }
    }

    /// Chat this session belongs to.
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Game played.
    pub fn game_kind(&self) -> GameKind {
        self.game_kind
    }

    /// Conversation state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Game state.
    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    /// Marker the player controls in a grid game.
    pub fn human_symbol(&self) -> Option<Marker> {
        self.human_symbol
    }

    /// Cells as last shown to the player.
    pub fn render_cache(&self) -> &RenderCache {
        &self.render_cache
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut GameBoard, &mut RenderCache) {
        (&mut self.board, &mut self.render_cache)
    }
}

/// Tic-tac-toe setup steps that happen before a session exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Setup {
    /// Nothing pending.
    #[default]
    Idle,
    /// Waiting for the board size.
    AwaitingBoardSize,
    /// Waiting for the side on a board of this size.
    AwaitingSide(BoardSize),
}

/// Everything the store keeps for one chat.
#[derive(Debug, Clone)]
pub struct ChatSlot {
    chat_id: ChatId,
    setup: Setup,
    session: Option<Session>,
}

impl ChatSlot {
    /// An idle slot.
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            setup: Setup::Idle,
            session: None,
        }
    }

    /// Chat id.
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Current state: the session's when one exists, else the setup step.
    pub fn state(&self) -> SessionState {
        match (&self.session, self.setup) {
            (Some(session), _) => session.state(),
            (None, Setup::Idle) => SessionState::Idle,
            (None, Setup::AwaitingBoardSize) => SessionState::AwaitingBoardSize,
            (None, Setup::AwaitingSide(_)) => SessionState::AwaitingSide,
        }
    }

    /// Pending setup step.
    pub fn setup(&self) -> Setup {
        self.setup
    }

    /// Active session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether nothing is pending for this chat.
    pub fn is_idle(&self) -> bool {
        self.session.is_none() && self.setup == Setup::Idle
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub(crate) fn set_setup(&mut self, setup: Setup) {
        self.setup = setup;
    }

    /// Installs a new session.
    ///
    /// # Errors
    ///
    /// Refuses to replace an existing session.
    #[instrument(skip(self, session), fields(chat_id = self.chat_id, kind = %session.game_kind()))]
    pub(crate) fn create_session(&mut self, session: Session) -> Result<(), OrchestratorError> {
        if let Some(existing) = &self.session {
            warn!(existing = %existing.game_kind(), "Session already exists");
            return Err(OrchestratorError::invalid_input(texts::GAME_IN_PROGRESS));
        }
        self.setup = Setup::Idle;
        self.session = Some(session);
        Ok(())
    }

    /// Removes and returns the session.
    pub(crate) fn take_session(&mut self) -> Option<Session> {
        let session = self.session.take();
        if let Some(session) = &session {
            info!(chat_id = self.chat_id, kind = %session.game_kind(), "Session destroyed");
        }
        session
    }

    /// Drops any session and pending setup.
    pub(crate) fn reset(&mut self) {
        self.take_session();
        self.setup = Setup::Idle;
    }
}

/// In-memory map from chat id to slot, with one async lock per chat.
///
/// Events for one chat are serialised by holding its [`ChatGuard`] for the
/// whole transition. Different chats never contend beyond the short map
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<ChatId, Arc<AsyncMutex<ChatSlot>>>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session store");
        Self::default()
    }

    /// Locks the slot for `chat_id`, creating an idle one if needed.
    #[instrument(skip(self))]
    pub async fn lock(&self, chat_id: ChatId) -> ChatGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots
                .entry(chat_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(ChatSlot::new(chat_id))))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Evicts the slot for `chat_id` when it is idle and nobody waits on it.
    ///
    /// Call after dropping the chat's guard.
    #[instrument(skip(self))]
    pub fn release(&self, chat_id: ChatId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let evict = slots.get(&chat_id).is_some_and(|slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|s| s.is_idle())
        });
        if evict {
            slots.remove(&chat_id);
            debug!("Evicted idle chat slot");
        }
    }

    /// Current state of `chat_id`.
    #[instrument(skip(self))]
    pub async fn state_of(&self, chat_id: ChatId) -> SessionState {
        match self.existing(chat_id) {
            Some(slot) => slot.lock().await.state(),
            None => SessionState::Idle,
        }
    }

    /// Kind of the active session for `chat_id`.
    #[instrument(skip(self))]
    pub async fn session_kind(&self, chat_id: ChatId) -> Option<GameKind> {
        let slot = self.existing(chat_id)?;
        let slot = slot.lock().await;
        slot.session().map(Session::game_kind)
    }

    /// Number of chats with an active session.
    #[instrument(skip(self))]
    pub async fn active_sessions(&self) -> usize {
        let slots: Vec<_> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.values().cloned().collect()
        };
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.session().is_some() {
                count += 1;
            }
        }
        debug!(count, "Counted active sessions");
        count
    }

    /// Number of slots held in memory.
    pub fn slot_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn existing(&self, chat_id: ChatId) -> Option<Arc<AsyncMutex<ChatSlot>>> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_state_follows_setup_then_session() {
        let mut slot = ChatSlot::new(1);
        assert_eq!(slot.state(), SessionState::Idle);

        slot.set_setup(Setup::AwaitingSide(BoardSize::Three));
        assert_eq!(slot.state(), SessionState::AwaitingSide);

        slot.create_session(Session::matches(1, MatchesGame::default()))
            .unwrap();
        assert_eq!(slot.setup(), Setup::Idle);
        assert_eq!(slot.state(), SessionState::AwaitingMatchesFirstMove);
    }

    #[test]
    fn test_create_session_never_replaces() {
        let mut slot = ChatSlot::new(1);
        slot.create_session(Session::matches(1, MatchesGame::new(5)))
            .unwrap();
        let err = slot
            .create_session(Session::matches(1, MatchesGame::new(9)))
            .unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::InvalidInput);
        assert_eq!(err.message, texts::GAME_IN_PROGRESS);
        match slot.session().map(Session::board) {
            Some(GameBoard::Matches(game)) => assert_eq!(game.remaining(), 5),
            other => panic!("unexpected board {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_release_evicts_only_idle_slots() {
        let store = SessionStore::new();
        {
            let mut slot = store.lock(1).await;
            slot.set_setup(Setup::AwaitingBoardSize);
        }
        drop(store.lock(2).await);
        store.release(1);
        store.release(2);

        assert_eq!(store.slot_count(), 1);
        assert_eq!(store.state_of(1).await, SessionState::AwaitingBoardSize);
        assert_eq!(store.state_of(2).await, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_release_keeps_slot_while_locked() {
        let store = SessionStore::new();
        let guard = store.lock(3).await;
        store.release(3);
        assert_eq!(store.slot_count(), 1);
        drop(guard);
        store.release(3);
        assert_eq!(store.slot_count(), 0);
    }
}
