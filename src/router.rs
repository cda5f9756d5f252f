//! Dispatch router: turns raw chat input into orchestrator events or
//! non-game intents.
//!
//! Free text in an idle chat is interpreted in priority order: matches
//! play/run pattern, tic-tac-toe play/run pattern, "joke", "translate", a
//! solve trigger word, and finally an echo. Inside a matches game the text
//! goes to the engine verbatim.

use crate::event::{Event, GameChoice};
use crate::session::SessionState;
use chatplay_games::Marker;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Words that ask for the solver.
pub const SOLVE_COMMANDS: [&str; 7] = [
    "estimate",
    "solve",
    "calculate",
    "compute",
    "quantify",
    "assess",
    "evaluate",
];

/// Inbound chat event as delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Slash command.
    Command {
        /// Command name without the slash.
        name: String,
        /// Whitespace separated arguments.
        #[serde(default)]
        args: Vec<String>,
    },
    /// Typed text.
    Text {
        /// Message text.
        text: String,
    },
    /// Voice message, transcribed before routing.
    Voice {
        /// Raw audio.
        audio: Vec<u8>,
    },
    /// Inline button press.
    ButtonPress {
        /// Index carried by the button.
        index: usize,
    },
}

impl Inbound {
    /// Reads a typed line: `/name args...` is a command, anything else text.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => {
                let mut words = rest.split_whitespace();
                let name = words
                    .next()
                    .unwrap_or_default()
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                Inbound::Command {
                    name,
                    args: words.map(str::to_string).collect(),
                }
            }
            _ => Inbound::Text {
                text: trimmed.to_string(),
            },
        }
    }
}

/// Router input once voice has been transcribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Slash command.
    Command {
        /// Command name without the slash.
        name: String,
        /// Arguments.
        args: Vec<String>,
    },
    /// Text.
    Text(String),
    /// Button press.
    ButtonPress(usize),
}

/// Coarse meaning of idle free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextIntent {
    /// Play the matches game.
    PlayMatches,
    /// Play tic-tac-toe.
    PlayTicTacToe,
    /// Tell a joke.
    Joke {
        /// Everything after "joke", e.g. "about cats".
        about: String,
    },
    /// Translate the text.
    Translate(String),
    /// Solve the text.
    Solve(String),
    /// Nothing recognised.
    Echo(String),
}

/// Request handled outside the game state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Tell a joke.
    Joke {
        /// Everything after "joke".
        about: String,
    },
    /// Translate text.
    Translate(String),
    /// Solve a math task.
    Solve(String),
    /// Repeat the text back.
    Echo(String),
    /// Slash command nobody handles.
    UnknownCommand(String),
}

/// Where an input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// To the orchestrator.
    Game(Event),
    /// To a service.
    Intent(Intent),
}

/// Classifies idle free text.
pub trait IntentClassifier: Send + Sync {
    /// Coarse intent of `text`.
    fn classify(&self, text: &str) -> TextIntent;
}

/// Keyword and pattern based classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    matches: Regex,
    tictactoe: Regex,
}

impl KeywordClassifier {
    /// Compiles the play/run patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a pattern fails to compile.
    #[instrument]
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            matches: Regex::new(r"(?i)(play|run).*matches")?,
            tictactoe: Regex::new(r"(?i)(play|run).*(tic.*tac.*toe|deductible)")?,
        })
    }
}

impl IntentClassifier for KeywordClassifier {
    #[instrument(skip(self))]
    fn classify(&self, text: &str) -> TextIntent {
        let text = text.trim().to_lowercase();

        if self.matches.is_match(&text) {
            return TextIntent::PlayMatches;
        }
        if self.tictactoe.is_match(&text) {
            return TextIntent::PlayTicTacToe;
        }
        if text.contains("joke") {
            return TextIntent::Joke {
                about: after_last(&text, "joke"),
            };
        }
        if text.contains("translate") {
            return TextIntent::Translate(after_last(&text, "translate"));
        }
        let words: Vec<&str> = text.split_whitespace().collect();
        if let Some(word) = SOLVE_COMMANDS.iter().find(|w| words.contains(*w)) {
            return TextIntent::Solve(after_last(&text, word));
        }
        TextIntent::Echo(text)
    }
}

fn after_last(text: &str, keyword: &str) -> String {
    text.rsplit(keyword)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Maps inputs to routes using the chat's current state.
pub struct Router {
    classifier: Box<dyn IntentClassifier>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Router {
    /// Creates a router over `classifier`.
    pub fn new(classifier: Box<dyn IntentClassifier>) -> Self {
        Self { classifier }
    }

    /// Creates a router with the [`KeywordClassifier`].
    ///
    /// # Errors
    ///
    /// Fails if the classifier patterns do not compile.
    pub fn with_keywords() -> Result<Self, regex::Error> {
        Ok(Self::new(Box::new(KeywordClassifier::new()?)))
    }

    /// Routes `input` for a chat in `state`.
    #[instrument(skip(self))]
    pub fn route(&self, state: SessionState, input: Input) -> Route {
        let route = match input {
            Input::Command { name, args } => self.command(&name, args),
            Input::Text(text) => self.text(state, text),
            Input::ButtonPress(index) => Route::Game(button(state, index)),
        };
        debug!(?route, "Routed input");
        route
    }

    fn command(&self, name: &str, args: Vec<String>) -> Route {
        match name {
            "start" | "help" => Route::Game(Event::ResetCommand),
            "exit" => Route::Game(Event::ExitCommand),
            "matches" => Route::Game(Event::StartCommand(GameChoice::Matches)),
            "tictactoe" => Route::Game(Event::StartCommand(GameChoice::TicTacToe)),
            "solve" => Route::Intent(Intent::Solve(args.join(" "))),
            other => Route::Intent(Intent::UnknownCommand(other.to_string())),
        }
    }

    fn text(&self, state: SessionState, text: String) -> Route {
        match state {
            SessionState::Idle => match self.classifier.classify(&text) {
                TextIntent::PlayMatches => Route::Game(Event::StartCommand(GameChoice::Matches)),
                TextIntent::PlayTicTacToe => {
                    Route::Game(Event::StartCommand(GameChoice::TicTacToe))
                }
                TextIntent::Joke { about } => Route::Intent(Intent::Joke { about }),
                TextIntent::Translate(text) => Route::Intent(Intent::Translate(text)),
                TextIntent::Solve(text) => Route::Intent(Intent::Solve(text)),
                TextIntent::Echo(text) => Route::Intent(Intent::Echo(text)),
            },
            SessionState::AwaitingBoardSize => Route::Game(Event::SizeChoice(text)),
            SessionState::AwaitingSide => match text.trim().parse::<Marker>() {
                Ok(marker) => Route::Game(Event::SideChoice(marker)),
                Err(_) => Route::Game(Event::Unrecognized(text)),
            },
            SessionState::AwaitingMatchesFirstMove | SessionState::MatchesInProgress => {
                Route::Game(Event::MatchesText(text))
            }
            SessionState::GridGameInProgress => Route::Game(Event::Unrecognized(text)),
        }
    }
}

fn button(state: SessionState, index: usize) -> Event {
    match (state, index) {
        (SessionState::AwaitingSide, 0) => Event::SideChoice(Marker::X),
        (SessionState::AwaitingSide, 1) => Event::SideChoice(Marker::O),
        (SessionState::AwaitingSide, other) => Event::Unrecognized(other.to_string()),
        _ => Event::CellPress(index),
    }
}
