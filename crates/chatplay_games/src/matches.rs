//! The matches game.
//!
//! A pile of matches sits on the table. Players alternately remove one to
//! [`MAX_TAKE`] matches and whoever takes the last match loses. The game is
//! driven entirely by free text: [`MatchesGame::get_response`] takes the
//! player's message and returns what to say back.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Matches on the table at the start of a game.
pub const DEFAULT_MATCHES: u32 = 21;

/// Most matches a player may take in one turn.
pub const MAX_TAKE: u32 = 3;

/// Where the conversation with the player stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchesPhase {
    /// Waiting for the y/n answer to "do you want to move first".
    AwaitingFirstMoveChoice,
    /// Waiting for the number of matches the player takes.
    AwaitingTake,
    /// The game has ended.
    Finished(MatchesCode),
}

/// Result code of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum MatchesCode {
    /// The game goes on.
    Continue,
    /// The engine took the last match.
    HumanWon,
    /// The player took the last match.
    EngineWon,
}

/// Reply to one player message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchesReply {
    /// Whether the game continues.
    pub code: MatchesCode,
    /// Lines to show to the player, in order.
    pub lines: Vec<String>,
}

impl MatchesReply {
    fn new(code: MatchesCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }
}

/// State of one matches game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchesGame {
    remaining: u32,
    phase: MatchesPhase,
}

impl MatchesGame {
    /// Creates a game with `matches` on the table, at least one.
    #[instrument]
    pub fn new(matches: u32) -> Self {
        Self {
            remaining: matches.max(1),
            phase: MatchesPhase::AwaitingFirstMoveChoice,
        }
    }

    /// Human-readable rules for a game starting with `matches`.
    pub fn rules(matches: u32) -> String {
        format!(
            "Matches Game rules: there are {matches} matches on the table. \
             We take turns removing 1 to {MAX_TAKE} matches. \
             Whoever takes the last match loses. Send /exit to stop playing."
        )
    }

    /// Matches still on the table.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Current phase.
    pub fn phase(&self) -> MatchesPhase {
        self.phase
    }

    /// Interprets one player message and advances the game.
    #[instrument(skip(self), fields(remaining = self.remaining, phase = ?self.phase))]
    pub fn get_response(&mut self, text: &str) -> MatchesReply {
        let text = text.trim().to_lowercase();
        match self.phase {
            MatchesPhase::AwaitingFirstMoveChoice => self.first_move_choice(&text),
            MatchesPhase::AwaitingTake => self.human_take(&text),
            MatchesPhase::Finished(code) => {
                MatchesReply::new(code, vec!["The game is over.".to_string()])
            }
        }
    }

    fn first_move_choice(&mut self, text: &str) -> MatchesReply {
        match text {
            "y" | "yes" => {
                self.phase = MatchesPhase::AwaitingTake;
                MatchesReply::new(MatchesCode::Continue, vec![self.take_prompt()])
            }
            "n" | "no" => {
                self.phase = MatchesPhase::AwaitingTake;
                let mut lines = Vec::new();
                let code = self.engine_take(&mut lines);
                MatchesReply::new(code, lines)
            }
            _ => MatchesReply::new(
                MatchesCode::Continue,
                vec!["Please answer y or n.".to_string()],
            ),
        }
    }

    fn human_take(&mut self, text: &str) -> MatchesReply {
        let limit = MAX_TAKE.min(self.remaining);
        let take = match text.parse::<u32>() {
            Ok(n) if (1..=limit).contains(&n) => n,
            _ => {
                debug!(text, "Rejected take");
                return MatchesReply::new(
                    MatchesCode::Continue,
                    vec![format!("You can take from 1 to {limit} matches.")],
                );
            }
        };

        self.remaining -= take;
        if self.remaining == 0 {
            return self.finish(
                MatchesCode::EngineWon,
                vec!["You took the last match. I won!".to_string()],
            );
        }

        let mut lines = vec![format!(
            "You take {take}. {} left on the table.",
            self.remaining
        )];
        let code = self.engine_take(&mut lines);
        MatchesReply::new(code, lines)
    }

    /// Takes matches for the engine, leaving a pile of `4k + 1` when possible.
    fn engine_take(&mut self, lines: &mut Vec<String>) -> MatchesCode {
        let take = match self.remaining.saturating_sub(1) % (MAX_TAKE + 1) {
            0 => 1,
            n => n,
        }
        .min(self.remaining);

        self.remaining -= take;
        if self.remaining == 0 {
            lines.push(format!("I take {take}. I took the last match. You won!"));
            self.phase = MatchesPhase::Finished(MatchesCode::HumanWon);
            info!("Matches game won by the player");
            return MatchesCode::HumanWon;
        }

        lines.push(format!("I take {take}. {} left on the table.", self.remaining));
        lines.push(self.take_prompt());
        MatchesCode::Continue
    }

    fn finish(&mut self, code: MatchesCode, lines: Vec<String>) -> MatchesReply {
        info!(%code, "Matches game finished");
        self.phase = MatchesPhase::Finished(code);
        MatchesReply::new(code, lines)
    }

    fn take_prompt(&self) -> String {
        let limit = MAX_TAKE.min(self.remaining);
        format!(
            "There are {} matches. How many do you take (1-{limit})?",
            self.remaining
        )
    }
}

impl Default for MatchesGame {
    fn default() -> Self {
        Self::new(DEFAULT_MATCHES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_yes_prompts_for_take() {
        let mut game = MatchesGame::default();
        let reply = game.get_response("Y");
        assert_eq!(reply.code, MatchesCode::Continue);
        assert_eq!(game.phase(), MatchesPhase::AwaitingTake);
        assert_eq!(game.remaining(), DEFAULT_MATCHES);
    }

    #[test]
    fn test_first_move_no_lets_engine_move() {
        let mut game = MatchesGame::default();
        let reply = game.get_response("n");
        assert_eq!(reply.code, MatchesCode::Continue);
        assert_eq!(game.remaining(), DEFAULT_MATCHES - 1);
        assert!(reply.lines[0].starts_with("I take 1."));
    }

    #[test]
    fn test_unclear_first_answer_asks_again() {
        let mut game = MatchesGame::default();
        let reply = game.get_response("maybe");
        assert_eq!(reply.lines, vec!["Please answer y or n.".to_string()]);
        assert_eq!(game.phase(), MatchesPhase::AwaitingFirstMoveChoice);
    }

    #[test]
    fn test_invalid_takes_rejected() {
        let mut game = MatchesGame::default();
        game.get_response("y");
        for text in ["0", "4", "two", ""] {
            let reply = game.get_response(text);
            assert_eq!(reply.code, MatchesCode::Continue);
            assert_eq!(game.remaining(), DEFAULT_MATCHES, "{text:?} was accepted");
        }
    }

    #[test]
    fn test_engine_leaves_one_mod_four() {
        let mut game = MatchesGame::default();
        game.get_response("y");
        game.get_response("2");
        // 21 - 2 = 19, engine takes 2 to leave 17
        assert_eq!(game.remaining(), 17);
    }

    #[test]
    fn test_taking_last_match_loses() {
        let mut game = MatchesGame::new(2);
        game.get_response("y");
        let reply = game.get_response("2");
        assert_eq!(reply.code, MatchesCode::EngineWon);
        assert_eq!(game.phase(), MatchesPhase::Finished(MatchesCode::EngineWon));
    }

    #[test]
    fn test_engine_forced_to_take_last_match() {
        let mut game = MatchesGame::new(2);
        game.get_response("y");
        let reply = game.get_response("1");
        assert_eq!(reply.code, MatchesCode::HumanWon);
        assert_eq!(game.remaining(), 0);
    }

    #[test]
    fn test_cannot_take_more_than_remaining() {
        let mut game = MatchesGame::new(2);
        game.get_response("y");
        let reply = game.get_response("3");
        assert_eq!(reply.code, MatchesCode::Continue);
        assert_eq!(reply.lines, vec!["You can take from 1 to 2 matches.".to_string()]);
    }

    #[test]
    fn test_empty_pile_holds_one_match() {
        let mut game = MatchesGame::new(0);
        assert_eq!(game.remaining(), 1);
        let reply = game.get_response("n");
        assert_eq!(reply.code, MatchesCode::HumanWon);
        assert_eq!(
            reply.lines,
            vec!["I take 1. I took the last match. You won!".to_string()]
        );

        let mut game = MatchesGame::new(0);
        game.get_response("y");
        let reply = game.get_response("1");
        assert_eq!(reply.code, MatchesCode::EngineWon);
        assert_eq!(game.phase(), MatchesPhase::Finished(MatchesCode::EngineWon));
    }
}
