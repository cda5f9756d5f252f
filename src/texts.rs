//! Fixed texts shown to players.

/// Asked after a tic-tac-toe start.
pub const BOARD_SIZE_PROMPT: &str = "Choose board size: 3 or 8";
/// Asked again after a bad size.
pub const BOARD_SIZE_REPROMPT: &str = "Choose board size: 3 or 8!";
/// Asked once the size is known.
pub const SIDE_PROMPT: &str = "Choose your side:";
/// Asked again after a bad side.
pub const SIDE_REPROMPT: &str = "Choose your side: X or O!";
/// Shown above the board while playing.
pub const BOARD_CAPTION: &str = "Let's play, my dear opponent! ";
/// Shown when an occupied or invalid cell is pressed.
pub const BLANK_CELL_NOTICE: &str = "Press on the blank box please";
/// Shown when text arrives during a grid game.
pub const USE_BUTTONS_NOTICE: &str = "Use the buttons on the board to make a move, or /exit to quit.";
/// Asked after the matches rules.
pub const MATCHES_FIRST_MOVE_PROMPT: &str = "Do you want to make first move? (y/n)";
/// Shown when a matches game gets something other than text.
pub const MATCHES_TAKE_NOTICE: &str = "Send the number of matches you take, or /exit to quit.";
/// A second session for a chat that already has one.
pub const GAME_IN_PROGRESS: &str = "A game is already in progress. Send /exit to leave it first.";
/// Exit confirmation.
pub const GAME_FINISHED: &str = "The game is finished.";
/// Start command while another game or setup is pending.
pub const BUSY_NOTICE: &str = "Finish the current game first, or send /exit to leave it.";
/// Game event without a game.
pub const NO_GAME_NOTICE: &str = "There is no game in progress. Send /help to see what I can do.";
/// Engine failure.
pub const ENGINE_FAILURE_NOTICE: &str = "Something went wrong, the game was cancelled.";
/// Draw in a grid game.
pub const DRAW_TEXT: &str = "The TicTacToe is a Draw.";
/// Appended to every grid game result.
pub const NEW_GAME_HINT: &str = "\nTo start a new game press please /tictactoe";
/// Five-in-a-row won by the player.
pub const HUMAN_WON_TEXT: &str = "You won!";
/// Five-in-a-row won by the AI.
pub const AI_WON_TEXT: &str = "AI won!";
/// Answer when a service is missing credentials.
pub const NOT_CONFIGURED: &str = "This feature is not configured.";
/// Solve service had no answer.
pub const SOLVE_UNKNOWN: &str = "I don't know!";
/// Joke service had nothing.
pub const NO_JOKE: &str = "I don't know any jokes about that.";
/// /solve without arguments.
pub const SOLVE_USAGE: &str = "Tell me what to solve. Example: /solve x^3=27";

const COMMANDS: [(&str, &str); 7] = [
    ("/tictactoe", "Tic-Tac-Toe 3X3 or five-in-a-row 8X8"),
    ("/matches", "Matches Game"),
    ("/solve", "Solve math tasks. Example: /solve x^3=27"),
    ("/exit", "Leave the current game"),
    ("Ask for a joke:", "\"Tell me a joke about ...\""),
    ("Ask for a translation:", "\"Translate ...\""),
    ("", "You can use voice input function."),
];

/// The help menu.
pub fn help_menu() -> String {
    std::iter::once("Make Your Choice:".to_string())
        .chain(
            COMMANDS
                .iter()
                .map(|(command, what)| format!("{command} {what}").trim().to_string()),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text for an unknown slash command.
pub fn unknown_command(name: &str) -> String {
    format!("Unknown command /{name}. Send /help to see what I can do.")
}

/// Echo for text nothing else matched.
pub fn echo(text: &str) -> String {
    format!("Did you say: \"{text}\"?")
}

/// Announcement before a joke.
pub fn joke_intro(about: &str) -> String {
    format!("Oh, you want a joke {about}. Let's see...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_menu_lists_commands() {
        let menu = help_menu();
        assert!(menu.starts_with("Make Your Choice:\n"));
        assert!(menu.contains("/matches Matches Game"));
        assert!(menu.ends_with("\nYou can use voice input function."));
    }
}
