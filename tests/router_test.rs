//! Routing of inputs by chat state.

use chatplay::{Event, GameChoice, Input, Intent, Route, Router, SessionState};
use chatplay_games::Marker;

fn router() -> Router {
    Router::with_keywords().unwrap()
}

fn text(state: SessionState, text: &str) -> Route {
    router().route(state, Input::Text(text.to_string()))
}

fn command(name: &str, args: &[&str]) -> Route {
    router().route(
        SessionState::GridGameInProgress,
        Input::Command {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        },
    )
}

#[test]
fn test_commands_route_the_same_in_any_state() {
    assert_eq!(command("start", &[]), Route::Game(Event::ResetCommand));
    assert_eq!(command("help", &[]), Route::Game(Event::ResetCommand));
    assert_eq!(command("exit", &[]), Route::Game(Event::ExitCommand));
    assert_eq!(
        command("matches", &[]),
        Route::Game(Event::StartCommand(GameChoice::Matches))
    );
    assert_eq!(
        command("tictactoe", &[]),
        Route::Game(Event::StartCommand(GameChoice::TicTacToe))
    );
    assert_eq!(
        command("solve", &["x^3", "=", "27"]),
        Route::Intent(Intent::Solve("x^3 = 27".into()))
    );
    assert_eq!(
        command("weather", &[]),
        Route::Intent(Intent::UnknownCommand("weather".into()))
    );
}

#[test]
fn test_text_depends_on_state() {
    assert_eq!(
        text(SessionState::AwaitingBoardSize, "8"),
        Route::Game(Event::SizeChoice("8".into()))
    );
    assert_eq!(
        text(SessionState::AwaitingSide, " x "),
        Route::Game(Event::SideChoice(Marker::X))
    );
    assert_eq!(
        text(SessionState::AwaitingSide, "both"),
        Route::Game(Event::Unrecognized("both".into()))
    );
    assert_eq!(
        text(SessionState::MatchesInProgress, "play matches"),
        Route::Game(Event::MatchesText("play matches".into()))
    );
    assert_eq!(
        text(SessionState::AwaitingMatchesFirstMove, "Y"),
        Route::Game(Event::MatchesText("Y".into()))
    );
    assert_eq!(
        text(SessionState::GridGameInProgress, "5"),
        Route::Game(Event::Unrecognized("5".into()))
    );
    assert_eq!(
        text(SessionState::Idle, "run tic-tac-toe"),
        Route::Game(Event::StartCommand(GameChoice::TicTacToe))
    );
    assert_eq!(
        text(SessionState::Idle, "Evaluate 3 * 7"),
        Route::Intent(Intent::Solve("3 * 7".into()))
    );
}

#[test]
fn test_buttons_depend_on_state() {
    let router = router();
    assert_eq!(
        router.route(SessionState::AwaitingSide, Input::ButtonPress(1)),
        Route::Game(Event::SideChoice(Marker::O))
    );
    assert_eq!(
        router.route(SessionState::GridGameInProgress, Input::ButtonPress(1)),
        Route::Game(Event::CellPress(1))
    );
    assert_eq!(
        router.route(SessionState::Idle, Input::ButtonPress(63)),
        Route::Game(Event::CellPress(63))
    );
}
