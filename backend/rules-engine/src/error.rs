//! Failures surfaced by the rules engine.
//!
//! [`SetupError`] is fatal to game creation: no [`crate::manager::Manager`] is built.
//! [`ActionError`] is always recoverable: the rejected action left every deck, hand and route untouched,
//! and the acting player may try something else during the same turn.

use crate::card::TrainColor;
use crate::city::City;

use thiserror::Error;

/// Reasons why a game could not be created.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SetupError {
    #[error("Cannot create a game with {0} players: one must have at least two players.")]
    NotEnoughPlayers(usize),
    #[error("Cannot create a game with {0} players: one can have at most four players.")]
    TooManyPlayers(usize),
    #[error("Player names cannot be empty.")]
    EmptyPlayerName,
    #[error("Player name `{0}` is used more than once.")]
    DuplicatePlayerName(String),
    #[error("City `{0}` is listed more than once in the map.")]
    DuplicateCity(City),
    #[error("The map does not contain any route.")]
    NoRoutes,
    #[error("The route between {start} and {end} references the unknown city `{city}`.")]
    UnknownCity { start: City, end: City, city: City },
    #[error("The route between {0} and {0} connects a city to itself.")]
    LoopRoute(City),
    #[error("There is more than one route between {0} and {1}.")]
    DuplicateRoute(City, City),
    #[error("The route between {start} and {end} has length {length}, but lengths must be between 1 and 6.")]
    InvalidRouteLength { start: City, end: City, length: u8 },
    #[error("Could not decode the map data: {0}")]
    MalformedMapData(String),
}

/// Reasons why a player action was rejected.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ActionError {
    #[error("The game is over: no more actions can be taken.")]
    GameFinished,
    #[error("There is no player with id {0}.")]
    UnknownPlayer(usize),
    #[error("It is not player {player_id}'s turn, but player {current_player_id}'s.")]
    NotYourTurn {
        player_id: usize,
        current_player_id: usize,
    },
    #[error("The turn is already over.")]
    TurnAlreadyOver,

    // Drawing train cards.
    #[error("Card looked up at index {index} is out of bounds (size {size}).")]
    InvalidIndex { index: usize, size: usize },
    #[error("The open card at index {0} is a locomotive: taking it as a first draw uses the whole turn.")]
    LocomotiveAsFirstDraw(usize),
    #[error("The open card at index {index} is a {color} card, not a locomotive.")]
    NotALocomotive { index: usize, color: TrainColor },
    #[error("Cannot take a locomotive as a whole-turn action after having already drawn a train card this turn.")]
    LocomotiveAfterDraw,

    // Claiming routes.
    #[error("Cannot claim a route after having drawn a train card this turn.")]
    ClaimAfterDraw,
    #[error("No route exists between {0} and {1}.")]
    RouteNotFound(String, String),
    #[error("The route between {0} and {1} is already claimed.")]
    RouteAlreadyClaimed(City, City),
    #[error("Cannot claim a route of length {needed}, whilst having only {available} wagons left.")]
    NotEnoughWagons { needed: u8, available: u8 },
    #[error("No single color can pay for the route between {start} and {end} of length {length}.")]
    NoFundableColor { start: City, end: City, length: u8 },
    #[error("Not enough {color} cards: {needed} are needed, but only {available} {color} cards and {wild} locomotives are available.")]
    NotEnoughCards {
        color: TrainColor,
        needed: u8,
        available: u8,
        wild: u8,
    },

    /// Never reachable when checks run in order. Kept apart from ordinary rejections so that tests can flag it.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl ActionError {
    /// Whether this error denotes a defect in the engine rather than an illegal action.
    #[inline]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ActionError::InvariantViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_messages() {
        assert_eq!(
            SetupError::NotEnoughPlayers(1).to_string(),
            "Cannot create a game with 1 players: one must have at least two players."
        );
        assert_eq!(
            SetupError::TooManyPlayers(5).to_string(),
            "Cannot create a game with 5 players: one can have at most four players."
        );
        assert_eq!(
            SetupError::InvalidRouteLength {
                start: City::from("Chicago"),
                end: City::from("Miami"),
                length: 7
            }
            .to_string(),
            "The route between Chicago and Miami has length 7, but lengths must be between 1 and 6."
        );
    }

    #[test]
    fn action_error_messages() {
        assert_eq!(
            ActionError::NotEnoughCards {
                color: TrainColor::Red,
                needed: 4,
                available: 1,
                wild: 2
            }
            .to_string(),
            "Not enough red cards: 4 are needed, but only 1 red cards and 2 locomotives are available."
        );
        assert_eq!(
            ActionError::RouteAlreadyClaimed(City::from("New York"), City::from("Chicago"))
                .to_string(),
            "The route between New York and Chicago is already claimed."
        );
    }

    #[test]
    fn invariant_violation_is_distinct() {
        assert!(ActionError::InvariantViolation(String::from("oops")).is_invariant_violation());
        assert!(!ActionError::ClaimAfterDraw.is_invariant_violation());
        assert!(!ActionError::GameFinished.is_invariant_violation());
    }
}
