//! The per-turn finite-state machine.
//!
//! Every turn starts in [`TurnPhase::Idle`]. The first action taken picks one of two paths:
//! drawing train cards (two draws, or a single face-up locomotive), or claiming a route.
//! Transitions are pure: the [`crate::manager::Manager`] computes the next phase before mutating anything,
//! so that a rejected action leaves the game untouched.

use crate::error::ActionError;

use serde::Serialize;

/// Number of train cards drawn in a complete drawing turn.
const NUM_DRAWS_PER_TURN: u8 = 2;

/// Phases of a single turn.
///
/// # JSON
/// Phases are tagged with a `state` field, in snake_case, e.g. `{"state":"drawing_cards","drawn":1}`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TurnPhase {
    /// No action was taken yet this turn.
    #[default]
    Idle,
    /// At least one train card was drawn this turn.
    DrawingCards { drawn: u8 },
    /// A face-up locomotive was taken as the first action, which uses up the whole turn.
    DrewOpenLocomotive,
    /// A route was claimed, which uses up the whole turn.
    RouteClaimed,
}

/// The ways of drawing a train card, as seen by the turn's state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrainCardDraw {
    /// Top of the close deck. Its color is irrelevant, as it is hidden when chosen.
    CloseDeck,
    /// A face-up card that is not a locomotive.
    OpenNonWild,
    /// A face-up locomotive, taken as an ordinary draw.
    OpenWild { index: usize },
    /// A face-up locomotive, taken as a whole-turn action.
    OpenLocomotive,
}

impl TurnPhase {
    /// Returns the phase reached after drawing a train card.
    ///
    /// Returns an `Err` if the draw is not allowed from the current phase.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::turn::{TrainCardDraw, TurnPhase};
    ///
    /// let phase = TurnPhase::Idle.after_draw(TrainCardDraw::CloseDeck).unwrap();
    /// assert_eq!(phase, TurnPhase::DrawingCards { drawn: 1 });
    /// assert!(!phase.is_turn_over());
    ///
    /// let phase = phase.after_draw(TrainCardDraw::OpenWild { index: 0 }).unwrap();
    /// assert!(phase.is_turn_over());
    /// ```
    pub fn after_draw(self, draw: TrainCardDraw) -> Result<TurnPhase, ActionError> {
        match (self, draw) {
            (TurnPhase::Idle, TrainCardDraw::OpenWild { index }) => {
                Err(ActionError::LocomotiveAsFirstDraw(index))
            }
            (TurnPhase::Idle, TrainCardDraw::OpenLocomotive) => Ok(TurnPhase::DrewOpenLocomotive),
            (TurnPhase::Idle, _) => Ok(TurnPhase::DrawingCards { drawn: 1 }),
            (TurnPhase::DrawingCards { .. }, TrainCardDraw::OpenLocomotive) => {
                Err(ActionError::LocomotiveAfterDraw)
            }
            (TurnPhase::DrawingCards { drawn }, _) if drawn < NUM_DRAWS_PER_TURN => {
                Ok(TurnPhase::DrawingCards { drawn: drawn + 1 })
            }
            _ => Err(ActionError::TurnAlreadyOver),
        }
    }

    /// Returns the phase reached after claiming a route.
    ///
    /// Returns an `Err` unless no action was taken yet this turn.
    pub fn after_claim(self) -> Result<TurnPhase, ActionError> {
        match self {
            TurnPhase::Idle => Ok(TurnPhase::RouteClaimed),
            TurnPhase::DrawingCards { drawn } if drawn < NUM_DRAWS_PER_TURN => {
                Err(ActionError::ClaimAfterDraw)
            }
            _ => Err(ActionError::TurnAlreadyOver),
        }
    }

    /// Whether no more action can be taken this turn.
    pub fn is_turn_over(&self) -> bool {
        match self {
            TurnPhase::Idle => false,
            TurnPhase::DrawingCards { drawn } => *drawn >= NUM_DRAWS_PER_TURN,
            TurnPhase::DrewOpenLocomotive | TurnPhase::RouteClaimed => true,
        }
    }
}
