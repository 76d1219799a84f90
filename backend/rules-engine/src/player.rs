use crate::card::TrainColor;
use crate::error::ActionError;
use crate::map::ClaimedRoute;

use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::iter::repeat;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
/// Keeps track of actions taken at a given turn.
pub struct TurnActions {
    /// Initially, `turn` is None, until the player takes their first action.
    /// Afterwards, actions are coupled to a turn, which is monotonically increasing.
    pub turn: Option<usize>,
    /// Human-readable description of the actions taken by the player during `turn`. At most two per turn.
    /// This is used to share updates with other players, so no private information is shared in it.
    pub description: SmallVec<[String; 2]>,
}

/// All the information about a player's current state, returned by [`Player::get_player_state`].
#[derive(Debug, PartialEq, Serialize)]
pub struct PlayerState<'a> {
    /// Encapsulates information that is visible to all players. Always populated!
    pub public_player_state: &'a PublicPlayerState,
    /// Encapsulates information that is *only* visible to the current player.
    /// Therefore, we only populate this if the request originated from the same player.
    pub private_player_state: Option<&'a PrivatePlayerState>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Information about a player's state that is visible to all players.
pub struct PublicPlayerState {
    /// Unique to each player in the game, and equal to their position in the roster.
    pub id: usize,
    /// Unique to each player in the game.
    pub name: String,
    /// The number of wagons the player has left.
    /// This is the currency used, alongside train cards, to claim routes.
    pub wagons: u8,
    /// How many points the player has so far.
    pub score: u16,
    /// Actions taken by the player during the last turn they have participated in.
    pub turn_actions: TurnActions,
    /// List of routes claimed by the player.
    pub claimed_routes: Vec<ClaimedRoute>,
    /// How many train cards a player has.
    /// This is derived from [`PrivatePlayerState::train_cards`].
    pub num_train_cards: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Information about a player's state that is only visible to that player.
pub struct PrivatePlayerState {
    /// Maps how many of a train color a player has.
    /// It is guaranteed that the map has at all times key-value pairs for all train colors.
    pub train_cards: HashMap<TrainColor, u8>,
}

/// Encapsulates all the player information.
///
/// A [`Player`] is not aware of the turn order, nor of other players: validating that an action is
/// allowed this turn is up to the [`crate::manager::Manager`].
#[derive(Debug)]
pub struct Player {
    public: PublicPlayerState,
    private: PrivatePlayerState,
}

impl Player {
    /// Creates a new player, with an empty hand.
    pub fn new(id: usize, name: String, wagons: u8) -> Self {
        Self {
            public: PublicPlayerState {
                id,
                name,
                wagons,
                score: 0,
                turn_actions: TurnActions::default(),
                claimed_routes: Vec::new(),
                num_train_cards: 0,
            },
            private: PrivatePlayerState {
                train_cards: TrainColor::iter().map(|color| (color, 0)).collect(),
            },
        }
    }

    #[inline]
    /// Access the player's id.
    pub fn id(&self) -> usize {
        self.public.id
    }

    /// Access the player's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.public.name
    }

    /// Access how many wagons a player has left.
    #[inline]
    pub fn wagons(&self) -> u8 {
        self.public.wagons
    }

    #[inline]
    pub fn score(&self) -> u16 {
        self.public.score
    }

    #[inline]
    pub fn num_train_cards(&self) -> u8 {
        self.public.num_train_cards
    }

    #[inline]
    pub fn claimed_routes(&self) -> &[ClaimedRoute] {
        &self.public.claimed_routes
    }

    #[inline]
    pub fn turn_actions(&self) -> &TurnActions {
        &self.public.turn_actions
    }

    /// How many cards of exactly this color the player holds.
    ///
    /// Wild cards are only counted when asking for [`TrainColor::Wild`].
    #[inline]
    pub fn count_color(&self, color: TrainColor) -> u8 {
        self.private.train_cards.get(&color).copied().unwrap_or(0)
    }

    /// Stores a train card in the player's hand.
    pub(crate) fn add_train_card(&mut self, card: TrainColor) {
        *self.private.train_cards.entry(card).or_insert(0) += 1;
        self.public.num_train_cards += 1;
    }

    /// Removes `num_cards` cards from the hand, paying with `color` first, and wild cards for the rest.
    ///
    /// Returns an `Err` if the hand cannot cover the whole amount, in which case the hand is left untouched.
    /// Otherwise, returns the removed cards.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::card::TrainColor;
    /// use ticket_to_ride_rules::player::Player;
    ///
    /// let mut player = Player::new(0, String::from("Alice"), 45);
    /// assert!(player.remove_cards(TrainColor::Red, 1).is_err());
    /// assert_eq!(player.count_color(TrainColor::Red), 0);
    /// ```
    pub fn remove_cards(
        &mut self,
        color: TrainColor,
        num_cards: u8,
    ) -> Result<Vec<TrainColor>, ActionError> {
        let available = self.count_color(color);
        let wild = if color.is_wild() {
            0
        } else {
            self.count_color(TrainColor::Wild)
        };

        if u16::from(available) + u16::from(wild) < u16::from(num_cards) {
            return Err(ActionError::NotEnoughCards {
                color,
                needed: num_cards,
                available,
                wild,
            });
        }

        // Sufficiency is established: nothing below can fail.
        let num_color_cards = available.min(num_cards);
        let num_wild_cards = num_cards - num_color_cards;

        if let Some(count) = self.private.train_cards.get_mut(&color) {
            *count -= num_color_cards;
        }
        if num_wild_cards > 0 {
            if let Some(count) = self.private.train_cards.get_mut(&TrainColor::Wild) {
                *count -= num_wild_cards;
            }
        }
        self.public.num_train_cards -= num_cards;

        Ok(repeat(color)
            .take(num_color_cards as usize)
            .chain(repeat(TrainColor::Wild).take(num_wild_cards as usize))
            .collect())
    }

    /// Picks the color used to pay for a neutral route of the given length.
    ///
    /// Amongst the ordinary colors the player can fully fund (own cards and wild cards together cover `length`),
    /// returns the one the player holds the most of. Wild cards do not count towards that abundance.
    /// Ties go to the first color in palette order.
    ///
    /// Returns `None` if no ordinary color is fundable.
    pub fn most_abundant_fundable_color(&self, length: u8) -> Option<TrainColor> {
        let num_wild_cards = u16::from(self.count_color(TrainColor::Wild));

        let mut most_abundant: Option<(TrainColor, u8)> = None;
        for color in TrainColor::non_wild() {
            let count = self.count_color(color);
            if u16::from(count) + num_wild_cards < u16::from(length) {
                continue;
            }

            match most_abundant {
                Some((_, best_count)) if best_count >= count => {}
                _ => most_abundant = Some((color, count)),
            }
        }

        most_abundant.map(|(color, _)| color)
    }

    /// Bookkeeping once a route was paid for: spends wagons, grants points, and logs the claim.
    pub(crate) fn record_claimed_route(&mut self, claimed_route: ClaimedRoute) {
        self.public.wagons -= claimed_route.length;
        self.public.score += claimed_route.points;
        self.public.claimed_routes.push(claimed_route);
    }

    /// Clears the turn's actions, and overrides it with the given description.
    #[inline]
    pub(crate) fn replace_turn_action(&mut self, turn: usize, description: String) {
        self.public.turn_actions.turn = Some(turn);

        self.public.turn_actions.description.clear();
        self.public.turn_actions.description.push(description);
    }

    /// Append the given description to the turn's actions.
    #[inline]
    pub(crate) fn append_turn_action(&mut self, description: String) {
        self.public.turn_actions.description.push(description);
    }

    /// Retrieve the player's state, which encapsulates both [`PublicPlayerState`] and [`PrivatePlayerState`].
    ///
    /// If the given `player_id` is not the same as the current player, only the public state will be populated --
    /// the private state will be left to `None`.
    /// Otherwise, both public and private states are populated.
    pub fn get_player_state(&self, player_id: usize) -> PlayerState {
        let private_player_state = if self.public.id == player_id {
            Some(&self.private)
        } else {
            None
        };

        PlayerState {
            public_player_state: &self.public,
            private_player_state,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_train_cards(&mut self, color: TrainColor, count: u8) {
        let previous = self.private.train_cards.insert(color, count).unwrap_or(0);
        self.public.num_train_cards = self.public.num_train_cards - previous + count;
    }
}
