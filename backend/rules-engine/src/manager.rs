use crate::{
    card::{CardDealer, CardDealerState, TrainColor},
    config::GameConfig,
    error::{ActionError, SetupError},
    map::{ClaimedRoute, Map, MapData, Route},
    player::{Player, PlayerState},
    turn::{TrainCardDraw, TurnPhase},
};

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use tracing::{debug, info, warn};

const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 4;

#[derive(Clone, Copy, Serialize, Debug, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
/// Phases of the games, which act as states in the game's finite-state machine.
///
/// # JSON
/// Phases are serialized in snake_case.
pub enum GamePhase {
    /// The main phase of the game: players take turns, in roster order.
    Playing,
    /// Every route has been claimed.
    ///
    /// No actions can be taken at this point.
    Finished,
}

#[derive(Debug, Serialize)]
/// All the information about a game's current state, returned by [`Manager::get_state`].
pub struct GameState<'a> {
    /// The phase of the game.
    pub phase: GamePhase,
    /// Starts at 0, and increments after each turn.
    /// Whose turn it is maps to an index in [`GameState::players_state`] (modulo the number of players).
    pub turn: usize,
    /// The id of the player whose turn it is.
    pub current_player_id: usize,
    /// What the current player has done so far this turn.
    pub turn_phase: TurnPhase,
    /// Public information about the decks of train cards.
    pub card_dealer_state: CardDealerState<'a>,
    /// Every route on the board, including by whom it is claimed.
    pub routes: &'a [Route],
    /// Information about all the players in the game.
    ///
    /// This only contains public information about them, except for requests coming from player _A_,
    /// which also holds private information about _A_ (and only _A_).
    pub players_state: Vec<PlayerState<'a>>,
    /// Ids of the players with the highest score, once the game is finished.
    pub winners: Option<Vec<usize>>,
}

/// Outcome of a player action, as shared with front ends.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    /// A confirmation on success, or the reason of the rejection.
    pub message: String,
}

impl ActionResponse {
    pub fn new_success(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn new_failure(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

impl<T: Display> From<Result<T, ActionError>> for ActionResponse {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(value) => Self::new_success(value.to_string()),
            Err(e) => Self::new_failure(e.to_string()),
        }
    }
}

/// In charge of holding all the state of the game, managing player actions, and transitions amongst players.
///
/// This overall acts as a finite-state machine: [`GamePhase`] for the whole game,
/// and [`TurnPhase`] for the current turn.
///
/// Every action either fully applies, or is rejected with an [`ActionError`] and leaves the game untouched.
#[derive(Debug)]
pub struct Manager {
    /// The current phase of the game, which marks nodes (states) in this finite-state machine.
    phase: GamePhase,
    /// Keeps track of the current turn, which is incremented every time
    /// a player finishes their turn.
    turn: usize,
    /// What the current player has done so far this turn.
    turn_phase: TurnPhase,
    map: Map,
    card_dealer: CardDealer,
    /// List of all players. A player's id matches their index in this list, which is also the order of play.
    players: Vec<Player>,
}

impl Manager {
    /// Creates a new game with the default [`GameConfig`], and the given seed.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::manager::Manager;
    /// use ticket_to_ride_rules::map::MapData;
    ///
    /// let map_data = MapData::from_json(r#"{
    ///     "cities": ["New York", "Chicago"],
    ///     "routes": [{"start": "New York", "end": "Chicago", "color": "blue", "length": 3}]
    /// }"#).unwrap();
    ///
    /// let manager = Manager::new_game(
    ///     vec![String::from("Alice"), String::from("Bob")],
    ///     map_data,
    ///     Some(42),
    /// ).unwrap();
    ///
    /// assert_eq!(manager.current_player().name(), "Alice");
    /// assert_eq!(manager.num_train_cards_in_game(), 110);
    /// assert!(!manager.is_finished());
    /// ```
    pub fn new_game(
        player_names: Vec<String>,
        map_data: MapData,
        seed: Option<u64>,
    ) -> Result<Self, SetupError> {
        Self::with_config(player_names, map_data, GameConfig::with_seed(seed))
    }

    /// Creates a new game, in [`GamePhase::Playing`].
    ///
    /// Returns an `Err` if either:
    ///   * There are fewer than two players, or more than four.
    ///   * A player name is empty, or used more than once.
    ///   * The map data is invalid (see [`Map::new`]).
    ///
    /// Otherwise, shuffles the train cards, deals the initial train cards to each player in roster order,
    /// and gives the turn to the first player.
    pub fn with_config(
        player_names: Vec<String>,
        map_data: MapData,
        config: GameConfig,
    ) -> Result<Self, SetupError> {
        validate_player_names(&player_names)?;

        let map = Map::new(map_data)?;
        let mut card_dealer = CardDealer::new(config.seed);

        let mut players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(id, name)| Player::new(id, name, config.starting_wagons))
            .collect();

        for player in &mut players {
            for _ in 0..config.initial_train_cards {
                match card_dealer.draw() {
                    Some(train_card) => player.add_train_card(train_card),
                    None => break,
                }
            }
        }

        info!(
            num_players = players.len(),
            num_routes = map.routes().len(),
            seed = ?config.seed,
            "new game created"
        );

        Ok(Self {
            phase: GamePhase::Playing,
            turn: 0,
            turn_phase: TurnPhase::Idle,
            map,
            card_dealer,
            players,
        })
    }

    /// Returns the game's state, from the perspective of a given player.
    ///
    /// This said perspective is important, because a given player should only be
    /// able to know about the public information of other players, but should know
    /// private information about themselves (e.g. which train cards they have).
    pub fn get_state(&self, player_id: usize) -> GameState {
        GameState {
            phase: self.phase,
            turn: self.turn,
            current_player_id: self.current_player_index(),
            turn_phase: self.turn_phase,
            card_dealer_state: self.card_dealer.get_state(),
            routes: self.map.routes(),
            players_state: self
                .players
                .iter()
                .map(|player| player.get_player_state(player_id))
                .collect(),
            winners: self.winner_ids(),
        }
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn turn(&self) -> usize {
        self.turn
    }

    #[inline]
    pub fn turn_phase(&self) -> TurnPhase {
        self.turn_phase
    }

    #[inline]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns the number of players in the current game.
    #[inline]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    #[inline]
    fn current_player_index(&self) -> usize {
        self.turn % self.players.len()
    }

    /// The player whose turn it is.
    #[inline]
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index()]
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Returns every player with the highest score, once the game is finished.
    ///
    /// Returns `None` while the game is still being played.
    pub fn winners(&self) -> Option<Vec<&Player>> {
        if !self.is_finished() {
            return None;
        }

        let max_score = self.players.iter().map(|player| player.score()).max()?;
        Some(
            self.players
                .iter()
                .filter(|player| player.score() == max_score)
                .collect(),
        )
    }

    fn winner_ids(&self) -> Option<Vec<usize>> {
        self.winners()
            .map(|winners| winners.iter().map(|player| player.id()).collect())
    }

    /// How many train cards exist in the game, across the decks and all hands.
    /// This never changes throughout the game.
    pub fn num_train_cards_in_game(&self) -> usize {
        self.card_dealer.num_train_cards()
            + self
                .players
                .iter()
                .map(|player| player.num_train_cards() as usize)
                .sum::<usize>()
    }

    /// Ends the current turn, and gives the turn to the next player in roster order.
    ///
    /// Actions that end a turn call this themselves. Front ends only need it to pass a turn in which
    /// no action is possible. Does nothing once the game is finished.
    pub fn next_turn(&mut self) {
        if self.is_finished() {
            return;
        }

        self.turn += 1;
        self.turn_phase = TurnPhase::Idle;

        info!(
            turn = self.turn,
            player = self.current_player_index(),
            "turn started"
        );
    }

    fn check_active_player(&self, player_id: usize) -> Result<(), ActionError> {
        if self.is_finished() {
            return Err(ActionError::GameFinished);
        }

        if player_id >= self.players.len() {
            return Err(ActionError::UnknownPlayer(player_id));
        }

        let current_player_id = self.current_player_index();
        if player_id != current_player_id {
            return Err(ActionError::NotYourTurn {
                player_id,
                current_player_id,
            });
        }

        Ok(())
    }

    /// Draws the top train card of the close deck, for the given player.
    ///
    /// Returns an `Err` if it is not this player's turn, or if they cannot draw a train card this turn.
    ///
    /// Otherwise, returns the card drawn, or `None` if both the close and discarded decks are exhausted.
    /// In the latter case, nothing changes: this does not count as a draw.
    pub fn draw_from_deck(&mut self, player_id: usize) -> Result<Option<TrainColor>, ActionError> {
        self.try_draw_from_deck(player_id)
            .map_err(|e| log_rejection(player_id, "draw_from_deck", e))
    }

    fn try_draw_from_deck(&mut self, player_id: usize) -> Result<Option<TrainColor>, ActionError> {
        self.check_active_player(player_id)?;
        let next_turn_phase = self.turn_phase.after_draw(TrainCardDraw::CloseDeck)?;

        let train_card = match self.card_dealer.draw() {
            Some(train_card) => train_card,
            None => {
                debug!(player = player_id, "no train card left to draw");
                return Ok(None);
            }
        };

        let player = &mut self.players[player_id];
        player.add_train_card(train_card);
        let description = format!("{} drew a train card from the close deck.", player.name());

        debug!(player = player_id, card = %train_card, "drew from the close deck");
        self.record_draw(player_id, next_turn_phase, description);

        Ok(Some(train_card))
    }

    /// Takes the face-up train card at `card_index`, for the given player.
    ///
    /// Returns an `Err` if either:
    ///   * It is not this player's turn.
    ///   * There is no card at this index.
    ///   * The card is a locomotive, and this is the first draw of the turn
    ///     (see [`Manager::draw_locomotive_face_up`]).
    ///   * The player cannot draw a train card this turn.
    ///
    /// Otherwise, returns the card taken. The turn is over after the second draw,
    /// or as soon as no train card is left to draw.
    pub fn draw_face_up(
        &mut self,
        player_id: usize,
        card_index: usize,
    ) -> Result<TrainColor, ActionError> {
        self.try_draw_face_up(player_id, card_index)
            .map_err(|e| log_rejection(player_id, "draw_face_up", e))
    }

    fn try_draw_face_up(
        &mut self,
        player_id: usize,
        card_index: usize,
    ) -> Result<TrainColor, ActionError> {
        self.check_active_player(player_id)?;

        let train_card = self.card_dealer.peek_open_train_card(card_index)?;
        let draw = if train_card.is_wild() {
            TrainCardDraw::OpenWild { index: card_index }
        } else {
            TrainCardDraw::OpenNonWild
        };
        let next_turn_phase = self.turn_phase.after_draw(draw)?;

        self.take_open_train_card(player_id, card_index, next_turn_phase)
    }

    /// Takes the face-up locomotive at `card_index`, for the given player. This uses up their whole turn.
    ///
    /// Returns an `Err` if either:
    ///   * It is not this player's turn.
    ///   * The player has already drawn a train card this turn.
    ///   * There is no card at this index, or it is not a locomotive.
    pub fn draw_locomotive_face_up(
        &mut self,
        player_id: usize,
        card_index: usize,
    ) -> Result<TrainColor, ActionError> {
        self.try_draw_locomotive_face_up(player_id, card_index)
            .map_err(|e| log_rejection(player_id, "draw_locomotive_face_up", e))
    }

    fn try_draw_locomotive_face_up(
        &mut self,
        player_id: usize,
        card_index: usize,
    ) -> Result<TrainColor, ActionError> {
        self.check_active_player(player_id)?;
        let next_turn_phase = self.turn_phase.after_draw(TrainCardDraw::OpenLocomotive)?;

        let train_card = self.card_dealer.peek_open_train_card(card_index)?;
        if train_card.is_not_wild() {
            return Err(ActionError::NotALocomotive {
                index: card_index,
                color: train_card,
            });
        }

        self.take_open_train_card(player_id, card_index, next_turn_phase)
    }

    /// Moves the open train card to the player's hand, once the draw has been validated.
    fn take_open_train_card(
        &mut self,
        player_id: usize,
        card_index: usize,
        next_turn_phase: TurnPhase,
    ) -> Result<TrainColor, ActionError> {
        let (train_card, recycled) = self.card_dealer.take_open_train_card(card_index)?;

        let player = &mut self.players[player_id];
        player.add_train_card(train_card);
        let description = if recycled {
            format!(
                "{} drew a {} train card from the open deck. The open deck was then recycled because there were three wild cards.",
                player.name(),
                train_card
            )
        } else {
            format!(
                "{} drew a {} train card from the open deck.",
                player.name(),
                train_card
            )
        };

        debug!(
            player = player_id,
            index = card_index,
            card = %train_card,
            "drew from the open deck"
        );
        self.record_draw(player_id, next_turn_phase, description);

        Ok(train_card)
    }

    fn record_draw(&mut self, player_id: usize, next_turn_phase: TurnPhase, description: String) {
        let player = &mut self.players[player_id];
        if self.turn_phase == TurnPhase::Idle {
            player.replace_turn_action(self.turn, description);
        } else {
            player.append_turn_action(description);
        }

        self.turn_phase = next_turn_phase;

        // The turn also ends early if there is nothing left to draw.
        if next_turn_phase.is_turn_over() || !self.card_dealer.can_player_draw_again_this_turn() {
            self.next_turn();
        }
    }

    /// Claims the route between two cities, for the given player. This uses up their whole turn.
    ///
    /// Returns an `Err` if either:
    ///   * It is not this player's turn, or they have already drawn a train card this turn.
    ///   * There is no route between these cities, or it is already claimed.
    ///   * The player does not have enough wagons.
    ///   * The player cannot pay for the route. On a neutral route, the color used is the one the player
    ///     holds the most of, amongst those they can pay with.
    ///
    /// Otherwise, pays for the route (cards of the route's color first, wild cards for the rest), grants the
    /// points, and returns the [`ClaimedRoute`]. If every route is now claimed, the game is finished.
    /// Otherwise, the turn goes to the next player.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::error::ActionError;
    /// use ticket_to_ride_rules::manager::Manager;
    /// use ticket_to_ride_rules::map::MapData;
    ///
    /// let map_data = MapData::from_json(r#"{
    ///     "cities": ["New York", "Chicago"],
    ///     "routes": [{"start": "New York", "end": "Chicago", "color": "blue", "length": 3}]
    /// }"#).unwrap();
    /// let mut manager = Manager::new_game(
    ///     vec![String::from("Alice"), String::from("Bob")],
    ///     map_data,
    ///     None,
    /// ).unwrap();
    ///
    /// assert_eq!(
    ///     manager.claim_route(0, "Chicago", "Miami"),
    ///     Err(ActionError::RouteNotFound(String::from("Chicago"), String::from("Miami")))
    /// );
    /// ```
    pub fn claim_route(
        &mut self,
        player_id: usize,
        start: &str,
        end: &str,
    ) -> Result<ClaimedRoute, ActionError> {
        self.try_claim_route(player_id, start, end)
            .map_err(|e| log_rejection(player_id, "claim_route", e))
    }

    fn try_claim_route(
        &mut self,
        player_id: usize,
        start: &str,
        end: &str,
    ) -> Result<ClaimedRoute, ActionError> {
        self.check_active_player(player_id)?;
        let next_turn_phase = self.turn_phase.after_claim()?;

        let route_index = self.map.can_route_be_claimed(start, end)?;
        let route = self.map.route(route_index);
        let length = route.length();

        let player = &self.players[player_id];
        if player.wagons() < length {
            return Err(ActionError::NotEnoughWagons {
                needed: length,
                available: player.wagons(),
            });
        }

        let train_color = if route.train_color().is_wild() {
            player
                .most_abundant_fundable_color(length)
                .ok_or_else(|| {
                    let (start, end) = route.cities().clone();
                    ActionError::NoFundableColor { start, end, length }
                })?
        } else {
            route.train_color()
        };

        let available = player.count_color(train_color);
        let wild = player.count_color(TrainColor::Wild);
        if u16::from(available) + u16::from(wild) < u16::from(length) {
            return Err(ActionError::NotEnoughCards {
                color: train_color,
                needed: length,
                available,
                wild,
            });
        }

        // Every check passed: from here on, the claim is committed.
        let cities = route.cities().clone();
        let player = &mut self.players[player_id];
        let train_cards = player.remove_cards(train_color, length).map_err(|e| {
            ActionError::InvariantViolation(format!(
                "paying for a route failed after the hand was found sufficient: {}",
                e
            ))
        })?;

        let claimed_route = ClaimedRoute {
            route: cities,
            length,
            train_color,
            num_wild_cards: train_cards.iter().filter(|card| card.is_wild()).count() as u8,
            points: Map::calculate_points_for_claimed_route(length),
        };

        let description = format!("{} claimed {}.", player.name(), claimed_route);
        player.replace_turn_action(self.turn, description);
        player.record_claimed_route(claimed_route.clone());
        self.card_dealer.discard_train_cards(train_cards);
        self.map.claim_route_for_player(route_index, player_id);
        self.turn_phase = next_turn_phase;

        info!(
            player = player_id,
            route = %claimed_route,
            "route claimed"
        );

        if self.map.all_routes_claimed() {
            self.phase = GamePhase::Finished;
            info!(
                turn = self.turn,
                winners = ?self.winner_ids(),
                "every route is claimed; game finished"
            );
        } else {
            self.next_turn();
        }

        Ok(claimed_route)
    }
}

fn validate_player_names(player_names: &[String]) -> Result<(), SetupError> {
    if player_names.len() < MIN_PLAYERS {
        return Err(SetupError::NotEnoughPlayers(player_names.len()));
    }

    if player_names.len() > MAX_PLAYERS {
        return Err(SetupError::TooManyPlayers(player_names.len()));
    }

    let mut used_player_names = HashSet::with_capacity(player_names.len());
    for player_name in player_names {
        if player_name.trim().is_empty() {
            return Err(SetupError::EmptyPlayerName);
        }

        if !used_player_names.insert(player_name.as_str()) {
            return Err(SetupError::DuplicatePlayerName(player_name.clone()));
        }
    }

    Ok(())
}

fn log_rejection(player_id: usize, action: &str, error: ActionError) -> ActionError {
    if error.is_invariant_violation() {
        warn!(player = player_id, action, %error, "action aborted");
    } else {
        debug!(player = player_id, action, %error, "action rejected");
    }

    error
}
