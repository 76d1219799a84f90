use crate::error::ActionError;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::iter::repeat;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{info, trace};

/// At most five train cards are openly displayed at a time.
pub const NUM_OPEN_TRAIN_CARDS: usize = 5;
const NUM_WILD_CARDS: usize = 14;
const NUM_NON_WILD_CARDS: usize = 12;
const WILD_CARD_LIMIT: usize = 3;

/// Total number of train cards in one game: 12 cards for each of the 8 colors, and 14 wild cards.
pub const NUM_TRAIN_CARDS: usize = 110;

/// Represents the different variants of train cards.
///
/// On a route, [`TrainColor::Wild`] denotes a neutral route, which can be paid with any single color.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainColor {
    /// Also known as the *Hopper train*.
    Black,
    /// Also known as the *Tanker train*.
    Blue,
    /// Also known as the *Caboose train*.
    Green,
    /// Also known as the *Freight train*.
    Orange,
    /// Also known as the *Box train*.
    Pink,
    /// Also known as the *Coal train*.
    Red,
    /// Also known as the *Passenger train*.
    White,
    /// Also known as the *Locomotive*.
    /// This is a special train that matches with any color.
    Wild,
    /// Also known as the *Reefer train*.
    Yellow,
}

impl TrainColor {
    /// Whether the current color is wild, i.e. matches with any color.
    ///
    /// # Examples:
    /// ```
    /// use ticket_to_ride_rules::card::TrainColor;
    ///
    /// let color = TrainColor::Black;
    /// assert!(!color.is_wild());
    ///
    /// let wild_color = TrainColor::Wild;
    /// assert!(wild_color.is_wild());
    /// ```
    #[inline]
    pub fn is_wild(&self) -> bool {
        *self == TrainColor::Wild
    }

    /// The opposite of `is_wild`.
    #[inline]
    pub fn is_not_wild(&self) -> bool {
        !self.is_wild()
    }

    /// Iterates over the ordinary colors, in palette order. Wild is excluded.
    pub fn non_wild() -> impl Iterator<Item = TrainColor> {
        TrainColor::iter().filter(|color| color.is_not_wild())
    }
}

/// Public view of the decks, shared with all players.
#[derive(Debug, PartialEq, Serialize)]
pub struct CardDealerState<'a> {
    pub open_train_card_deck: &'a [TrainColor],
    pub close_train_card_deck_size: usize,
    pub discarded_train_card_deck_size: usize,
}

/// Entity in charge of dealing as well as shuffling train cards.
///
/// It owns three disjoint piles: the close deck (face down, drawn from the top), the discarded deck,
/// and the open deck of at most five face-up cards. Cards held by players are not tracked here.
#[derive(Debug)]
pub struct CardDealer {
    open_train_card_deck: SmallVec<[TrainColor; NUM_OPEN_TRAIN_CARDS]>,
    close_train_card_deck: Vec<TrainColor>,
    discarded_train_card_deck: Vec<TrainColor>,
    rng: StdRng,
}

impl CardDealer {
    /// Creates a new `CardDealer`, which starts with all 110 train cards shuffled, five of them face up.
    ///
    /// The shuffle is reproducible when a `seed` is given. The open deck starts in a valid state,
    /// i.e. it does not hold three wild cards or more.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::card::CardDealer;
    ///
    /// let card_dealer = CardDealer::new(Some(42));
    /// assert_eq!(card_dealer.open_train_cards().len(), 5);
    /// assert_eq!(card_dealer.num_train_cards(), 110);
    /// ```
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut all_train_cards = Vec::with_capacity(NUM_TRAIN_CARDS);
        for color in TrainColor::iter() {
            let num_of_train_cards_per_color = if color.is_wild() {
                NUM_WILD_CARDS
            } else {
                NUM_NON_WILD_CARDS
            };
            all_train_cards.extend(repeat(color).take(num_of_train_cards_per_color));
        }

        all_train_cards.shuffle(&mut rng);

        Self::with_close_train_card_deck(all_train_cards, rng)
    }

    /// Deals the open deck from the top of `close_train_card_deck`, recycling it if needed.
    fn with_close_train_card_deck(close_train_card_deck: Vec<TrainColor>, rng: StdRng) -> Self {
        let mut new_card_dealer = Self {
            open_train_card_deck: SmallVec::new(),
            close_train_card_deck,
            discarded_train_card_deck: Vec::new(),
            rng,
        };

        new_card_dealer.refill_open_train_card_deck();
        new_card_dealer.maybe_recycle_open_train_card_deck();

        new_card_dealer
    }

    /// Draws from the top of the close train card deck, and returns the card.
    ///
    /// If the close deck is empty, the discarded deck is first shuffled and becomes the close deck.
    /// If both are empty, returns `None`: the decks are exhausted, which is not a fault.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::card::CardDealer;
    ///
    /// let mut card_dealer = CardDealer::new(None);
    ///
    /// match card_dealer.draw() {
    ///     Some(train_card) => println!("Picked {} from the close deck.", train_card),
    ///     None => println!("No train cards left."),
    /// }
    /// ```
    pub fn draw(&mut self) -> Option<TrainColor> {
        if self.close_train_card_deck.is_empty() {
            self.reshuffle_and_swap_discarded_deck();
        }

        self.close_train_card_deck.pop()
    }

    /// Looks at the open train card at `card_index`, without taking it.
    pub fn peek_open_train_card(&self, card_index: usize) -> Result<TrainColor, ActionError> {
        self.open_train_card_deck
            .get(card_index)
            .copied()
            .ok_or(ActionError::InvalidIndex {
                index: card_index,
                size: self.open_train_card_deck.len(),
            })
    }

    /// Takes the train card at `card_index` from the open deck.
    ///
    /// The emptied slot is refilled with the top card of the close deck. If no card can be drawn,
    /// the open deck simply shrinks. After the refill, if three or more wild cards are face up, the
    /// whole open deck is discarded and dealt again.
    ///
    /// Returns the selected card, and whether the open deck was recycled.
    /// If the index is out of bounds, returns `Err` and nothing changes.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::card::CardDealer;
    ///
    /// let mut card_dealer = CardDealer::new(Some(7));
    /// let invalid_card_index = 6;
    /// let valid_card_index = 2;
    ///
    /// assert!(card_dealer.take_open_train_card(invalid_card_index).is_err());
    ///
    /// let expected_card = card_dealer.open_train_cards()[valid_card_index];
    /// let (train_card, _recycled) = card_dealer.take_open_train_card(valid_card_index).unwrap();
    /// assert_eq!(train_card, expected_card);
    /// ```
    pub fn take_open_train_card(
        &mut self,
        card_index: usize,
    ) -> Result<(TrainColor, bool), ActionError> {
        let card = self.peek_open_train_card(card_index)?;

        match self.draw() {
            Some(replacement) => self.open_train_card_deck[card_index] = replacement,
            None => {
                self.open_train_card_deck.remove(card_index);
            }
        }

        Ok((card, self.maybe_recycle_open_train_card_deck()))
    }

    /// Adds the given train cards to the deck of discarded train cards.
    ///
    /// Nothing is shuffled here: the discarded deck is only shuffled once a draw finds the close deck empty.
    pub fn discard_train_cards(&mut self, train_cards: Vec<TrainColor>) {
        // Note that insertion order in the discard deck does not matter.
        self.discarded_train_card_deck.extend(train_cards);
    }

    /// Predicate that determines whether a player could draw a second train card this turn.
    ///
    /// A locomotive from the open deck is a legal second draw, so the only way to be stuck is
    /// for every pile to be empty.
    #[inline]
    pub fn can_player_draw_again_this_turn(&self) -> bool {
        !self.close_train_card_deck.is_empty()
            || !self.discarded_train_card_deck.is_empty()
            || !self.open_train_card_deck.is_empty()
    }

    /// The face-up train cards, in slot order.
    #[inline]
    pub fn open_train_cards(&self) -> &[TrainColor] {
        &self.open_train_card_deck
    }

    /// How many train cards are held by the dealer, across all three piles.
    #[inline]
    pub fn num_train_cards(&self) -> usize {
        self.open_train_card_deck.len()
            + self.close_train_card_deck.len()
            + self.discarded_train_card_deck.len()
    }

    pub fn get_state(&self) -> CardDealerState {
        CardDealerState {
            open_train_card_deck: &self.open_train_card_deck,
            close_train_card_deck_size: self.close_train_card_deck.len(),
            discarded_train_card_deck_size: self.discarded_train_card_deck.len(),
        }
    }

    fn refill_open_train_card_deck(&mut self) {
        while self.open_train_card_deck.len() < NUM_OPEN_TRAIN_CARDS {
            match self.draw() {
                Some(color) => self.open_train_card_deck.push(color),
                None => break,
            }
        }
    }

    fn should_recycle_open_train_card_deck(&self) -> bool {
        let num_wild_cards_in_open_train_card_deck = self
            .open_train_card_deck
            .iter()
            .filter(|color| color.is_wild())
            .count();

        // If there is less than 3 wild cards in the open deck, then we should not recycle.
        if num_wild_cards_in_open_train_card_deck < WILD_CARD_LIMIT {
            return false;
        }

        // Otherwise, we should recycle as long as there is at least 3 non-wild card in any decks.
        // If we did not verify that, we could end up recycling ad infinitum.
        let mut total_non_wild_cards_in_all_decks = 0;
        for deck in [
            self.open_train_card_deck.as_slice(),
            self.close_train_card_deck.as_slice(),
            self.discarded_train_card_deck.as_slice(),
        ] {
            for train_card in deck {
                if train_card.is_not_wild() {
                    total_non_wild_cards_in_all_decks += 1;

                    if total_non_wild_cards_in_all_decks >= WILD_CARD_LIMIT {
                        return true;
                    }
                }
            }
        }

        false
    }

    fn maybe_recycle_open_train_card_deck(&mut self) -> bool {
        let mut recycled = false;

        // A fresh open deck may again have three or more wild cards.
        while self.should_recycle_open_train_card_deck() {
            info!(
                open_train_cards = ?self.open_train_card_deck,
                "too many wild cards face up; recycling the open deck"
            );

            self.discarded_train_card_deck
                .extend(self.open_train_card_deck.drain(..));
            self.refill_open_train_card_deck();
            recycled = true;
        }

        recycled
    }

    fn reshuffle_and_swap_discarded_deck(&mut self) {
        if self.discarded_train_card_deck.is_empty() {
            return;
        }

        trace!(
            num_train_cards = self.discarded_train_card_deck.len(),
            "close deck is empty; reshuffling the discarded deck"
        );
        self.discarded_train_card_deck.shuffle(&mut self.rng);

        std::mem::swap(
            &mut self.close_train_card_deck,
            &mut self.discarded_train_card_deck,
        );
    }

    /// Mutable accessor to the open train card deck.
    #[cfg(test)]
    pub(crate) fn get_mut_open_train_card_deck(
        &mut self,
    ) -> &mut SmallVec<[TrainColor; NUM_OPEN_TRAIN_CARDS]> {
        &mut self.open_train_card_deck
    }

    /// Mutable accessor to the close train card deck.
    #[cfg(test)]
    pub(crate) fn get_mut_close_train_card_deck(&mut self) -> &mut Vec<TrainColor> {
        &mut self.close_train_card_deck
    }

    /// Mutable accessor to the discarded train card deck.
    #[cfg(test)]
    pub(crate) fn get_mut_discarded_train_card_deck(&mut self) -> &mut Vec<TrainColor> {
        &mut self.discarded_train_card_deck
    }
}
