use serde::{Deserialize, Serialize};

/// Every player starts the game with 45 wagons.
const DEFAULT_STARTING_WAGONS: u8 = 45;
/// Every player is dealt 4 train cards from the close deck when the game starts.
const DEFAULT_INITIAL_TRAIN_CARDS: usize = 4;

/// Tunables of a game, fixed when it is created.
///
/// # JSON
/// Every field is optional, and falls back to its default value.
/// ```
/// use ticket_to_ride_rules::config::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.starting_wagons, 45);
/// assert_eq!(config.initial_train_cards, 4);
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// How many wagons each player starts with.
    pub starting_wagons: u8,
    /// How many train cards are dealt to each player before the first turn.
    pub initial_train_cards: usize,
    /// Seeds the shuffling of the train cards. Two games created with the same seed,
    /// roster and map, and fed the same actions, play out identically.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Default configuration, with the given seed.
    pub fn with_seed(seed: Option<u64>) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_wagons: DEFAULT_STARTING_WAGONS,
            initial_train_cards: DEFAULT_INITIAL_TRAIN_CARDS,
            seed: None,
        }
    }
}
