use crate::card::TrainColor;
use crate::city::{City, CityToCity};
use crate::error::{ActionError, SetupError};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

const MIN_ROUTE_LENGTH: u8 = 1;
const MAX_ROUTE_LENGTH: u8 = 6;

/// A route, as described by the map data handed to the engine.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteData {
    pub start: City,
    pub end: City,
    /// `wild` denotes a neutral route, which can be paid with any single color.
    pub color: TrainColor,
    pub length: u8,
}

/// The static description of a board: its cities, and the routes connecting them.
///
/// Loading it (from a file, a database...) is up to the caller.
///
/// # JSON
/// ```json
/// {
///   "cities": ["New York", "Chicago"],
///   "routes": [{"start": "New York", "end": "Chicago", "color": "blue", "length": 3}]
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MapData {
    pub cities: Vec<City>,
    pub routes: Vec<RouteData>,
}

impl MapData {
    /// Decodes map data from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        serde_json::from_str(json).map_err(|e| SetupError::MalformedMapData(e.to_string()))
    }
}

/// A route connecting two cities. Routes are undirected.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    route: CityToCity,
    /// The color of this specific route.
    /// The `Wild` color means that any color matches.
    train_color: TrainColor,
    /// The distance between two cities. This is analogous to the number of train cards needed to claim the route.
    length: u8,
    /// By whom this route is claimed, if any. Once set, it never changes.
    claimer: Option<usize>,
}

impl Route {
    /// Returns a `Route` with the given color and length.
    /// By default, a route is not claimed.
    fn new(route: CityToCity, train_color: TrainColor, length: u8) -> Self {
        Self {
            route,
            train_color,
            length,
            claimer: None,
        }
    }

    #[inline]
    pub fn cities(&self) -> &CityToCity {
        &self.route
    }

    #[inline]
    pub fn train_color(&self) -> TrainColor {
        self.train_color
    }

    #[inline]
    pub fn length(&self) -> u8 {
        self.length
    }

    /// The player ID claiming this route, if any.
    #[inline]
    pub fn claimer(&self) -> Option<usize> {
        self.claimer
    }

    fn connects(&self, start: &str, end: &str) -> bool {
        let (a, b) = &self.route;
        (a.name() == start && b.name() == end) || (a.name() == end && b.name() == start)
    }
}

/// Holds the information about a route successfully claimed by a player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClaimedRoute {
    pub route: CityToCity,
    pub length: u8,
    /// The ordinary color used to pay for the route.
    pub train_color: TrainColor,
    /// How many of the `length` cards were wild cards.
    pub num_wild_cards: u8,
    pub points: u16,
}

impl fmt::Display for ClaimedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_non_wild_cards = self.length - self.num_wild_cards;
        let cards_used_description = match (self.num_wild_cards, num_non_wild_cards) {
            (0, num_non_wild_cards) => format!("{} {} cards", num_non_wild_cards, self.train_color),
            (num_wild_cards, 0) => format!("{} wild cards", num_wild_cards),
            (num_wild_cards, num_non_wild_cards) => format!(
                "{} wild cards and {} {} cards",
                num_wild_cards, num_non_wild_cards, self.train_color
            ),
        };

        let (start, end) = &self.route;
        write!(
            f,
            "the route between {} and {} of length {} ({} points), using {}",
            start, end, self.length, self.points, cards_used_description
        )
    }
}

/// The authoritative state of the board, per game.
/// This can be mutated as players claim routes throughout the game.
#[derive(Debug)]
pub struct Map {
    cities: Vec<City>,
    routes: Vec<Route>,
}

impl Map {
    /// Builds a `Map` from the given map data, after validating it.
    ///
    /// Returns an `Err` if a city is listed twice, if there is no route, or if any route references an
    /// unknown city, connects a city to itself, duplicates another route, or has a length outside of 1 to 6.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_rules::map::{Map, MapData};
    ///
    /// let map_data = MapData::from_json(r#"{
    ///     "cities": ["New York", "Chicago"],
    ///     "routes": [{"start": "New York", "end": "Chicago", "color": "blue", "length": 3}]
    /// }"#).unwrap();
    ///
    /// let map = Map::new(map_data).unwrap();
    /// assert!(map.find_route("Chicago", "New York").is_some());
    /// assert!(map.find_route("Chicago", "Miami").is_none());
    /// ```
    pub fn new(map_data: MapData) -> Result<Self, SetupError> {
        let mut known_cities = HashSet::with_capacity(map_data.cities.len());
        for city in &map_data.cities {
            if !known_cities.insert(city) {
                return Err(SetupError::DuplicateCity(city.clone()));
            }
        }

        if map_data.routes.is_empty() {
            return Err(SetupError::NoRoutes);
        }

        let mut connected_cities = HashSet::with_capacity(map_data.routes.len());
        let mut routes = Vec::with_capacity(map_data.routes.len());

        for RouteData {
            start,
            end,
            color,
            length,
        } in map_data.routes
        {
            for city in [&start, &end] {
                if !known_cities.contains(city) {
                    return Err(SetupError::UnknownCity {
                        city: city.clone(),
                        start: start.clone(),
                        end: end.clone(),
                    });
                }
            }

            if start == end {
                return Err(SetupError::LoopRoute(start));
            }

            if !(MIN_ROUTE_LENGTH..=MAX_ROUTE_LENGTH).contains(&length) {
                return Err(SetupError::InvalidRouteLength { start, end, length });
            }

            // Routes are undirected, so (A, B) and (B, A) denote the same pair.
            let pair = if start < end {
                (start.clone(), end.clone())
            } else {
                (end.clone(), start.clone())
            };
            if !connected_cities.insert(pair) {
                return Err(SetupError::DuplicateRoute(start, end));
            }

            routes.push(Route::new((start, end), color, length));
        }

        Ok(Self {
            cities: map_data.cities,
            routes,
        })
    }

    /// Looks up the route between two cities, in either direction.
    #[inline]
    pub fn find_route(&self, start: &str, end: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.connects(start, end))
    }

    /// Verifies that the route between two cities exists, and is not claimed yet.
    ///
    /// Returns the index of the route, to be passed to [`Map::claim_route_for_player`].
    pub fn can_route_be_claimed(&self, start: &str, end: &str) -> Result<usize, ActionError> {
        let route_index = self
            .routes
            .iter()
            .position(|route| route.connects(start, end))
            .ok_or_else(|| ActionError::RouteNotFound(String::from(start), String::from(end)))?;

        let route = &self.routes[route_index];
        if route.claimer().is_some() {
            let (a, b) = route.cities().clone();
            return Err(ActionError::RouteAlreadyClaimed(a, b));
        }

        Ok(route_index)
    }

    /// Marks the route at `route_index` as claimed by `player_id`.
    ///
    /// The caller must have validated the claim with [`Map::can_route_be_claimed`].
    pub(crate) fn claim_route_for_player(&mut self, route_index: usize, player_id: usize) {
        self.routes[route_index].claimer = Some(player_id);
    }

    #[inline]
    pub fn route(&self, route_index: usize) -> &Route {
        &self.routes[route_index]
    }

    #[inline]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[inline]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// How many routes are still up for grabs.
    pub fn num_unclaimed_routes(&self) -> usize {
        self.routes
            .iter()
            .filter(|route| route.claimer().is_none())
            .count()
    }

    /// Whether every route on the board has been claimed, which ends the game.
    #[inline]
    pub fn all_routes_claimed(&self) -> bool {
        self.num_unclaimed_routes() == 0
    }

    /// Points granted for claiming a route of the given length.
    ///
    /// Lengths outside of 1 to 6 cannot come from a valid map, and grant no points.
    pub fn calculate_points_for_claimed_route(length: u8) -> u16 {
        match length {
            1 => 1,
            2 => 2,
            3 => 4,
            4 => 7,
            5 => 10,
            6 => 15,
            _ => 0,
        }
    }
}

/// Small map shared by tests across the crate: four cities, five routes, one of which is neutral.
#[cfg(test)]
const TEST_MAP_JSON: &str = r#"{
    "cities": ["New York", "Chicago", "Los Angeles", "Miami"],
    "routes": [
        {"start": "New York", "end": "Chicago", "color": "blue", "length": 3},
        {"start": "Chicago", "end": "Los Angeles", "color": "yellow", "length": 5},
        {"start": "Los Angeles", "end": "Miami", "color": "green", "length": 6},
        {"start": "New York", "end": "Miami", "color": "red", "length": 4},
        {"start": "Chicago", "end": "Miami", "color": "wild", "length": 4}
    ]
}"#;

#[cfg(test)]
pub(crate) fn test_map_data() -> MapData {
    MapData::from_json(TEST_MAP_JSON).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn route_data(start: &str, end: &str, color: TrainColor, length: u8) -> RouteData {
        RouteData {
            start: City::from(start),
            end: City::from(end),
            color,
            length,
        }
    }

    fn two_city_map_data(routes: Vec<RouteData>) -> MapData {
        MapData {
            cities: vec![City::from("Atlanta"), City::from("Miami")],
            routes,
        }
    }

    #[test]
    fn map_data_from_json() {
        let map_data = test_map_data();

        assert_eq!(map_data.cities.len(), 4);
        assert_eq!(map_data.routes.len(), 5);
        assert_eq!(
            map_data.routes[4],
            route_data("Chicago", "Miami", TrainColor::Wild, 4)
        );
    }

    #[test]
    fn map_data_from_malformed_json() {
        assert!(matches!(
            MapData::from_json(r#"{"cities": ["A"]}"#),
            Err(SetupError::MalformedMapData(_))
        ));
        assert!(matches!(
            MapData::from_json(
                r#"{"cities": ["A", "B"], "routes": [{"start": "A", "end": "B", "color": "gray", "length": 2}]}"#
            ),
            Err(SetupError::MalformedMapData(_))
        ));
    }

    #[test]
    fn new_map() {
        let map = Map::new(test_map_data()).unwrap();

        assert_eq!(map.cities().len(), 4);
        assert_eq!(map.routes().len(), 5);
        assert_eq!(map.num_unclaimed_routes(), 5);
        assert!(!map.all_routes_claimed());
        assert!(map.routes().iter().all(|route| route.claimer().is_none()));
    }

    #[test]
    fn new_map_duplicate_city() {
        let map_data = MapData {
            cities: vec![City::from("Miami"), City::from("Miami")],
            routes: vec![],
        };

        assert_eq!(
            Map::new(map_data).unwrap_err(),
            SetupError::DuplicateCity(City::from("Miami"))
        );
    }

    #[test]
    fn new_map_no_routes() {
        assert_eq!(
            Map::new(two_city_map_data(vec![])).unwrap_err(),
            SetupError::NoRoutes
        );
    }

    #[test]
    fn new_map_unknown_city() {
        let map_data =
            two_city_map_data(vec![route_data("Atlanta", "Boston", TrainColor::Red, 2)]);

        assert_eq!(
            Map::new(map_data).unwrap_err(),
            SetupError::UnknownCity {
                start: City::from("Atlanta"),
                end: City::from("Boston"),
                city: City::from("Boston"),
            }
        );
    }

    #[test]
    fn new_map_loop_route() {
        let map_data =
            two_city_map_data(vec![route_data("Miami", "Miami", TrainColor::Red, 2)]);

        assert_eq!(
            Map::new(map_data).unwrap_err(),
            SetupError::LoopRoute(City::from("Miami"))
        );
    }

    #[test]
    fn new_map_invalid_route_length() {
        for length in [0, 7] {
            let map_data =
                two_city_map_data(vec![route_data("Atlanta", "Miami", TrainColor::Blue, length)]);

            assert_eq!(
                Map::new(map_data).unwrap_err(),
                SetupError::InvalidRouteLength {
                    start: City::from("Atlanta"),
                    end: City::from("Miami"),
                    length
                }
            );
        }
    }

    #[test]
    fn new_map_duplicate_route_in_opposite_direction() {
        let map_data = two_city_map_data(vec![
            route_data("Atlanta", "Miami", TrainColor::Blue, 5),
            route_data("Miami", "Atlanta", TrainColor::Red, 5),
        ]);

        assert_eq!(
            Map::new(map_data).unwrap_err(),
            SetupError::DuplicateRoute(City::from("Miami"), City::from("Atlanta"))
        );
    }

    #[test]
    fn find_route_is_undirected() {
        let map = Map::new(test_map_data()).unwrap();

        let route = map.find_route("Chicago", "New York").unwrap();
        assert_eq!(
            route.cities(),
            &(City::from("New York"), City::from("Chicago"))
        );
        assert_eq!(route.train_color(), TrainColor::Blue);
        assert_eq!(route.length(), 3);
        assert_eq!(map.find_route("New York", "Chicago"), Some(route));
    }

    #[test]
    fn find_route_between_non_adjacent_cities() {
        let map = Map::new(test_map_data()).unwrap();

        assert!(map.find_route("New York", "Los Angeles").is_none());
        assert!(map.find_route("New York", "Boston").is_none());
    }

    #[test]
    fn claim_route_for_player() {
        let mut map = Map::new(test_map_data()).unwrap();

        let route_index = map.can_route_be_claimed("Miami", "Chicago").unwrap();
        map.claim_route_for_player(route_index, 1);

        assert_eq!(map.route(route_index).claimer(), Some(1));
        assert_eq!(map.find_route("Chicago", "Miami").unwrap().claimer(), Some(1));
        assert_eq!(map.num_unclaimed_routes(), 4);

        assert_eq!(
            map.can_route_be_claimed("Chicago", "Miami"),
            Err(ActionError::RouteAlreadyClaimed(
                City::from("Chicago"),
                City::from("Miami")
            ))
        );
    }

    #[test]
    fn claim_non_existent_route() {
        let map = Map::new(test_map_data()).unwrap();

        assert_eq!(
            map.can_route_be_claimed("Los Angeles", "New York"),
            Err(ActionError::RouteNotFound(
                String::from("Los Angeles"),
                String::from("New York")
            ))
        );
    }

    #[test]
    fn all_routes_claimed() {
        let mut map = Map::new(test_map_data()).unwrap();

        for route_index in 0..map.routes().len() {
            assert!(!map.all_routes_claimed());
            map.claim_route_for_player(route_index, route_index % 2);
        }

        assert!(map.all_routes_claimed());
        assert_eq!(map.num_unclaimed_routes(), 0);
    }

    #[test]
    fn points_for_claimed_route() {
        let expected_points = [(1, 1), (2, 2), (3, 4), (4, 7), (5, 10), (6, 15)];
        for (length, points) in expected_points {
            assert_eq!(Map::calculate_points_for_claimed_route(length), points);
        }

        assert_eq!(Map::calculate_points_for_claimed_route(0), 0);
        assert_eq!(Map::calculate_points_for_claimed_route(7), 0);
    }

    #[test]
    fn route_to_json() -> serde_json::Result<()> {
        let mut map = Map::new(test_map_data()).unwrap();
        map.claim_route_for_player(0, 1);

        assert_eq!(
            serde_json::to_string(map.route(0))?,
            r#"{"route":["New York","Chicago"],"train_color":"blue","length":3,"claimer":1}"#
        );
        assert_eq!(
            serde_json::to_string(map.route(4))?,
            r#"{"route":["Chicago","Miami"],"train_color":"wild","length":4,"claimer":null}"#
        );

        Ok(())
    }

    #[test]
    fn claimed_route_description() {
        let mut claimed_route = ClaimedRoute {
            route: (City::from("Chicago"), City::from("Pittsburgh")),
            length: 3,
            train_color: TrainColor::Black,
            num_wild_cards: 1,
            points: 4,
        };
        assert_eq!(
            claimed_route.to_string(),
            "the route between Chicago and Pittsburgh of length 3 (4 points), using 1 wild cards and 2 black cards"
        );

        claimed_route.num_wild_cards = 0;
        assert_eq!(
            claimed_route.to_string(),
            "the route between Chicago and Pittsburgh of length 3 (4 points), using 3 black cards"
        );

        claimed_route.num_wild_cards = 3;
        assert_eq!(
            claimed_route.to_string(),
            "the route between Chicago and Pittsburgh of length 3 (4 points), using 3 wild cards"
        );
    }
}
