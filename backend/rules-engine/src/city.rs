use serde::{Deserialize, Serialize};
use std::fmt;

/// A named node of the map.
///
/// Cities carry no data besides their name: equality and lookups are by name.
///
/// # JSON
/// Cities are serialized as their name.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct City(String);

impl City {
    /// Access the city's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for City {
    fn from(name: &str) -> Self {
        Self(String::from(name))
    }
}

impl From<String> for City {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Top-level representation of a connection between two cities.
pub type CityToCity = (City, City);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_to_string() {
        assert_eq!(City::from("Los Angeles").to_string(), "Los Angeles");
        assert_eq!(City::from(String::from("Miami")).name(), "Miami");
    }

    #[test]
    fn city_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&City::from("New York"))?,
            r#""New York""#
        );

        Ok(())
    }

    #[test]
    fn json_to_city() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<City>(r#""Chicago""#)?,
            City::from("Chicago")
        );

        Ok(())
    }

    #[test]
    fn invalid_json_to_city() {
        assert!(serde_json::from_str::<City>("36").is_err());
    }
}
