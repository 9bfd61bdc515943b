//! Data models for tracked facilities

use serde::{Deserialize, Serialize};
use weather_gateway::{CurrentWeather, GeocodedPlace};

/// Comfort default applied to new facilities and used when no outdoor
/// reading is available, degrees Celsius
pub const DEFAULT_TARGET_TEMPERATURE: f64 = 22.0;

/// Where a facility sits. Immutable after creation; there is no
/// "move facility" operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    /// Empty for non-US locations
    #[serde(default)]
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A tracked site paired with its latest weather snapshot and a
/// user-settable target temperature
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Unique identifier, assigned at creation
    pub id: String,
    /// Display name, derived from the resolved city
    pub name: String,
    pub location: Location,
    /// Degrees Celsius, mutable via user action or policy sweeps
    pub target_temperature: f64,
    /// Latest fetched snapshot, or None if not yet fetched/unavailable.
    /// Fully replaced on refresh, never partially merged.
    #[serde(default)]
    pub weather: Option<CurrentWeather>,
}

impl Facility {
    /// Build a facility from a geocoding match and its initial weather.
    ///
    /// The state falls back to the caller-supplied code (then empty) when
    /// the geocoder returns none.
    pub fn from_place(
        place: &GeocodedPlace,
        state_code: Option<&str>,
        weather: CurrentWeather,
    ) -> Self {
        let state = place
            .state
            .clone()
            .or_else(|| state_code.map(str::to_string))
            .unwrap_or_default();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("{} Facility", place.name),
            location: Location {
                city: place.name.clone(),
                state,
                latitude: place.lat,
                longitude: place.lon,
            },
            target_temperature: DEFAULT_TARGET_TEMPERATURE,
            weather: Some(weather),
        }
    }

    /// Uniqueness check: city compared case-insensitively, state exactly
    pub fn is_same_place(&self, city: &str, state: &str) -> bool {
        self.location.city.eq_ignore_ascii_case(city) && self.location.state == state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, state: Option<&str>) -> GeocodedPlace {
        GeocodedPlace {
            name: name.to_string(),
            lat: 41.0,
            lon: -87.0,
            country: "US".to_string(),
            state: state.map(str::to_string),
        }
    }

    #[test]
    fn from_place_uses_geocoder_state_over_requested_code() {
        let facility = Facility::from_place(
            &place("Chicago", Some("Illinois")),
            Some("IL"),
            CurrentWeather::default(),
        );

        assert_eq!(facility.name, "Chicago Facility");
        assert_eq!(facility.location.state, "Illinois");
        assert_eq!(facility.target_temperature, DEFAULT_TARGET_TEMPERATURE);
    }

    #[test]
    fn from_place_falls_back_to_requested_state_then_empty() {
        let with_code =
            Facility::from_place(&place("Chicago", None), Some("IL"), CurrentWeather::default());
        assert_eq!(with_code.location.state, "IL");

        let bare = Facility::from_place(&place("Reykjavik", None), None, CurrentWeather::default());
        assert_eq!(bare.location.state, "");
    }

    #[test]
    fn same_place_ignores_city_case_but_not_state() {
        let facility =
            Facility::from_place(&place("Chicago", Some("IL")), None, CurrentWeather::default());

        assert!(facility.is_same_place("chicago", "IL"));
        assert!(facility.is_same_place("CHICAGO", "IL"));
        assert!(!facility.is_same_place("Chicago", "WI"));
    }
}
