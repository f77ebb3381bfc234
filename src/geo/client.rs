//! HTTP client for the external mapping service.
//!
//! Two endpoints, Google-style JSON: forward geocoding and nearby place
//! search. One API key serves both; it comes from configuration and is never
//! built into the binary. Requests carry a bounded timeout. Network/HTTP
//! failures surface as typed errors; empty result sets do not.

use crate::config::MapsConfig;
use crate::defaults;
use crate::error::{Result, HelplineError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One nearby facility, in the service's own ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    /// Street address, when the service reports one.
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

// Wire types for the service's JSON bodies.

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: WireLatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub results: Vec<PlaceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceEntry {
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    pub geometry: Geometry,
}

/// First geocode result as coordinates; later results are discarded.
pub fn first_coordinates(response: &GeocodeResponse) -> Option<Coordinates> {
    response.results.first().map(|r| Coordinates {
        lat: r.geometry.location.lat,
        lon: r.geometry.location.lng,
    })
}

/// Convert and truncate a places response to the top entries, preserving the
/// service's order.
pub fn top_places(response: PlacesResponse) -> Vec<Place> {
    response
        .results
        .into_iter()
        .take(defaults::MAX_NEARBY_RESULTS)
        .map(|entry| Place {
            name: entry.name,
            address: entry.vicinity,
            lat: entry.geometry.location.lat,
            lon: entry.geometry.location.lng,
        })
        .collect()
}

/// Trait for the external mapping service.
///
/// This trait allows swapping implementations (real HTTP client vs mock).
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Forward-geocode a free-text location. `None` means not found.
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>>;

    /// Nearby facilities of `category` around a point, at most
    /// [`defaults::MAX_NEARBY_RESULTS`] entries.
    async fn nearby_search(&self, lat: f64, lon: f64, category: &str) -> Result<Vec<Place>>;
}

/// Reqwest-backed mapping service client.
#[derive(Debug, Clone)]
pub struct GeoClient {
    http: reqwest::Client,
    api_key: String,
    geocode_url: String,
    nearby_url: String,
}

impl GeoClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns `HelplineError::MissingApiKey` when no API key is configured.
    pub fn new(config: &MapsConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(HelplineError::MissingApiKey)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key,
            geocode_url: config.geocode_url.clone(),
            nearby_url: config.nearby_url.clone(),
        })
    }
}

#[async_trait]
impl GeoProvider for GeoClient {
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>> {
        let response = self
            .http
            .get(&self.geocode_url)
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HelplineError::Geocoding {
                message: format!("status {}", response.status()),
            });
        }

        let body: GeocodeResponse = response.json().await?;
        Ok(first_coordinates(&body))
    }

    async fn nearby_search(&self, lat: f64, lon: f64, category: &str) -> Result<Vec<Place>> {
        let location = format!("{},{}", lat, lon);
        let radius = defaults::NEARBY_RADIUS_M.to_string();
        let response = self
            .http
            .get(&self.nearby_url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", category),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HelplineError::NearbySearch {
                message: format!("status {}", response.status()),
            });
        }

        let body: PlacesResponse = response.json().await?;
        Ok(top_places(body))
    }
}

/// Mock mapping service for testing
#[derive(Debug, Clone, Default)]
pub struct MockGeoProvider {
    coordinates: Vec<(String, Coordinates)>,
    places: Vec<Place>,
    should_fail: bool,
}

impl MockGeoProvider {
    /// Create a mock that knows no locations and no places
    pub fn new() -> Self {
        Self::default()
    }

    /// Register coordinates for a location string
    pub fn with_coordinates(mut self, location: &str, lat: f64, lon: f64) -> Self {
        self.coordinates
            .push((location.to_string(), Coordinates { lat, lon }));
        self
    }

    /// Add a place returned (in call order) by nearby_search
    pub fn with_place(mut self, name: &str, address: Option<&str>, lat: f64, lon: f64) -> Self {
        self.places.push(Place {
            name: name.to_string(),
            address: address.map(|s| s.to_string()),
            lat,
            lon,
        });
        self
    }

    /// Configure the mock to fail every call
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait]
impl GeoProvider for MockGeoProvider {
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>> {
        if self.should_fail {
            return Err(HelplineError::Geocoding {
                message: "mock geocoding failure".to_string(),
            });
        }
        Ok(self
            .coordinates
            .iter()
            .find(|(known, _)| known == location)
            .map(|(_, coordinates)| *coordinates))
    }

    async fn nearby_search(&self, _lat: f64, _lon: f64, _category: &str) -> Result<Vec<Place>> {
        if self.should_fail {
            return Err(HelplineError::NearbySearch {
                message: "mock nearby search failure".to_string(),
            });
        }
        Ok(self
            .places
            .iter()
            .take(defaults::MAX_NEARBY_RESULTS)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocode_body(entries: &[(f64, f64)]) -> GeocodeResponse {
        let results = entries
            .iter()
            .map(|&(lat, lng)| GeocodeResult {
                geometry: Geometry {
                    location: WireLatLng { lat, lng },
                },
            })
            .collect();
        GeocodeResponse { results }
    }

    #[test]
    fn first_coordinates_takes_only_the_first_result() {
        let body = geocode_body(&[(39.78, -89.65), (37.2, -93.3)]);
        let coordinates = first_coordinates(&body).unwrap();
        assert_eq!(coordinates.lat, 39.78);
        assert_eq!(coordinates.lon, -89.65);
    }

    #[test]
    fn first_coordinates_empty_results_is_none() {
        let body = geocode_body(&[]);
        assert!(first_coordinates(&body).is_none());
    }

    #[test]
    fn geocode_response_parses_service_json() {
        let json = r#"{
            "results": [
                {"geometry": {"location": {"lat": 39.78, "lng": -89.65}}}
            ]
        }"#;
        let body: GeocodeResponse = serde_json::from_str(json).unwrap();
        let coordinates = first_coordinates(&body).unwrap();
        assert_eq!(coordinates.lat, 39.78);
        assert_eq!(coordinates.lon, -89.65);
    }

    #[test]
    fn geocode_response_tolerates_missing_results_key() {
        let body: GeocodeResponse = serde_json::from_str("{}").unwrap();
        assert!(body.results.is_empty());
    }

    #[test]
    fn top_places_truncates_to_three_in_upstream_order() {
        let json = r#"{
            "results": [
                {"name": "A", "vicinity": "1 First St", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}},
                {"name": "B", "geometry": {"location": {"lat": 3.0, "lng": 4.0}}},
                {"name": "C", "vicinity": "3 Third St", "geometry": {"location": {"lat": 5.0, "lng": 6.0}}},
                {"name": "D", "vicinity": "4 Fourth St", "geometry": {"location": {"lat": 7.0, "lng": 8.0}}},
                {"name": "E", "vicinity": "5 Fifth St", "geometry": {"location": {"lat": 9.0, "lng": 10.0}}}
            ]
        }"#;
        let body: PlacesResponse = serde_json::from_str(json).unwrap();

        let places = top_places(body);

        assert_eq!(places.len(), 3);
        assert_eq!(places[0].name, "A");
        assert_eq!(places[1].name, "B");
        assert_eq!(places[2].name, "C");
        assert_eq!(places[0].address.as_deref(), Some("1 First St"));
        assert_eq!(places[1].address, None);
    }

    #[test]
    fn top_places_keeps_fewer_than_cap() {
        let json = r#"{"results": [
            {"name": "Only", "geometry": {"location": {"lat": 1.5, "lng": 2.5}}}
        ]}"#;
        let body: PlacesResponse = serde_json::from_str(json).unwrap();
        let places = top_places(body);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].lat, 1.5);
        assert_eq!(places[0].lon, 2.5);
    }

    #[test]
    fn client_requires_api_key() {
        let config = MapsConfig::default();
        let result = GeoClient::new(&config);
        assert!(matches!(result, Err(HelplineError::MissingApiKey)));
    }

    #[test]
    fn client_rejects_empty_api_key() {
        let config = MapsConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            GeoClient::new(&config),
            Err(HelplineError::MissingApiKey)
        ));
    }

    #[test]
    fn client_builds_with_api_key() {
        let config = MapsConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(GeoClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn mock_provider_caps_places_at_three() {
        let provider = MockGeoProvider::new()
            .with_place("A", None, 1.0, 1.0)
            .with_place("B", None, 2.0, 2.0)
            .with_place("C", None, 3.0, 3.0)
            .with_place("D", None, 4.0, 4.0);

        let places = provider.nearby_search(0.0, 0.0, "hospital").await.unwrap();
        assert_eq!(places.len(), 3);
    }
}
