//! Map assistance scenario: geocode → nearby search → rendered map.

use helpline::geo::client::{first_coordinates, top_places, GeocodeResponse, PlacesResponse};
use helpline::geo::{render_map, resolve_assistance, Coordinates, MockGeoProvider};

#[test]
fn geocoding_takes_first_result_only() {
    let json = r#"{
        "results": [
            {"geometry": {"location": {"lat": 39.78, "lng": -89.65}}},
            {"geometry": {"location": {"lat": 37.21, "lng": -93.29}}}
        ]
    }"#;
    let body: GeocodeResponse = serde_json::from_str(json).unwrap();

    let coordinates = first_coordinates(&body).unwrap();

    assert_eq!(coordinates.lat, 39.78);
    assert_eq!(coordinates.lon, -89.65);
}

#[test]
fn nearby_search_truncates_upstream_results_to_three() {
    let json = r#"{
        "results": [
            {"name": "Memorial Medical Center", "vicinity": "701 N 1st St", "geometry": {"location": {"lat": 39.79, "lng": -89.66}}},
            {"name": "St. John's Hospital", "vicinity": "800 E Carpenter St", "geometry": {"location": {"lat": 39.81, "lng": -89.64}}},
            {"name": "Springfield Clinic", "vicinity": "1025 S 6th St", "geometry": {"location": {"lat": 39.77, "lng": -89.64}}},
            {"name": "HSHS Medical Group", "vicinity": "3051 Hollis Dr", "geometry": {"location": {"lat": 39.74, "lng": -89.70}}},
            {"name": "Urgent Care West", "geometry": {"location": {"lat": 39.76, "lng": -89.72}}}
        ]
    }"#;
    let body: PlacesResponse = serde_json::from_str(json).unwrap();

    let places = top_places(body);

    assert_eq!(places.len(), 3);
    // Upstream ranking order is preserved, never re-sorted
    assert_eq!(places[0].name, "Memorial Medical Center");
    assert_eq!(places[1].name, "St. John's Hospital");
    assert_eq!(places[2].name, "Springfield Clinic");
}

#[tokio::test]
async fn springfield_scenario_renders_origin_and_facility_markers() {
    let provider = MockGeoProvider::new()
        .with_coordinates("Springfield", 39.78, -89.65)
        .with_place("Memorial Medical Center", Some("701 N 1st St"), 39.79, -89.66)
        .with_place("St. John's Hospital", Some("800 E Carpenter St"), 39.81, -89.64)
        .with_place("Springfield Clinic", Some("1025 S 6th St"), 39.77, -89.64);

    let assistance = resolve_assistance(&provider, "Springfield", "hospital")
        .await
        .unwrap()
        .expect("Springfield should geocode");

    assert_eq!(
        assistance.origin,
        Coordinates {
            lat: 39.78,
            lon: -89.65
        }
    );

    let html = render_map(assistance.origin, &assistance.places);

    // Exactly 1 origin marker + one marker per facility (at most 3)
    assert_eq!(html.matches("originIcon}").count(), 1);
    assert_eq!(html.matches("facilityIcon}").count(), 3);

    // Every popup links driving directions to the facility's own coordinates
    for place in &assistance.places {
        let destination = format!("destination={},{}", place.lat, place.lon);
        assert!(
            html.contains(&destination),
            "directions link should target {}: missing {}",
            place.name,
            destination
        );
    }
    assert!(html.contains("origin=39.78,-89.65"));
    assert!(html.contains("travelmode=driving"));
}

#[tokio::test]
async fn unknown_location_reports_not_found_not_error() {
    let provider = MockGeoProvider::new();

    let result = resolve_assistance(&provider, "Nowhereville", "hospital")
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn empty_nearby_results_are_normal_outcome() {
    let provider = MockGeoProvider::new().with_coordinates("Remote Outpost", 71.0, -8.0);

    let assistance = resolve_assistance(&provider, "Remote Outpost", "hospital")
        .await
        .unwrap()
        .expect("location geocodes");

    assert!(assistance.places.is_empty());

    // Map still renders with just the origin marker
    let html = render_map(assistance.origin, &assistance.places);
    assert_eq!(html.matches("originIcon}").count(), 1);
    assert_eq!(html.matches("facilityIcon}").count(), 0);
}

#[tokio::test]
async fn service_failure_propagates_as_error() {
    let provider = MockGeoProvider::new().with_failure();
    let result = resolve_assistance(&provider, "Springfield", "hospital").await;
    assert!(result.is_err());
}
