//! Interactive map rendering.
//!
//! Generates a self-contained Leaflet HTML document: one blue marker at the
//! caller origin and one red marker per nearby facility, each facility popup
//! carrying a precomputed driving-directions deep link.

use crate::geo::client::{Coordinates, Place};
use crate::error::Result;
use std::path::Path;

/// Icon URLs for the two-color marker scheme.
const BLUE_MARKER_URL: &str =
    "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-blue.png";
const RED_MARKER_URL: &str =
    "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-red.png";

/// Initial zoom level around the caller origin.
const ZOOM_LEVEL: u8 = 13;

/// Build the driving-directions deep link from origin to destination.
pub fn directions_url(origin: Coordinates, dest_lat: f64, dest_lon: f64) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode=driving",
        origin.lat, origin.lon, dest_lat, dest_lon
    )
}

/// Minimal HTML escaping for text interpolated into popups.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the assistance map as a standalone HTML document.
///
/// Exactly one origin marker plus one marker per place; places render in the
/// order given (the service's own ranking).
pub fn render_map(origin: Coordinates, places: &[Place]) -> String {
    let mut markers = String::new();

    markers.push_str(&format!(
        "L.marker([{}, {}], {{icon: originIcon}}).addTo(map)\
         .bindPopup(\"Caller location\");\n",
        origin.lat, origin.lon
    ));

    for place in places {
        let name = escape_html(&place.name);
        let address = escape_html(place.address.as_deref().unwrap_or("Address not available"));
        let directions = directions_url(origin, place.lat, place.lon);
        markers.push_str(&format!(
            "L.marker([{lat}, {lon}], {{icon: facilityIcon}}).addTo(map)\
             .bindPopup(\"<b>{name}</b><br>{address}<br>\
             <a href='{directions}' target='_blank'>Get Directions</a>\");\n",
            lat = place.lat,
            lon = place.lon,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Helpline Assistance Map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{lat}, {lon}], {zoom});
L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
var originIcon = L.icon({{iconUrl: '{blue}', iconSize: [25, 41], iconAnchor: [12, 41]}});
var facilityIcon = L.icon({{iconUrl: '{red}', iconSize: [25, 41], iconAnchor: [12, 41]}});
{markers}</script>
</body>
</html>
"#,
        lat = origin.lat,
        lon = origin.lon,
        zoom = ZOOM_LEVEL,
        blue = BLUE_MARKER_URL,
        red = RED_MARKER_URL,
        markers = markers,
    )
}

/// Write the rendered document to `path`, overwriting any previous map.
pub fn write_map(html: &str, path: &Path) -> Result<()> {
    std::fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, address: Option<&str>, lat: f64, lon: f64) -> Place {
        Place {
            name: name.to_string(),
            address: address.map(|s| s.to_string()),
            lat,
            lon,
        }
    }

    fn origin() -> Coordinates {
        Coordinates {
            lat: 39.78,
            lon: -89.65,
        }
    }

    #[test]
    fn map_has_exactly_one_origin_marker() {
        let html = render_map(origin(), &[place("Hospital", None, 39.79, -89.66)]);
        assert_eq!(html.matches("originIcon}").count(), 1);
        assert!(html.contains("Caller location"));
    }

    #[test]
    fn map_has_one_marker_per_place() {
        let places = vec![
            place("A", None, 1.0, 2.0),
            place("B", None, 3.0, 4.0),
            place("C", None, 5.0, 6.0),
        ];
        let html = render_map(origin(), &places);
        assert_eq!(html.matches("facilityIcon}").count(), 3);
    }

    #[test]
    fn popups_contain_directions_to_facility_coordinates() {
        let places = vec![place("Memorial", Some("701 N 1st St"), 39.79, -89.66)];
        let html = render_map(origin(), &places);

        assert!(html.contains("destination=39.79,-89.66"));
        assert!(html.contains("origin=39.78,-89.65"));
        assert!(html.contains("travelmode=driving"));
        assert!(html.contains("<b>Memorial</b>"));
        assert!(html.contains("701 N 1st St"));
    }

    #[test]
    fn missing_address_renders_placeholder() {
        let html = render_map(origin(), &[place("Clinic", None, 1.0, 1.0)]);
        assert!(html.contains("Address not available"));
    }

    #[test]
    fn map_centers_on_origin() {
        let html = render_map(origin(), &[]);
        assert!(html.contains("setView([39.78, -89.65], 13)"));
    }

    #[test]
    fn popup_text_is_escaped() {
        let html = render_map(
            origin(),
            &[place("St. Mary's <ER>", Some("5 \"A\" St"), 1.0, 1.0)],
        );
        assert!(html.contains("St. Mary&#39;s &lt;ER&gt;"));
        assert!(html.contains("5 &quot;A&quot; St"));
        assert!(!html.contains("<ER>"));
    }

    #[test]
    fn directions_url_format() {
        let url = directions_url(origin(), 40.0, -90.0);
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=39.78,-89.65&destination=40,-90&travelmode=driving"
        );
    }

    #[test]
    fn write_map_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");

        write_map("<html>first</html>", &path).unwrap();
        write_map("<html>second</html>", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "<html>second</html>");
    }
}
