//! Location resolution: geocoding, nearby facilities, map rendering.

pub mod client;
pub mod map;

pub use client::{Coordinates, GeoClient, GeoProvider, MockGeoProvider, Place};
pub use map::{render_map, write_map};

use crate::error::Result;

/// Resolved assistance data for one extracted location.
#[derive(Debug, Clone, PartialEq)]
pub struct Assistance {
    pub origin: Coordinates,
    pub places: Vec<Place>,
}

/// Resolve a free-text location into an origin plus nearby facilities.
///
/// Two sequential external calls, no retry: forward geocoding (first result
/// only), then a nearby search with the fixed radius and category. Returns
/// `None` when the location cannot be geocoded — a normal "not found", not an
/// error. HTTP failures from either call propagate.
pub async fn resolve_assistance(
    provider: &dyn GeoProvider,
    location: &str,
    category: &str,
) -> Result<Option<Assistance>> {
    let origin = match provider.geocode(location).await? {
        Some(coordinates) => coordinates,
        None => return Ok(None),
    };

    let places = provider
        .nearby_search(origin.lat, origin.lon, category)
        .await?;

    Ok(Some(Assistance { origin, places }))
}
