//! Geolocation capability at its interface boundary.
//!
//! The map itself has no idea where the user is; something external either produces a fix or
//! declares itself unavailable, and unavailability must degrade into a notice, never an error
//! path out of the app.

use meridian::{Position, lat_lon};

pub trait LocationSource {
    /// A position fix, or `None` when the capability is unavailable or denied.
    fn locate(&self) -> Option<Position>;
}

/// Environment variable consulted by [`EnvLocation`], holding `"lat, lon"`.
pub const LOCATION_VAR: &str = "MERIDIAN_LOCATION";

/// Reads the fix from the environment. Desktop machines rarely carry a real positioning device,
/// so the variable stands in for one; unset means unavailable, like a denied permission would.
#[derive(Default)]
pub struct EnvLocation;

impl LocationSource for EnvLocation {
    fn locate(&self) -> Option<Position> {
        parse_coordinate(&std::env::var(LOCATION_VAR).ok()?)
    }
}

/// Parse a `"lat, lon"` pair, rejecting values outside the valid ranges.
pub(crate) fn parse_coordinate(value: &str) -> Option<Position> {
    let (lat, lon) = value.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;

    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
        .then(|| lat_lon(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_coordinates() {
        assert_eq!(Some(lat_lon(40.7128, -74.006)), parse_coordinate("40.7128, -74.0060"));
        assert_eq!(Some(lat_lon(-33.9, 151.2)), parse_coordinate("-33.9,151.2"));

        assert_eq!(None, parse_coordinate(""));
        assert_eq!(None, parse_coordinate("40.7128"));
        assert_eq!(None, parse_coordinate("ninety,0"));
        assert_eq!(None, parse_coordinate("91, 0"));
        assert_eq!(None, parse_coordinate("0, 181"));
    }
}
