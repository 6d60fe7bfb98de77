use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::mpsc;

use crate::geodesy::distance_meters;

/// A "part" of a location
pub type LocationComponent = f64;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside of -90..=90 degrees")]
    LatitudeOutOfRange(LocationComponent),
    #[error("longitude {0} is outside of -180..=180 degrees")]
    LongitudeOutOfRange(LocationComponent),
    #[error("coordinate components must be finite numbers")]
    NotFinite,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, specta::Type)]
/// Some point in the world as gotten from a Geolocation API, in decimal degrees.
/// Always within range, construct with [Coordinate::new].
pub struct Coordinate {
    lat: LocationComponent,
    long: LocationComponent,
}

impl Coordinate {
    pub fn new(lat: LocationComponent, long: LocationComponent) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !long.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&long) {
            return Err(CoordinateError::LongitudeOutOfRange(long));
        }
        Ok(Self { lat, long })
    }

    pub fn lat(&self) -> LocationComponent {
        self.lat
    }

    pub fn long(&self) -> LocationComponent {
        self.long
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.long)
    }
}

impl TryFrom<(LocationComponent, LocationComponent)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((lat, long): (LocationComponent, LocationComponent)) -> Result<Self, Self::Error> {
        Self::new(lat, long)
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: LocationComponent,
    long: LocationComponent,
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCoordinate::deserialize(deserializer)?;
        Self::new(raw.lat, raw.long).map_err(serde::de::Error::custom)
    }
}

/// Fixes closer than this to the last forwarded one are dropped
pub const MIN_FIX_DISTANCE_METERS: f64 = 1.0;

/// Drops fixes that barely moved from the last one passed on to the hunt. Only
/// [FixFilter::mark_forwarded] moves the reference point, so a fix that failed to send is
/// compared against the same point again next time.
#[derive(Debug, Clone)]
pub struct FixFilter {
    min_distance_meters: f64,
    last: Option<Coordinate>,
}

impl FixFilter {
    pub fn new(min_distance_meters: f64) -> Self {
        Self {
            min_distance_meters,
            last: None,
        }
    }

    pub fn accepts(&self, fix: Coordinate) -> bool {
        self.last
            .is_none_or(|last| distance_meters(last, fix) >= self.min_distance_meters)
    }

    pub fn mark_forwarded(&mut self, fix: Coordinate) {
        self.last = Some(fix);
    }
}

impl Default for FixFilter {
    fn default() -> Self {
        Self::new(MIN_FIX_DISTANCE_METERS)
    }
}

/// Source of position fixes for a hunt, usually backed by the device's GPS.
pub trait LocationService: Send {
    /// Ask for permission to read the location, called once before any fixes are requested.
    /// Returning `false` ends the hunt, it is not retried.
    fn request_access(&mut self) -> impl Future<Output = bool> + Send {
        async { true }
    }

    /// Wait for the next fix. Earlier fixes are not kept around, returns [None] once the
    /// source has shut down.
    fn next_fix(&mut self) -> impl Future<Output = Option<Coordinate>> + Send;
}

impl LocationService for mpsc::Receiver<Coordinate> {
    async fn next_fix(&mut self) -> Option<Coordinate> {
        self.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.01),
            Err(CoordinateError::LongitudeOutOfRange(-180.01))
        );
        assert_eq!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NotFinite)
        );
        assert_eq!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordinateError::NotFinite)
        );
    }

    #[test]
    fn accepts_edges() {
        let c = Coordinate::new(-90.0, 180.0).expect("Edge should be valid");
        assert_eq!(c.lat(), -90.0);
        assert_eq!(c.long(), 180.0);
    }

    #[test]
    fn deserialize_validates() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"lat": -23.11443, "long": -45.7078}"#).expect("Valid");
        assert_eq!(ok, Coordinate::new(-23.11443, -45.7078).unwrap());

        let bad = serde_json::from_str::<Coordinate>(r#"{"lat": 123.0, "long": 0.0}"#);
        assert!(bad.is_err(), "Out of range latitude was accepted");
    }

    #[test]
    fn display_wraps_once() {
        let c = Coordinate::new(1.0, -2.5).unwrap();
        assert_eq!(c.to_string(), "(1.000000, -2.500000)");
    }

    fn origin() -> Coordinate {
        Coordinate::new(-23.11443, -45.7078).unwrap()
    }

    fn north_by(degrees: f64) -> Coordinate {
        Coordinate::new(origin().lat() + degrees, origin().long()).unwrap()
    }

    #[test]
    fn filter_takes_first_fix() {
        let filter = FixFilter::default();
        assert!(filter.accepts(origin()));
    }

    #[test]
    fn filter_drops_small_moves() {
        let mut filter = FixFilter::default();
        filter.mark_forwarded(origin());

        assert!(!filter.accepts(origin()), "Same fix passed");
        assert!(!filter.accepts(north_by(0.000005)), "Half meter move passed");
        assert!(filter.accepts(north_by(0.00001)), "~1.1m move was dropped");
    }

    #[test]
    fn filter_boundary_is_inclusive() {
        let moved = north_by(0.000009);
        let exact = distance_meters(origin(), moved);

        let mut filter = FixFilter::new(exact);
        filter.mark_forwarded(origin());
        assert!(filter.accepts(moved), "Move of exactly the minimum was dropped");

        let mut filter = FixFilter::new(exact + 1e-6);
        filter.mark_forwarded(origin());
        assert!(!filter.accepts(moved));
    }

    #[test]
    fn failed_send_does_not_move_reference() {
        let mut filter = FixFilter::default();
        filter.mark_forwarded(origin());

        let far = north_by(0.00002);
        // Accepted, but the send failed so it is never marked
        assert!(filter.accepts(far));

        // Retrying the same fix still compares against the old reference
        assert!(filter.accepts(far));
        // And a fix right next to the unsent one is still judged from the old reference
        assert!(filter.accepts(north_by(0.000021)));

        filter.mark_forwarded(far);
        assert!(!filter.accepts(north_by(0.000021)));
    }

    #[tokio::test]
    async fn channel_is_a_location_service() {
        let (tx, mut rx) = mpsc::channel(2);
        let fix = Coordinate::new(1.0, 2.0).unwrap();
        tx.send(fix).await.unwrap();
        drop(tx);

        assert!(rx.request_access().await);
        assert_eq!(rx.next_fix().await, Some(fix));
        assert_eq!(rx.next_fix().await, None);
    }
}
