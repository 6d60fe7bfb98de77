use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    geodesy::GeodesicResult,
    hunt::UtcDT,
    hunt_events::HuntEvent,
    location::Coordinate,
    proximity::{ColorToken, Proximity},
    settings::{ARRIVAL_STEPS, HuntSettings},
};

pub const AWAITING_FIX_HINT: &str = "Looking for your location...";
pub const PERMISSION_DENIED_HINT: &str = "Permission to access location was denied";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
pub enum SessionStatus {
    /// No fix has come in yet (or never will, see [HuntUiState::permission_denied])
    AwaitingFix,
    /// Have a fix, treasure not found yet
    Searching,
    /// The treasure was found, stays this way for the rest of the session
    Found,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// Everything the UI needs to draw the hunt screen, taken after each update
pub struct HuntUiState {
    pub status: SessionStatus,
    pub target: Coordinate,
    pub steps_to_target: Option<f64>,
    pub distance_meters: Option<f64>,
    /// Rotation for the arrow, 0 is north
    pub bearing_degrees: Option<f64>,
    pub proximity: Option<Proximity>,
    pub hint: String,
    pub color: ColorToken,
    pub found_at: Option<UtcDT>,
    /// Location access was refused, the session will stay in [SessionStatus::AwaitingFix]
    pub permission_denied: bool,
}

/// State of a single hunt, advanced one fix at a time with [HuntSession::update].
#[derive(Debug, Clone)]
pub struct HuntSession {
    settings: HuntSettings,
    current: Option<Coordinate>,
    last_result: Option<GeodesicResult>,
    found_at: Option<UtcDT>,
    permission_denied: bool,
    samples: u32,
}

impl HuntSession {
    pub fn new(settings: HuntSettings) -> Self {
        Self {
            settings,
            current: None,
            last_result: None,
            found_at: None,
            permission_denied: false,
            samples: 0,
        }
    }

    pub fn settings(&self) -> &HuntSettings {
        &self.settings
    }

    pub fn current_location(&self) -> Option<Coordinate> {
        self.current
    }

    pub fn found_at(&self) -> Option<UtcDT> {
        self.found_at
    }

    pub fn is_found(&self) -> bool {
        self.found_at.is_some()
    }

    pub fn permission_denied(&self) -> bool {
        self.permission_denied
    }

    /// Number of fixes that have been applied
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_found() {
            SessionStatus::Found
        } else if self.current.is_some() {
            SessionStatus::Searching
        } else {
            SessionStatus::AwaitingFix
        }
    }

    pub fn steps_to_target(&self) -> Option<f64> {
        self.last_result
            .map(|res| self.settings.steps_for(res.distance_meters))
    }

    /// Record that location access was refused. Terminal, fixes are ignored afterwards.
    pub fn deny_permission(&mut self) {
        self.permission_denied = true;
    }

    /// Apply a new fix. Returns the resulting UI state and, only on the first fix within
    /// [ARRIVAL_STEPS] of the target, an [HuntEvent::Arrived].
    pub fn update(&mut self, fix: Coordinate, now: UtcDT) -> (HuntUiState, Option<HuntEvent>) {
        if self.permission_denied {
            warn!("Got a fix after location permission was denied, ignoring it");
            return (self.as_ui_state(), None);
        }

        let result = GeodesicResult::between(fix, self.settings.target);
        let steps = self.settings.steps_for(result.distance_meters);

        self.current = Some(fix);
        self.last_result = Some(result);
        self.samples = self.samples.saturating_add(1);

        let event = if steps < ARRIVAL_STEPS && self.found_at.is_none() {
            info!("Treasure found at {fix}, {steps:.2} steps from the target");
            self.found_at = Some(now);
            Some(HuntEvent::Arrived {
                location: fix,
                steps,
                at: now,
            })
        } else {
            None
        };

        (self.as_ui_state(), event)
    }

    pub fn as_ui_state(&self) -> HuntUiState {
        let steps = self.steps_to_target();
        let proximity = steps.map(Proximity::classify);

        let hint = match proximity {
            Some(proximity) => proximity.hint(),
            None if self.permission_denied => PERMISSION_DENIED_HINT,
            None => AWAITING_FIX_HINT,
        };

        HuntUiState {
            status: self.status(),
            target: self.settings.target,
            steps_to_target: steps,
            distance_meters: self.last_result.map(|r| r.distance_meters),
            bearing_degrees: self.last_result.map(|r| r.bearing_degrees),
            proximity,
            hint: hint.to_string(),
            color: proximity.map(Proximity::color).unwrap_or(ColorToken::Cool),
            found_at: self.found_at,
            permission_denied: self.permission_denied,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn c(lat: f64, long: f64) -> Coordinate {
        Coordinate::new(lat, long).expect("Invalid test coordinate")
    }

    fn session() -> HuntSession {
        HuntSession::new(HuntSettings::default())
    }

    /// About a third of a meter north of the default target
    fn near_target() -> Coordinate {
        c(-23.114427, -45.70780)
    }

    #[test]
    fn starts_awaiting_fix() {
        let s = session();
        let ui = s.as_ui_state();
        assert_eq!(ui.status, SessionStatus::AwaitingFix);
        assert_eq!(ui.hint, AWAITING_FIX_HINT);
        assert_eq!(ui.color, ColorToken::Cool);
        assert!(ui.steps_to_target.is_none());
        assert!(ui.bearing_degrees.is_none());
        assert!(!ui.permission_denied);
    }

    #[test]
    fn far_fix_is_cold() {
        let mut s = session();
        let (ui, event) = s.update(c(-23.11500, -45.70800), Utc::now());

        assert!(event.is_none());
        assert_eq!(ui.status, SessionStatus::Searching);

        let distance = ui.distance_meters.expect("No distance");
        assert!((65.0..68.0).contains(&distance), "Distance was {distance}");

        let steps = ui.steps_to_target.expect("No steps");
        assert!((81.0..85.0).contains(&steps), "Steps was {steps}");

        assert_eq!(ui.proximity, Some(Proximity::Cold));
        assert_eq!(ui.hint, Proximity::Cold.hint());
        assert_eq!(ui.color, ColorToken::Cool);

        // Target is north-north-east of the observer
        let bearing = ui.bearing_degrees.expect("No bearing");
        assert!((0.0..45.0).contains(&bearing), "Bearing was {bearing}");
    }

    #[test]
    fn arrival_fires_once() {
        let mut s = session();
        let now = Utc::now();

        s.update(c(-23.11500, -45.70800), now);

        let (ui, event) = s.update(near_target(), now);
        assert_eq!(ui.status, SessionStatus::Found);
        assert_eq!(ui.found_at, Some(now));
        assert!(ui.steps_to_target.expect("No steps") < 1.0);
        match event {
            Some(HuntEvent::Arrived { location, steps, at }) => {
                assert_eq!(location, near_target());
                assert!(steps < 1.0);
                assert_eq!(at, now);
            }
            None => panic!("No arrival event"),
        }

        let (ui, event) = s.update(near_target(), now + Duration::seconds(5));
        assert!(event.is_none(), "Arrival fired twice");
        assert_eq!(ui.status, SessionStatus::Found);
        assert_eq!(ui.found_at, Some(now), "Found time moved");
    }

    #[test]
    fn found_latch_does_not_reset() {
        let mut s = session();
        let now = Utc::now();

        s.update(near_target(), now);
        assert!(s.is_found());

        let (ui, event) = s.update(c(-23.11500, -45.70800), now);
        assert!(event.is_none());
        assert!(s.is_found(), "Walking away reset the latch");
        assert_eq!(ui.status, SessionStatus::Found);
        // Hint still follows the current distance
        assert_eq!(ui.proximity, Some(Proximity::Cold));
    }

    #[test]
    fn exactly_one_step_is_not_found() {
        let settings = HuntSettings::new(c(0.0, 0.0), 1.0).unwrap();
        let mut s = HuntSession::new(settings);
        // ~1.11m north, a little over a step
        let (ui, event) = s.update(c(0.00001, 0.0), Utc::now());
        assert!(event.is_none());
        assert_eq!(ui.status, SessionStatus::Searching);
    }

    #[test]
    fn standing_on_target() {
        let mut s = session();
        let target = s.settings().target;
        let (ui, event) = s.update(target, Utc::now());
        assert!(event.is_some());
        assert_eq!(ui.steps_to_target, Some(0.0));
        assert_eq!(ui.bearing_degrees, Some(0.0));
        assert_eq!(ui.proximity, Some(Proximity::VeryHot));
        assert_eq!(ui.color, ColorToken::Hot);
    }

    #[test]
    fn denial_is_terminal() {
        let mut s = session();
        s.deny_permission();

        let ui = s.as_ui_state();
        assert_eq!(ui.status, SessionStatus::AwaitingFix);
        assert!(ui.permission_denied);
        assert_eq!(ui.hint, PERMISSION_DENIED_HINT);

        let (ui, event) = s.update(near_target(), Utc::now());
        assert!(event.is_none());
        assert_eq!(ui.status, SessionStatus::AwaitingFix);
        assert_eq!(s.samples(), 0);
    }

    #[test]
    fn sample_count_saturates() {
        let mut s = session();
        s.samples = u32::MAX - 1;
        s.update(c(-23.11500, -45.70800), Utc::now());
        s.update(c(-23.11500, -45.70800), Utc::now());
        assert_eq!(s.samples(), u32::MAX);
    }

    #[test]
    fn counts_samples() {
        let mut s = session();
        for _ in 0..3 {
            s.update(c(-23.11500, -45.70800), Utc::now());
        }
        assert_eq!(s.samples(), 3);
        assert_eq!(s.current_location(), Some(c(-23.11500, -45.70800)));
    }
}
