mod geodesy;
mod hunt;
mod hunt_events;
mod location;
mod proximity;
mod session;
mod settings;
#[cfg(test)]
mod tests;

pub use geodesy::{EARTH_RADIUS_METERS, GeodesicResult, bearing_degrees, distance_meters};
pub use hunt::{AudioCue, Hunt, HuntError, HuntSummary, StateUpdateSender, UtcDT};
pub use hunt_events::HuntEvent;
pub use location::{
    Coordinate, CoordinateError, FixFilter, LocationComponent, LocationService,
    MIN_FIX_DISTANCE_METERS,
};
pub use proximity::{ColorToken, Proximity};
pub use session::{
    AWAITING_FIX_HINT, HuntSession, HuntUiState, PERMISSION_DENIED_HINT, SessionStatus,
};
pub use settings::{ARRIVAL_STEPS, DEFAULT_STEP_LENGTH_METERS, HuntSettings, SettingsError};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
