use hunt_logic::{Coordinate, HuntError, HuntSettings, HuntSummary, HuntUiState};
use interprocess::local_socket::{GenericNamespaced, Name, ToNsName};
use serde::{Deserialize, Serialize};

pub mod prelude {
    pub use anyhow::{Context, anyhow, bail};
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

pub use prelude::*;

pub fn get_socket_name(base_name: String) -> Result<Name<'static>> {
    base_name
        .to_ns_name::<GenericNamespaced>()
        .context("Failed to parse socket name")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestingRequest {
    /// Start a hunt, `grant_location` false simulates the player refusing location access
    StartHunt {
        settings: HuntSettings,
        grant_location: bool,
    },
    /// Feed a simulated GPS fix to the running hunt
    Fix(Coordinate),
    /// Ask for the current UI state of the hunt
    GetState,
    /// Quit the running hunt
    Quit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScreenUpdate {
    Idle,
    Hunt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestingResponse {
    Complete,
    ScreenChanged(ScreenUpdate),
    StateUpdate(HuntUiState),
    CueStarted,
    CueReleased,
    HuntOver(HuntSummary),
    WrongScreen,
    Error(String),
}

impl From<HuntSummary> for TestingResponse {
    fn from(val: HuntSummary) -> Self {
        TestingResponse::HuntOver(val)
    }
}

impl From<anyhow::Error> for TestingResponse {
    fn from(value: anyhow::Error) -> Self {
        TestingResponse::Error(value.to_string())
    }
}

impl From<ScreenUpdate> for TestingResponse {
    fn from(val: ScreenUpdate) -> Self {
        TestingResponse::ScreenChanged(val)
    }
}

impl From<HuntUiState> for TestingResponse {
    fn from(val: HuntUiState) -> Self {
        TestingResponse::StateUpdate(val)
    }
}

/// Screen to be on once a hunt's main loop has returned. A hunt that was refused location
/// access stays up so its final state can still be asked for, everything else goes idle.
pub fn screen_after_hunt(res: &Result<HuntSummary>) -> ScreenUpdate {
    match res {
        Err(why) if why.downcast_ref::<HuntError>() == Some(&HuntError::PermissionDenied) => {
            ScreenUpdate::Hunt
        }
        _ => ScreenUpdate::Idle,
    }
}

/// Encode a message as a single JSON line
pub fn encode_line(msg: &impl Serialize) -> Result<Vec<u8>> {
    let mut encoded = serde_json::to_vec(msg).context("Failed to encode")?;
    encoded.push(b'\n');
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_one_line() {
        let req = TestingRequest::Fix(Coordinate::new(-23.115, -45.708).unwrap());
        let line = encode_line(&req).expect("Failed to encode");
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);

        let decoded: TestingRequest =
            serde_json::from_slice(&line).expect("Failed to decode request");
        assert!(matches!(decoded, TestingRequest::Fix(c) if c.lat() == -23.115));
    }

    #[test]
    fn denied_hunt_keeps_screen() {
        let denied: Result<HuntSummary> = Err(HuntError::PermissionDenied.into());
        assert_eq!(screen_after_hunt(&denied), ScreenUpdate::Hunt);
    }

    #[test]
    fn finished_hunt_goes_idle() {
        let done: Result<HuntSummary> = Ok(HuntSummary {
            samples: 2,
            found_at: None,
            last_location: None,
        });
        assert_eq!(screen_after_hunt(&done), ScreenUpdate::Idle);

        let audio: Result<HuntSummary> = Err(HuntError::AudioPlayback("gone".into()).into());
        assert_eq!(screen_after_hunt(&audio), ScreenUpdate::Idle);

        let other: Result<HuntSummary> = Err(anyhow!("socket closed"));
        assert_eq!(screen_after_hunt(&other), ScreenUpdate::Idle);
    }

    #[test]
    fn bad_fix_is_rejected() {
        let raw = r#"{"Fix":{"lat":-123.0,"long":0.0}}"#;
        assert!(serde_json::from_str::<TestingRequest>(raw).is_err());
    }
}
