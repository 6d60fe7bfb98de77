use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::{
    hunt_events::HuntEvent,
    location::{Coordinate, CoordinateError, LocationService},
    prelude::*,
    session::{HuntSession, HuntUiState},
    settings::HuntSettings,
};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HuntError {
    /// Location access was refused, the hunt can't go on
    #[error("permission to access location was denied")]
    PermissionDenied,
    /// The found cue couldn't be started, the hunt is unaffected
    #[error("failed to play the treasure cue: {0}")]
    AudioPlayback(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
}

pub trait StateUpdateSender {
    fn send_update(&self);
}

/// Plays the looped "treasure found" sound, playback itself is up to the implementor
pub trait AudioCue {
    /// Start looping the cue, called once when the treasure is found
    fn play_looped(&self) -> Result<(), HuntError>;
    /// Stop and free the cue, called when the hunt ends (even if it never played)
    fn release(&self);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
/// How a hunt went, returned once the hunt stops
pub struct HuntSummary {
    pub samples: u32,
    pub found_at: Option<UtcDT>,
    pub last_location: Option<Coordinate>,
}

/// Struct representing an ongoing hunt, reads fixes from a [LocationService], feeds them to a
/// [HuntSession], and tells the UI and an [AudioCue] about what happened.
pub struct Hunt<L: LocationService, A: AudioCue, S: StateUpdateSender> {
    session: RwLock<HuntSession>,
    location: Mutex<L>,
    audio: A,
    state_update_sender: S,
    cancel: CancellationToken,
}

impl<L: LocationService, A: AudioCue, S: StateUpdateSender> Hunt<L, A, S> {
    pub fn new(settings: HuntSettings, location: L, audio: A, state_update_sender: S) -> Self {
        Self {
            session: RwLock::new(HuntSession::new(settings)),
            location: Mutex::new(location),
            audio,
            state_update_sender,
            cancel: CancellationToken::new(),
        }
    }

    pub async fn get_ui_state(&self) -> HuntUiState {
        self.session.read().await.as_ui_state()
    }

    pub async fn clone_settings(&self) -> HuntSettings {
        self.session.read().await.settings().clone()
    }

    pub async fn quit_hunt(&self) {
        self.cancel.cancel();
    }

    fn consume_event(&self, event: HuntEvent) {
        match event {
            HuntEvent::Arrived { location, .. } => {
                info!("Arrived at the treasure at {location}, starting cue");
                if let Err(why) = self.audio.play_looped() {
                    // Found either way, the cue is cosmetic
                    error!("{why}");
                }
            }
        }
    }

    /// Apply a single fix to the session, including any side effects, before returning.
    async fn consume_fix(&self, fix: Coordinate) {
        let mut session = self.session.write().await;
        let (ui_state, event) = session.update(fix, Utc::now());
        drop(session);

        debug!(
            "Fix {fix}: {:?} steps, bearing {:?}",
            ui_state.steps_to_target, ui_state.bearing_degrees
        );

        if let Some(event) = event {
            self.consume_event(event);
        }

        self.state_update_sender.send_update();
    }

    async fn summarize(&self) -> HuntSummary {
        let session = self.session.read().await;
        HuntSummary {
            samples: session.samples(),
            found_at: session.found_at(),
            last_location: session.current_location(),
        }
    }

    /// Main loop of the hunt. Asks for location access, then applies fixes one at a time
    /// until the hunt is quit or the [LocationService] runs dry.
    pub async fn main_loop(&self) -> Result<HuntSummary> {
        let mut location = self.location.lock().await;

        if !location.request_access().await {
            warn!("Location permission denied");
            self.session.write().await.deny_permission();
            self.state_update_sender.send_update();
            self.audio.release();
            return Err(HuntError::PermissionDenied.into());
        }

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("Hunt quit");
                    break;
                }

                fix = location.next_fix() => {
                    match fix {
                        Some(fix) => self.consume_fix(fix).await,
                        None => {
                            info!("Location source closed, ending hunt");
                            break;
                        }
                    }
                }
            }
        }

        self.audio.release();

        Ok(self.summarize().await)
    }
}
