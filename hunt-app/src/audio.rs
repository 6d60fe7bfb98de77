use hunt_logic::{AudioCue, HuntError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tauri::AppHandle;
use tauri_specta::Event;

/// Start or stop the looped treasure sound. Playback happens in the webview, which reports
/// failures back with `report_audio_failure`.
#[derive(Serialize, Deserialize, Clone, Debug, specta::Type, tauri_specta::Event)]
pub struct TreasureCue {
    pub playing: bool,
}

pub struct TauriAudioCue(AppHandle);

impl TauriAudioCue {
    pub fn new(app: &AppHandle) -> Self {
        Self(app.clone())
    }
}

impl AudioCue for TauriAudioCue {
    fn play_looped(&self) -> Result<(), HuntError> {
        debug!("Asking UI to start the treasure cue");
        TreasureCue { playing: true }
            .emit(&self.0)
            .map_err(|why| HuntError::AudioPlayback(why.to_string()))
    }

    fn release(&self) {
        if let Err(why) = (TreasureCue { playing: false }).emit(&self.0) {
            warn!("Error asking UI to release the treasure cue: {why:?}");
        }
    }
}
