use std::sync::Arc;

use hunt_logic::{Hunt as BaseHunt, HuntError, HuntSettings, StateUpdateSender};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tauri_specta::Event;
use tokio::sync::RwLock;

use crate::{Result, audio::TauriAudioCue, location::TauriLocation};

/// The state of the hunt has changed
#[derive(Serialize, Deserialize, Clone, Default, Debug, specta::Type, tauri_specta::Event)]
pub struct HuntStateUpdate;

pub struct TauriStateUpdateSender(AppHandle);

impl TauriStateUpdateSender {
    fn new(app: &AppHandle) -> Self {
        Self(app.clone())
    }
}

impl StateUpdateSender for TauriStateUpdateSender {
    fn send_update(&self) {
        if let Err(why) = HuntStateUpdate.emit(&self.0) {
            error!("Error sending hunt state update to UI: {why:?}");
        }
    }
}

type Hunt = BaseHunt<TauriLocation, TauriAudioCue, TauriStateUpdateSender>;

pub enum AppState {
    /// Settings haven't been loaded yet
    Setup,
    Hunt(Arc<Hunt>),
}

pub type AppStateHandle = RwLock<AppState>;

fn error_dialog(app: &AppHandle, msg: &str) {
    app.dialog()
        .message(msg)
        .kind(MessageDialogKind::Error)
        .show(|_| {});
}

impl AppState {
    pub fn get_hunt(&self) -> Result<Arc<Hunt>> {
        if let AppState::Hunt(hunt) = self {
            Ok(hunt.clone())
        } else {
            Err("Hunt hasn't started yet".to_string())
        }
    }

    /// Start a new hunt, quitting the current one if there is one
    pub async fn start_hunt(&mut self, app: &AppHandle, settings: HuntSettings) {
        if let AppState::Hunt(old) = self {
            old.quit_hunt().await;
        }

        let location = TauriLocation::new(app.clone());
        let audio = TauriAudioCue::new(app);
        let updates = TauriStateUpdateSender::new(app);
        let hunt = Arc::new(Hunt::new(settings, location, audio, updates));

        *self = AppState::Hunt(hunt.clone());
        Self::hunt_loop(app.clone(), hunt);
        TauriStateUpdateSender::new(app).send_update();
    }

    fn hunt_loop(app: AppHandle, hunt: Arc<Hunt>) {
        tauri::async_runtime::spawn(async move {
            match hunt.main_loop().await {
                Ok(summary) => {
                    info!(
                        "Hunt ended after {} fixes, found: {:?}",
                        summary.samples, summary.found_at
                    );
                }
                Err(why) => match why.downcast_ref::<HuntError>() {
                    // The hunt screen shows this one itself
                    Some(HuntError::PermissionDenied) => {
                        warn!("Hunt stopped: {why}");
                    }
                    _ => {
                        error!("Hunt Error: {why:?}");
                        error_dialog(&app, &format!("The hunt stopped unexpectedly: {why}"));
                    }
                },
            }
        });
    }
}
