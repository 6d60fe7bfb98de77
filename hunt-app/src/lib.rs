mod audio;
mod location;
mod settings_store;
mod state;

use hunt_logic::{HuntError, HuntSettings, HuntUiState};
use log::{LevelFilter, error};
use tauri::{AppHandle, Manager, State};
use tauri_specta::{ErrorHandlingMode, collect_commands, collect_events};
use tokio::sync::RwLock;

use std::result::Result as StdResult;

use crate::{
    audio::TreasureCue,
    settings_store::{read_settings_from_store, write_settings_to_store},
    state::{AppState, AppStateHandle, HuntStateUpdate},
};

type Result<T = (), E = String> = StdResult<T, E>;

#[tauri::command]
#[specta::specta]
/// Get the current state of the hunt, call after receiving a [HuntStateUpdate]
async fn get_hunt_state(state: State<'_, AppStateHandle>) -> Result<HuntUiState> {
    let hunt = state.read().await.get_hunt()?;
    Ok(hunt.get_ui_state().await)
}

#[tauri::command]
#[specta::specta]
/// Get the settings of the running hunt
async fn get_hunt_settings(state: State<'_, AppStateHandle>) -> Result<HuntSettings> {
    let hunt = state.read().await.get_hunt()?;
    Ok(hunt.clone_settings().await)
}

#[tauri::command]
#[specta::specta]
/// Save new settings and restart the hunt with them, the found state is lost
async fn update_hunt_settings(
    settings: HuntSettings,
    app: AppHandle,
    state: State<'_, AppStateHandle>,
) -> Result {
    settings.validate().map_err(|err| err.to_string())?;
    write_settings_to_store(&app, &settings)
        .map_err(|err| err.context("Failed to save settings").to_string())?;
    state.write().await.start_hunt(&app, settings).await;
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// Start the hunt over with the same settings
async fn restart_hunt(app: AppHandle, state: State<'_, AppStateHandle>) -> Result {
    let mut state = state.write().await;
    let settings = state.get_hunt()?.clone_settings().await;
    state.start_hunt(&app, settings).await;
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// The UI couldn't play the treasure cue, the hunt carries on without it
fn report_audio_failure(reason: String) -> Result {
    error!("{}", HuntError::AudioPlayback(reason));
    Ok(())
}

pub fn mk_specta() -> tauri_specta::Builder {
    tauri_specta::Builder::<tauri::Wry>::new()
        .error_handling(ErrorHandlingMode::Throw)
        .commands(collect_commands![
            get_hunt_state,
            get_hunt_settings,
            update_hunt_settings,
            restart_hunt,
            report_audio_failure,
        ])
        .events(collect_events![HuntStateUpdate, TreasureCue])
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let state = RwLock::new(AppState::Setup);

    let builder = mk_specta();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(LevelFilter::Debug)
                .build(),
        )
        .plugin(tauri_plugin_geolocation::init())
        .plugin(tauri_plugin_store::Builder::default().build())
        .invoke_handler(builder.invoke_handler())
        .manage(state)
        .setup(move |app| {
            builder.mount_events(app);

            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let settings = read_settings_from_store(&handle);
                let state_handle = handle.state::<AppStateHandle>();
                let mut state = state_handle.write().await;
                state.start_hunt(&handle, settings).await;
            });
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
