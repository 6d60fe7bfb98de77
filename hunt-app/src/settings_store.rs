use hunt_logic::{HuntSettings, prelude::*};
use log::warn;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;

const STORE_NAME: &str = "settings";
const SETTINGS_KEY: &str = "hunt";

/// Read saved hunt settings, falls back to the defaults if none are saved or they're invalid
pub fn read_settings_from_store(app: &AppHandle) -> HuntSettings {
    let store = match app.store(STORE_NAME) {
        Ok(store) => store,
        Err(why) => {
            warn!("Couldn't open settings store, using defaults: {why:?}");
            return HuntSettings::default();
        }
    };

    let settings = store
        .get(SETTINGS_KEY)
        .and_then(|v| serde_json::from_value::<HuntSettings>(v).ok())
        .filter(|s| s.validate().is_ok());

    store.close_resource();

    settings.unwrap_or_default()
}

pub fn write_settings_to_store(app: &AppHandle, settings: &HuntSettings) -> Result {
    let store = app.store(STORE_NAME).context("Couldn't open settings store")?;
    let value = serde_json::to_value(settings).context("Failed to serialize settings")?;
    store.set(SETTINGS_KEY, value);
    Ok(())
}
