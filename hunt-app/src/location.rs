use std::sync::Mutex;

use hunt_logic::{Coordinate, FixFilter, HuntError, LocationService};
use log::{debug, error, warn};
use tauri::{AppHandle, plugin::PermissionState};
use tauri_plugin_geolocation::{GeolocationExt, PermissionType, PositionOptions, WatchEvent};
use tokio::sync::mpsc;

const FIX_QUEUE_SIZE: usize = 32;

const OPTIONS: PositionOptions = PositionOptions {
    enable_high_accuracy: true,
    timeout: 10000,
    maximum_age: 0,
};

/// Position source backed by the geolocation plugin. Fixes are pushed from the plugin's watch
/// callback into a queue that the hunt reads from.
pub struct TauriLocation {
    app: AppHandle,
    tx: Option<mpsc::Sender<Coordinate>>,
    rx: mpsc::Receiver<Coordinate>,
    watch_id: Option<u32>,
}

impl TauriLocation {
    pub fn new(app: AppHandle) -> Self {
        let (tx, rx) = mpsc::channel(FIX_QUEUE_SIZE);
        Self {
            app,
            tx: Some(tx),
            rx,
            watch_id: None,
        }
    }

    fn has_permission(&self) -> bool {
        let geo = self.app.geolocation();

        let status = match geo.check_permissions() {
            Ok(status) => status,
            Err(why) => {
                error!("Failed to check location permission: {why:?}");
                return false;
            }
        };

        if matches!(status.location, PermissionState::Granted) {
            return true;
        }

        match geo.request_permissions(Some(vec![PermissionType::Location])) {
            Ok(status) => matches!(status.location, PermissionState::Granted),
            Err(why) => {
                error!("Failed to request location permission: {why:?}");
                false
            }
        }
    }

    fn start_watch(&mut self) -> bool {
        let Some(tx) = self.tx.take() else {
            return self.watch_id.is_some();
        };

        let fix_filter = Mutex::new(FixFilter::default());

        let res = self
            .app
            .geolocation()
            .watch_position(OPTIONS, move |event| match event {
                WatchEvent::Position(pos) => {
                    let coords = pos.coords;
                    let fix = match Coordinate::try_from((coords.latitude, coords.longitude)) {
                        Ok(fix) => fix,
                        Err(why) => {
                            warn!("Dropping fix from GPS, {}", HuntError::from(why));
                            return;
                        }
                    };

                    let Ok(mut filter) = fix_filter.lock() else {
                        return;
                    };

                    if !filter.accepts(fix) {
                        return;
                    }

                    match tx.try_send(fix) {
                        Ok(_) => filter.mark_forwarded(fix),
                        Err(why) => warn!("Fix queue rejected {fix}: {why}"),
                    }
                }
                WatchEvent::Error(why) => {
                    error!("Location watch error: {why}");
                }
            });

        match res {
            Ok(id) => {
                debug!("Started location watch {id}");
                self.watch_id = Some(id);
                true
            }
            Err(why) => {
                error!("Failed to watch location: {why:?}");
                false
            }
        }
    }
}

impl LocationService for TauriLocation {
    async fn request_access(&mut self) -> bool {
        self.has_permission() && self.start_watch()
    }

    async fn next_fix(&mut self) -> Option<Coordinate> {
        self.rx.recv().await
    }
}

impl Drop for TauriLocation {
    fn drop(&mut self) {
        if let Some(id) = self.watch_id.take() {
            if let Err(why) = self.app.geolocation().clear_watch(id) {
                warn!("Failed to clear location watch {id}: {why:?}");
            }
        }
    }
}
