#![allow(clippy::result_large_err)]

use hunt_logic::{
    AudioCue, Coordinate, Hunt as BaseHunt, HuntError, HuntSettings, LocationService,
    StateUpdateSender,
};
use hunt_test_shared::*;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::{Mutex, mpsc},
};

/// Location service fed by fixes from the driver instead of a GPS
struct SimulatedLocation {
    granted: bool,
    fixes: mpsc::Receiver<Coordinate>,
}

impl LocationService for SimulatedLocation {
    async fn request_access(&mut self) -> bool {
        self.granted
    }

    async fn next_fix(&mut self) -> Option<Coordinate> {
        self.fixes.recv().await
    }
}

/// Reports cue changes to the driver rather than playing anything
struct DaemonCue(mpsc::Sender<TestingResponse>);

impl AudioCue for DaemonCue {
    fn play_looped(&self) -> Result<(), HuntError> {
        self.0
            .try_send(TestingResponse::CueStarted)
            .map_err(|why| HuntError::AudioPlayback(why.to_string()))
    }

    fn release(&self) {
        if let Err(why) = self.0.try_send(TestingResponse::CueReleased) {
            warn!("Couldn't report cue release: {why}");
        }
    }
}

struct UpdateSender(mpsc::Sender<()>);

impl StateUpdateSender for UpdateSender {
    fn send_update(&self) {
        let tx = self.0.clone();
        tokio::spawn(async move {
            tx.send(()).await.ok();
        });
    }
}

type Hunt = BaseHunt<SimulatedLocation, DaemonCue, UpdateSender>;

#[derive(Default)]
enum DaemonScreen {
    #[default]
    Idle,
    Hunt(Arc<Hunt>, mpsc::Sender<Coordinate>),
}

impl DaemonScreen {
    pub fn as_update(&self) -> ScreenUpdate {
        match self {
            Self::Idle => ScreenUpdate::Idle,
            Self::Hunt(..) => ScreenUpdate::Hunt,
        }
    }
}

type StateHandle = Arc<Mutex<DaemonState>>;

struct DaemonState {
    screen: DaemonScreen,
    responses: mpsc::Sender<TestingResponse>,
}

const FIX_QUEUE_SIZE: usize = 20;

impl DaemonState {
    pub fn new(responses: mpsc::Sender<TestingResponse>) -> Self {
        Self {
            screen: DaemonScreen::default(),
            responses,
        }
    }

    async fn change_screen(&mut self, new_screen: DaemonScreen) {
        let update = new_screen.as_update();
        self.screen = new_screen;
        self.push_resp(update).await;
    }

    async fn push_resp(&self, resp: impl Into<TestingResponse>) {
        if self.responses.send(resp.into()).await.is_err() {
            error!("Response channel closed");
        }
    }

    /// Forward every state update from the hunt to the driver as a full UI state
    fn forward_updates(&self, hunt: Arc<Hunt>, mut updates: mpsc::Receiver<()>) {
        let responses = self.responses.clone();
        tokio::spawn(async move {
            while updates.recv().await.is_some() {
                let state = hunt.get_ui_state().await;
                if responses.send(state.into()).await.is_err() {
                    break;
                }
            }
        });
    }

    fn hunt_loop(&self, handle: StateHandle, hunt: Arc<Hunt>) {
        tokio::spawn(async move {
            let res = hunt.main_loop().await;
            let next_screen = screen_after_hunt(&res);
            let mut state = handle.lock().await;
            match res {
                Ok(summary) => {
                    info!("Hunt over after {} fixes", summary.samples);
                    state.push_resp(summary).await;
                }
                Err(why) => {
                    warn!("Hunt ended with an error: {why}");
                    state.push_resp(why).await;
                }
            }
            if next_screen == ScreenUpdate::Idle {
                state.change_screen(DaemonScreen::Idle).await;
            }
        });
    }

    async fn start_hunt(&mut self, handle: StateHandle, settings: HuntSettings, granted: bool) {
        let (fix_tx, fix_rx) = mpsc::channel(FIX_QUEUE_SIZE);
        let (update_tx, update_rx) = mpsc::channel(FIX_QUEUE_SIZE);

        let location = SimulatedLocation {
            granted,
            fixes: fix_rx,
        };
        let cue = DaemonCue(self.responses.clone());
        let hunt = Arc::new(Hunt::new(settings, location, cue, UpdateSender(update_tx)));

        self.forward_updates(hunt.clone(), update_rx);
        self.change_screen(DaemonScreen::Hunt(hunt.clone(), fix_tx))
            .await;
        self.hunt_loop(handle, hunt);
    }

    fn assert_screen(&self, expected: ScreenUpdate) -> Result<(), TestingResponse> {
        if self.screen.as_update() == expected {
            Ok(())
        } else {
            Err(TestingResponse::WrongScreen)
        }
    }

    pub async fn process_req(
        &mut self,
        handle: StateHandle,
        req: TestingRequest,
    ) -> Result<(), TestingResponse> {
        match req {
            TestingRequest::StartHunt {
                settings,
                grant_location,
            } => {
                self.assert_screen(ScreenUpdate::Idle)?;
                settings
                    .validate()
                    .map_err(|why| TestingResponse::Error(why.to_string()))?;
                self.start_hunt(handle, settings, grant_location).await;
            }
            TestingRequest::Fix(fix) => {
                self.assert_screen(ScreenUpdate::Hunt)?;
                if let DaemonScreen::Hunt(_, fixes) = &self.screen {
                    fixes
                        .send(fix)
                        .await
                        .map_err(|_| TestingResponse::Error("Hunt is not reading fixes".into()))?;
                }
            }
            TestingRequest::GetState => {
                self.assert_screen(ScreenUpdate::Hunt)?;
                if let DaemonScreen::Hunt(hunt, _) = &self.screen {
                    let state = hunt.get_ui_state().await;
                    self.push_resp(state).await;
                }
            }
            TestingRequest::Quit => {
                self.assert_screen(ScreenUpdate::Hunt)?;
                if let DaemonScreen::Hunt(hunt, _) = &self.screen {
                    hunt.quit_hunt().await;
                    // A refused hunt has already stopped, nothing else will leave its screen
                    if hunt.get_ui_state().await.permission_denied {
                        self.change_screen(DaemonScreen::Idle).await;
                    }
                }
            }
        }
        Ok(())
    }
}

use interprocess::local_socket::{ListenerOptions, tokio::prelude::*};

const CLI_MSG: &str = "Usage: hunt-test-daemon SOCKET_NAME";

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result {
    colog::init();

    let args = std::env::args().collect::<Vec<_>>();
    let raw_socket_name = args.get(1).cloned().context(CLI_MSG)?;
    let socket_name = get_socket_name(raw_socket_name)?;
    let opts = ListenerOptions::new().name(socket_name);
    let listener = opts.create_tokio().context("Failed to bind to socket")?;
    let (resp_tx, mut resp_rx) = mpsc::channel::<TestingResponse>(40);

    let handle = Arc::new(Mutex::new(DaemonState::new(resp_tx)));

    info!("Testing Daemon Ready");

    'server: loop {
        let res = tokio::select! {
            res = listener.accept() => {
                res
            },
            Ok(_) = tokio::signal::ctrl_c() => {
                break 'server;
            }
        };

        match res {
            Ok(stream) => {
                let mut recv = BufReader::new(&stream);
                let mut send = &stream;

                let mut buffer = String::with_capacity(256);

                loop {
                    tokio::select! {
                        Ok(_) = tokio::signal::ctrl_c() => {
                            break 'server;
                        }
                        res = recv.read_line(&mut buffer) => {
                            match res {
                                Ok(0) => {
                                    debug!("Driver disconnected");
                                    break;
                                }
                                Ok(_amnt) => {
                                    let parsed = serde_json::from_str::<TestingRequest>(&buffer);
                                    buffer.clear();
                                    let outcome = match parsed {
                                        Ok(req) => {
                                            let handle2 = handle.clone();
                                            let mut state = handle.lock().await;
                                            state.process_req(handle2, req).await
                                        }
                                        Err(why) => Err(TestingResponse::Error(format!("Bad request: {why}"))),
                                    };
                                    let resp = outcome.err().unwrap_or(TestingResponse::Complete);
                                    send.write_all(&encode_line(&resp)?).await.context("Failed to send")?;
                                }
                                Err(why) => {
                                    error!("Read Error: {why:?}");
                                    break;
                                }
                            }
                        }
                        Some(resp) = resp_rx.recv() => {
                            send.write_all(&encode_line(&resp)?).await.context("Failed to send")?;
                        }
                    }
                }
            }
            Err(why) => error!("Error from connection: {why:?}"),
        }
    }

    Ok(())
}
