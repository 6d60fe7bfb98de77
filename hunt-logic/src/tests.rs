use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{AudioCue, Coordinate, HuntError, LocationService, StateUpdateSender};

/// Location service that refuses access
pub struct DeniedLocation;

impl LocationService for DeniedLocation {
    async fn request_access(&mut self) -> bool {
        false
    }

    async fn next_fix(&mut self) -> Option<Coordinate> {
        panic!("Asked for a fix without permission");
    }
}

#[derive(Clone, Default)]
pub struct CueLog {
    plays: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl CueLog {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

pub struct MockCue {
    log: CueLog,
    fail: bool,
}

impl MockCue {
    pub fn new(fail: bool) -> (Self, CueLog) {
        let log = CueLog::default();
        (
            Self {
                log: log.clone(),
                fail,
            },
            log,
        )
    }
}

impl AudioCue for MockCue {
    fn play_looped(&self) -> Result<(), HuntError> {
        self.log.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(HuntError::AudioPlayback("no speaker".to_string()))
        } else {
            Ok(())
        }
    }

    fn release(&self) {
        self.log.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RecordingSender(Arc<AtomicUsize>);

impl RecordingSender {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (Self(count.clone()), count)
    }
}

impl StateUpdateSender for RecordingSender {
    fn send_update(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct DummySender;

impl StateUpdateSender for DummySender {
    fn send_update(&self) {}
}
