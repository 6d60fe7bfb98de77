use serde::{Deserialize, Serialize};

use crate::{hunt::UtcDT, location::Coordinate};

/// A one-shot event produced by a session update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, specta::Type)]
pub enum HuntEvent {
    /// The player got within one step of the treasure for the first time. Contains the fix
    /// that triggered it, how many steps away it was, and when it happened.
    Arrived {
        location: Coordinate,
        steps: f64,
        at: UtcDT,
    },
}
