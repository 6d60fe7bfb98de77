use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
/// Background color for a hint, the frontend decides exactly how to paint it
pub enum ColorToken {
    /// Orange-red, close to the treasure
    Hot,
    /// Light blue, far away (or no fix yet)
    Cool,
}

impl ColorToken {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Hot => "#FF4500",
            Self::Cool => "#87CEFA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, specta::Type)]
/// How close the player is to the treasure, measured in steps
pub enum Proximity {
    VeryHot,
    Hot,
    Warm,
    Cold,
}

/// Exclusive upper bound in steps for each band, checked in order. Anything past the last
/// bound is [Proximity::Cold].
const BANDS: [(f64, Proximity); 3] = [
    (10.0, Proximity::VeryHot),
    (25.0, Proximity::Hot),
    (50.0, Proximity::Warm),
];

impl Proximity {
    /// Classify a distance in steps. Total over every `f64`: negative values count as
    /// [Proximity::VeryHot] and NaN as [Proximity::Cold].
    pub fn classify(steps: f64) -> Self {
        BANDS
            .iter()
            .find(|(bound, _)| steps < *bound)
            .map(|(_, proximity)| *proximity)
            .unwrap_or(Self::Cold)
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::VeryHot => "Very hot! Almost there!",
            Self::Hot => "Hot! You're close!",
            Self::Warm => "Warm. Keep looking.",
            Self::Cold => "Cold! Far from the treasure.",
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            Self::VeryHot | Self::Hot => ColorToken::Hot,
            Self::Warm | Self::Cold => ColorToken::Cool,
        }
    }
}
