//! Position trend between two rankings

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[display("up")]
    Up,
    #[display("down")]
    Down,
    #[default]
    #[display("stable")]
    Stable,
}

impl Trend {
    /// Positions are 1-based, so a numerically smaller position is better.
    pub fn between(previous: Option<u32>, current: u32) -> Self {
        match previous {
            Some(prev) if prev > current => Trend::Up,
            Some(prev) if prev < current => Trend::Down,
            _ => Trend::Stable,
        }
    }
}
