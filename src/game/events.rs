//! Session events published to the UI shell.

use serde::{Deserialize, Serialize};

use super::hazard::HazardKind;
use super::PlayerId;

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    /// A head touched a foreign, non-sensor body
    HeadContact,
    /// A head sank below the water line
    Submerged,
}

/// Events broadcast over the session's channel. The UI shell renders
/// these as overlay text, score display and hazard warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    RoundStarted {
        round: u32,
        started_at: u64,
    },
    HazardTriggered {
        round: u32,
        kind: HazardKind,
    },
    RoundEnded {
        round: u32,
        winner: PlayerId,
        loser: PlayerId,
        reason: RoundEndReason,
        /// Running win counts, player 1 first
        scores: [u32; 2],
    },
}
