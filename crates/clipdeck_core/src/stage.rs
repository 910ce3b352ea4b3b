use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing stage of a single item.
///
/// Stages only move forward along [`ActiveStage::SEQUENCE`], or jump
/// straight to `Complete`/`Error`. Both of those are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Transcribing,
    Merging,
    Processing,
    Enhancing,
    Generating,
    Optimizing,
    Complete,
    Error,
}

/// The stages an item is actively ticked through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStage {
    Uploading,
    Analyzing,
    Transcribing,
    Merging,
    Processing,
    Enhancing,
    Generating,
    Optimizing,
}

impl ActiveStage {
    pub const SEQUENCE: [ActiveStage; 8] = [
        ActiveStage::Uploading,
        ActiveStage::Analyzing,
        ActiveStage::Transcribing,
        ActiveStage::Merging,
        ActiveStage::Processing,
        ActiveStage::Enhancing,
        ActiveStage::Generating,
        ActiveStage::Optimizing,
    ];

    /// Number of active stages before `Complete`.
    pub const COUNT: usize = Self::SEQUENCE.len();

    pub const FIRST: ActiveStage = ActiveStage::Uploading;

    /// Zero-based position in [`Self::SEQUENCE`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following active stage, or `None` for the last one.
    pub fn successor(self) -> Option<ActiveStage> {
        Self::SEQUENCE.get(self.index() + 1).copied()
    }
}

impl From<ActiveStage> for Stage {
    fn from(stage: ActiveStage) -> Self {
        match stage {
            ActiveStage::Uploading => Stage::Uploading,
            ActiveStage::Analyzing => Stage::Analyzing,
            ActiveStage::Transcribing => Stage::Transcribing,
            ActiveStage::Merging => Stage::Merging,
            ActiveStage::Processing => Stage::Processing,
            ActiveStage::Enhancing => Stage::Enhancing,
            ActiveStage::Generating => Stage::Generating,
            ActiveStage::Optimizing => Stage::Optimizing,
        }
    }
}

impl Stage {
    /// Returns the active stage this maps to, if the item is being ticked.
    pub fn as_active(self) -> Option<ActiveStage> {
        match self {
            Stage::Uploading => Some(ActiveStage::Uploading),
            Stage::Analyzing => Some(ActiveStage::Analyzing),
            Stage::Transcribing => Some(ActiveStage::Transcribing),
            Stage::Merging => Some(ActiveStage::Merging),
            Stage::Processing => Some(ActiveStage::Processing),
            Stage::Enhancing => Some(ActiveStage::Enhancing),
            Stage::Generating => Some(ActiveStage::Generating),
            Stage::Optimizing => Some(ActiveStage::Optimizing),
            Stage::Idle | Stage::Complete | Stage::Error => None,
        }
    }

    pub fn is_active(self) -> bool {
        self.as_active().is_some()
    }

    /// `Complete` and `Error` are absorbing: nothing advances them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }

    /// Position along the full forward ordering, used to reject regressions.
    ///
    /// `Error` has no rank; it can be reached from any non-terminal stage.
    pub fn rank(self) -> Option<usize> {
        match self {
            Stage::Idle => Some(0),
            Stage::Complete => Some(ActiveStage::COUNT + 1),
            Stage::Error => None,
            active => active.as_active().map(|stage| stage.index() + 1),
        }
    }

    /// Whether moving from `self` to `next` respects the forward-only rule.
    pub fn can_move_to(self, next: Stage) -> bool {
        if self.is_terminal() {
            return self == next;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to >= from,
            (None, Some(_)) => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Uploading => "uploading",
            Stage::Analyzing => "analyzing",
            Stage::Transcribing => "transcribing",
            Stage::Merging => "merging",
            Stage::Processing => "processing",
            Stage::Enhancing => "enhancing",
            Stage::Generating => "generating",
            Stage::Optimizing => "optimizing",
            Stage::Complete => "complete",
            Stage::Error => "error",
        }
    }

    /// Human-readable label for status indicators.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Idle => "Waiting",
            Stage::Uploading => "Uploading to cloud",
            Stage::Analyzing => "Analyzing content",
            Stage::Transcribing => "Transcribing audio",
            Stage::Merging => "Merging audio & video",
            Stage::Processing => "Neural processing",
            Stage::Enhancing => "AI enhancement",
            Stage::Generating => "Generating clips",
            Stage::Optimizing => "Optimizing output",
            Stage::Complete => "Processing complete",
            Stage::Error => "Error occurred",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_indices_match_positions() {
        for (position, stage) in ActiveStage::SEQUENCE.iter().enumerate() {
            assert_eq!(stage.index(), position);
        }
        assert_eq!(ActiveStage::Optimizing.successor(), None);
        assert_eq!(
            ActiveStage::Uploading.successor(),
            Some(ActiveStage::Analyzing)
        );
    }

    #[test]
    fn terminal_stages_only_move_to_themselves() {
        assert!(Stage::Complete.can_move_to(Stage::Complete));
        assert!(!Stage::Complete.can_move_to(Stage::Error));
        assert!(!Stage::Error.can_move_to(Stage::Uploading));
        assert!(Stage::Merging.can_move_to(Stage::Error));
        assert!(!Stage::Merging.can_move_to(Stage::Analyzing));
        assert!(Stage::Idle.can_move_to(Stage::Complete));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Stage::Transcribing).unwrap();
        assert_eq!(json, "\"transcribing\"");
        let back: Stage = serde_json::from_str("\"optimizing\"").unwrap();
        assert_eq!(back, Stage::Optimizing);
    }
}
