use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names are shared with data already stored by earlier releases; do not rename.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HoleEntry {
    pub hole: u32,
    pub diff_to_par: i32,
    pub ob_count: u32,
}

/// Immutable snapshot of one finished round.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    pub date: String,
    pub course: String,
    pub par: Vec<u32>,
    pub players: Vec<String>,
    /// Unscored holes are absent, not null.
    pub scores: BTreeMap<String, Vec<HoleEntry>>,
}

impl RoundRecord {
    #[must_use]
    pub fn entries_for(&self, player: &str) -> &[HoleEntry] {
        self.scores.get(player).map_or(&[][..], Vec::as_slice)
    }
}

/// A round as it comes back from one of the two backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SavedRound {
    Local(RoundRecord),
    Remote { id: String, record: RoundRecord },
}

impl SavedRound {
    #[must_use]
    pub fn record(&self) -> &RoundRecord {
        match self {
            SavedRound::Local(record) | SavedRound::Remote { record, .. } => record,
        }
    }

    #[must_use]
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            SavedRound::Local(_) => None,
            SavedRound::Remote { id, .. } => Some(id),
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, SavedRound::Remote { .. })
    }
}

#[must_use]
pub fn format_round_date(at: DateTime<Local>) -> String {
    at.format("%-d.%-m.%Y %H.%M.%S").to_string()
}

#[must_use]
pub fn round_date_now() -> String {
    format_round_date(Local::now())
}
