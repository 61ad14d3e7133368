use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Course, ObAction, RoundRecord, SavedRound, ScoreStore, round_date_now};
use crate::storage::RoundGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Error(s) => s,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScorecardModel {
    pub store: ScoreStore,
    pub history: Vec<SavedRound>,
    /// Deletes the backend has not confirmed yet. Hidden from `history` and
    /// retried on the next load.
    pub pending_deletes: Vec<SavedRound>,
    pub notices: Vec<Notice>,
    pub signed_in_as: Option<String>,
}

impl ScorecardModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands the queued notices to the caller.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notices.push(Notice::Info(text.into()));
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notices.push(Notice::Error(text.into()));
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    SelectCourse(Course),
    AddPlayer(String),
    SetScore {
        player: String,
        hole: usize,
        raw: String,
    },
    BumpScore {
        player: String,
        hole: usize,
        up: bool,
    },
    ApplyOb {
        player: String,
        hole: usize,
        action: ObAction,
    },
    Save,
    Saved(SavedRound),
    SaveFailed(CoreError),
    LoadHistory,
    HistoryLoaded {
        rounds: Vec<SavedRound>,
        still_pending: Vec<SavedRound>,
    },
    LoadFailed(CoreError),
    Delete(usize),
    Deleted(SavedRound),
    DeleteFailed {
        round: SavedRound,
        error: CoreError,
    },
    SessionChanged(Option<String>),
}

#[derive(Debug, Clone)]
pub enum Effect {
    PersistRound(RoundRecord),
    LoadHistory,
    DeleteRound(SavedRound),
}

pub fn update(model: &mut ScorecardModel, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::SelectCourse(course) => {
            model.store.select_course(course);
            vec![]
        }
        Msg::AddPlayer(name) => {
            if let Err(e) = model.store.add_player(&name) {
                model.error(e.to_string());
            }
            vec![]
        }
        Msg::SetScore { player, hole, raw } => {
            if let Err(e) = model.store.set_score(&player, hole, raw) {
                model.error(e.to_string());
            }
            vec![]
        }
        Msg::BumpScore { player, hole, up } => {
            let result = if up {
                model.store.increment_score(&player, hole)
            } else {
                model.store.decrement_score(&player, hole)
            };
            if let Err(e) = result {
                model.error(e.to_string());
            }
            vec![]
        }
        Msg::ApplyOb {
            player,
            hole,
            action,
        } => {
            if let Err(e) = model.store.apply_ob_penalty(&player, hole, action) {
                model.error(e.to_string());
            }
            vec![]
        }
        Msg::Save => match model.store.snapshot(None, round_date_now()) {
            Ok(record) => vec![Effect::PersistRound(record)],
            Err(e) => {
                model.error(e.to_string());
                vec![]
            }
        },
        Msg::Saved(round) => match round {
            SavedRound::Local(_) => {
                model.history.push(round);
                model.info("Round saved locally!");
                vec![]
            }
            SavedRound::Remote { .. } => {
                model.info("Round saved to cloud!");
                vec![Effect::LoadHistory]
            }
        },
        Msg::SaveFailed(e) => {
            model.error(format!("Error saving round: {e}"));
            vec![]
        }
        Msg::LoadHistory => vec![Effect::LoadHistory],
        Msg::HistoryLoaded {
            rounds,
            still_pending,
        } => {
            model.history = rounds
                .into_iter()
                .filter(|r| !still_pending.contains(r))
                .collect();
            model.pending_deletes = still_pending;
            vec![]
        }
        Msg::LoadFailed(e) => {
            model.error(format!("Could not load saved rounds: {e}"));
            vec![]
        }
        Msg::Delete(idx) => {
            if idx >= model.history.len() {
                model.error(format!("No saved round number {}", idx + 1));
                return vec![];
            }
            let round = model.history.remove(idx);
            vec![Effect::DeleteRound(round)]
        }
        Msg::Deleted(round) => {
            model.pending_deletes.retain(|p| *p != round);
            model.info("Round deleted.");
            vec![]
        }
        Msg::DeleteFailed { round, error } => {
            let target = if round.is_remote() { "cloud" } else { "this device" };
            model.error(format!("Failed to delete from {target}: {error}"));
            if !model.pending_deletes.contains(&round) {
                model.pending_deletes.push(round);
            }
            vec![]
        }
        Msg::SessionChanged(user) => {
            model.signed_in_as = user;
            model.history.clear();
            // Cloud deletes belong to the account that queued them.
            model.pending_deletes.retain(|r| !r.is_remote());
            vec![Effect::LoadHistory]
        }
    }
}

#[derive(Clone, Copy)]
pub struct Deps<'a> {
    pub gateway: &'a RoundGateway,
}

pub async fn run_effect(effect: Effect, model: &ScorecardModel, deps: Deps<'_>) -> Msg {
    match effect {
        Effect::PersistRound(record) => match deps.gateway.save(record).await {
            Ok(saved) => Msg::Saved(saved),
            Err(e) => Msg::SaveFailed(e),
        },
        Effect::LoadHistory => {
            // One at a time: local deletes rewrite the whole stored list.
            let mut still_pending = Vec::new();
            for round in &model.pending_deletes {
                if let Err(e) = deps.gateway.delete(round).await {
                    warn!(error = %e, "pending delete still failing");
                    still_pending.push(round.clone());
                }
            }
            match deps.gateway.list().await {
                Ok(rounds) => {
                    debug!(count = rounds.len(), pending = still_pending.len(), "history loaded");
                    Msg::HistoryLoaded {
                        rounds,
                        still_pending,
                    }
                }
                Err(e) => Msg::LoadFailed(e),
            }
        }
        Effect::DeleteRound(round) => match deps.gateway.delete(&round).await {
            Ok(()) => Msg::Deleted(round),
            Err(error) => Msg::DeleteFailed { round, error },
        },
    }
}
