pub mod runtime;
pub mod scorecard;

pub use runtime::{dispatch, sync_session};
pub use scorecard::{Deps, Effect, Msg, Notice, ScorecardModel, run_effect, update};
