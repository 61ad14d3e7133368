use tokio::sync::watch;

use crate::mvu::scorecard::{Deps, Msg, ScorecardModel, run_effect, update};
use crate::storage::AuthSession;

/// Applies `msg` and drains every effect it leads to, one at a time.
pub async fn dispatch(model: &mut ScorecardModel, msg: Msg, deps: Deps<'_>) {
    let mut effects = update(model, msg);
    while let Some(effect) = effects.pop() {
        let next = run_effect(effect, model, deps).await;
        effects.extend(update(model, next));
    }
}

/// Feeds a sign-in or sign-out into the model if one happened since the last call.
/// Token refreshes for the same account are not session changes.
/// Returns whether anything changed.
pub async fn sync_session(
    model: &mut ScorecardModel,
    rx: &mut watch::Receiver<Option<AuthSession>>,
    deps: Deps<'_>,
) -> bool {
    if !rx.has_changed().unwrap_or(false) {
        return false;
    }
    let user = rx.borrow_and_update().as_ref().map(|s| s.email.clone());
    if user == model.signed_in_as {
        return false;
    }
    dispatch(model, Msg::SessionChanged(user), deps).await;
    true
}
