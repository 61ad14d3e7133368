use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::mvu::ScorecardModel;
use crate::view::history::render_history;
use crate::view::scorecard::render_scorecard;

pub const PAGE_TITLE: &str = "Frisbeegolf tuloslaskuri";

const PAGE_CSS: &str = "\
body{font-family:sans-serif;margin:1rem;background:#121212;color:#eee}\
table{border-collapse:collapse;margin:0.5rem 0}\
td,th{border:1px solid #555;padding:0.25rem 0.5rem;text-align:center}\
.hole.par,.saved.par{background:#979797d5}\
.hole.over,.saved.over{background:#d32f2f}\
.hole.under,.saved.under{background:#2e7d32}\
.saved.eagle{background:#1976d2}\
.hole span{display:block}\
.ob{font-size:0.7rem}";

/// Standalone HTML document with the live card and the saved-round history.
#[must_use]
pub fn render_page(model: &ScorecardModel) -> Markup {
    html! {
        (DOCTYPE)
        html lang="fi" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (PAGE_TITLE) }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                h1 { (PAGE_TITLE) }
                @if let Some(user) = &model.signed_in_as {
                    p class="user" { "Signed in as " (user) }
                }
                (render_scorecard(&model.store))
                (render_history(&model.history))
            }
        }
    }
}
