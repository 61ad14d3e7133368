use maud::{Markup, html};

use crate::model::{Course, HoleSection, ScoreStore};
use crate::score::{
    diff_to_par, format_hole_diff, format_vs_par, player_total, section_totals, vs_par_total,
};

/// CSS class for a scored cell, mirroring the colour coding of the card.
#[must_use]
pub fn diff_class(diff: Option<i32>) -> &'static str {
    match diff {
        None => "hole unscored",
        Some(0) => "hole par",
        Some(d) if d > 0 => "hole over",
        Some(_) => "hole under",
    }
}

#[must_use]
pub fn render_scorecard(store: &ScoreStore) -> Markup {
    let Some(course) = store.course() else {
        return html! { p class="empty" { "Select a course to start a round." } };
    };
    html! {
        div class="scorecard" data-course=(course.id) {
            h2 { "Rata: " (course.name) }
            @for section in course.sections() {
                (render_section(store, course, &section))
            }
            (render_summary(store, course))
        }
    }
}

fn render_section(store: &ScoreStore, course: &Course, section: &HoleSection) -> Markup {
    html! {
        table class="scorecard-section" data-section=(section.kind.label()) {
            caption { "Tuloskortti (" (section.kind.label()) ")" }
            thead {
                tr {
                    th { "Player" }
                    @for i in section.holes.clone() {
                        th class="hole-number" { (i + 1) }
                    }
                    th { "Total" }
                    th { "+/-" }
                }
                tr class="par-row" {
                    th { "Par" }
                    @for i in section.holes.clone() {
                        td { (course.par[i]) }
                    }
                    td {}
                    td {}
                }
            }
            tbody {
                @for player in store.players() {
                    (render_player_row(store, course, section, player))
                }
            }
        }
    }
}

fn render_player_row(
    store: &ScoreStore,
    course: &Course,
    section: &HoleSection,
    player: &str,
) -> Markup {
    let row = store.row(player).unwrap_or_default();
    let totals = section_totals(row, &course.par, section.holes.clone());
    html! {
        tr data-player=(player) {
            th scope="row" { (player) }
            @for i in section.holes.clone() {
                @let raw = store.score(player, i).unwrap_or_default();
                @let diff = diff_to_par(raw, course.par[i]);
                @let ob = store.ob_count(player, i);
                td class=(diff_class(diff)) data-hole=(i + 1) {
                    span class="throws" { @if raw.is_empty() { "-" } @else { (raw) } }
                    @if diff.is_some() {
                        span class="diff" { (format_hole_diff(diff)) }
                    }
                    @if ob > 0 {
                        span class="ob" { "OB x" (ob) }
                    }
                }
            }
            td class="section-total" { (totals.total) }
            td class="section-vs-par" { (format_vs_par(totals.vs_par)) }
        }
    }
}

fn render_summary(store: &ScoreStore, course: &Course) -> Markup {
    html! {
        table class="summary" {
            caption { "Total Score Summary" }
            thead {
                tr {
                    th { "Player" }
                    th { "Strokes" }
                    th { "Par" }
                    th { "+/-" }
                }
            }
            tbody {
                @for player in store.players() {
                    @let row = store.row(player).unwrap_or_default();
                    tr data-player=(player) {
                        th scope="row" { (player) }
                        td class="strokes" { (player_total(row)) }
                        td { (course.par_total()) }
                        td class="vs-par" { (format_vs_par(vs_par_total(row, &course.par))) }
                    }
                }
            }
        }
    }
}
