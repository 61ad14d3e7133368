use maud::{Markup, html};

use crate::model::{RoundRecord, SavedRound};
use crate::score::{
    course_averages, format_average, format_saved_diff, format_vs_par, group_by_course,
    round_vs_par,
};

fn saved_diff_class(diff: i32) -> &'static str {
    match diff {
        -2 => "saved eagle",
        d if d > 0 => "saved over",
        d if d < 0 => "saved under",
        _ => "saved par",
    }
}

/// Saved rounds grouped by course, numbered in list order so they can be deleted.
#[must_use]
pub fn render_history(rounds: &[SavedRound]) -> Markup {
    if rounds.is_empty() {
        return html! { p class="empty" { "No saved rounds yet." } };
    }
    html! {
        div class="saved-rounds" {
            h2 { "Saved Rounds" }
            @for (course, members) in group_by_course(rounds) {
                (render_course(&course, &members))
            }
        }
    }
}

fn render_course(course: &str, members: &[(usize, &SavedRound)]) -> Markup {
    let records: Vec<&RoundRecord> = members.iter().map(|(_, r)| r.record()).collect();
    let par = records.first().map_or(&[][..], |r| r.par.as_slice());
    let averages = course_averages(&records);

    html! {
        table class="course-history" data-course=(course) {
            caption {
                (course)
                @if let Some(avg) = &averages {
                    " (avg " (format!("{:.1}", avg.average_total_score)) ")"
                }
            }
            thead {
                tr {
                    th { "#" }
                    th { "Player" }
                    @for hole in 1..=par.len() {
                        th { (hole) }
                    }
                    th { "total" }
                }
            }
            tbody {
                tr class="par-row" {
                    td {}
                    th { "Par" }
                    @for p in par {
                        td { (p) }
                    }
                    td {}
                }
                @for (idx, round) in members {
                    (render_round_rows(*idx, round.record(), par.len()))
                }
                tr class="averages" {
                    td {}
                    th { "Avg" }
                    @for i in 0..par.len() {
                        @let avg = averages.as_ref().and_then(|a| a.average_per_hole.get(i).copied().flatten());
                        td { (format_average(avg)) }
                    }
                    td { (format_average(averages.as_ref().map(|a| a.average_vs_par))) }
                }
            }
        }
    }
}

fn render_round_rows(idx: usize, record: &RoundRecord, hole_count: usize) -> Markup {
    html! {
        @for player in &record.players {
            @let entries = record.entries_for(player);
            tr data-round=(idx + 1) data-player=(player) {
                td class="round-number" { (idx + 1) }
                th scope="row" title=(record.date) { (player) }
                @for hole in 1..=hole_count {
                    @match entries.iter().find(|e| e.hole as usize == hole) {
                        Some(entry) => {
                            td class=(saved_diff_class(entry.diff_to_par)) {
                                (format_saved_diff(entry.diff_to_par, entry.ob_count))
                            }
                        }
                        None => { td class="saved missing" { "-" } }
                    }
                }
                td class="round-total" { strong { (format_vs_par(round_vs_par(record, player))) } }
            }
        }
    }
}
