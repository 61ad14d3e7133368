use std::fmt::Write;

use crate::model::{Course, SavedRound, ScoreStore};
use crate::score::{
    course_averages, diff_to_par, format_average, format_hole_diff, format_saved_diff,
    format_vs_par, group_by_course, player_total, round_vs_par, section_totals, vs_par_total,
};

const CELL: usize = 6;

fn name_width(names: impl Iterator<Item = usize>) -> usize {
    names.max().unwrap_or(0).max(6)
}

/// Plain-text scorecard: one block per section, each cell as `throws/diff`.
#[must_use]
pub fn render_card_text(store: &ScoreStore) -> String {
    let Some(course) = store.course() else {
        return "No course selected.".to_string();
    };
    let width = name_width(store.players().iter().map(|p| p.chars().count()));
    let mut out = String::new();
    let _ = writeln!(out, "Rata: {} (par {})", course.name, course.par_total());

    for section in course.sections() {
        let _ = writeln!(out, "\nTuloskortti ({})", section.kind.label());
        let _ = write!(out, "{:<width$}", "Hole");
        for i in section.holes.clone() {
            let _ = write!(out, "{:>CELL$}", i + 1);
        }
        let _ = writeln!(out, "{:>CELL$}{:>CELL$}", "Tot", "+/-");
        let _ = write!(out, "{:<width$}", "Par");
        for i in section.holes.clone() {
            let _ = write!(out, "{:>CELL$}", course.par[i]);
        }
        out.push('\n');

        for player in store.players() {
            let row = store.row(player).unwrap_or_default();
            let _ = write!(out, "{player:<width$}");
            for i in section.holes.clone() {
                let _ = write!(out, "{:>CELL$}", cell_text(store, course, player, i));
            }
            let totals = section_totals(row, &course.par, section.holes.clone());
            let _ = writeln!(
                out,
                "{:>CELL$}{:>CELL$}",
                totals.total,
                format_vs_par(totals.vs_par)
            );
        }
    }

    if !store.players().is_empty() {
        let _ = writeln!(out, "\nTotal Score Summary");
        for player in store.players() {
            let row = store.row(player).unwrap_or_default();
            let _ = writeln!(
                out,
                "{player:<width$}  strokes {:>3}  vs par {:>4}",
                player_total(row),
                format_vs_par(vs_par_total(row, &course.par))
            );
        }
    }
    out
}

fn cell_text(store: &ScoreStore, course: &Course, player: &str, hole: usize) -> String {
    let raw = store.score(player, hole).unwrap_or_default();
    let ob = store.ob_count(player, hole);
    let mut text = match diff_to_par(raw, course.par[hole]) {
        Some(diff) => format!("{}/{}", raw.trim(), format_hole_diff(Some(diff))),
        None if raw.is_empty() => "-".to_string(),
        None => raw.to_string(),
    };
    if ob > 0 {
        let _ = write!(text, "*{ob}");
    }
    text
}

/// Plain-text history, numbered the same way `delete` expects.
#[must_use]
pub fn render_history_text(rounds: &[SavedRound]) -> String {
    if rounds.is_empty() {
        return "No saved rounds yet.".to_string();
    }
    let mut out = String::new();
    for (course, members) in group_by_course(rounds) {
        let records: Vec<_> = members.iter().map(|(_, r)| r.record()).collect();
        let par = records.first().map_or(&[][..], |r| r.par.as_slice());
        let width = name_width(
            records
                .iter()
                .flat_map(|r| r.players.iter())
                .map(|p| p.chars().count()),
        );
        let _ = writeln!(out, "== {course}");
        let _ = write!(out, "{:>4} {:<width$}", "#", "Hole");
        for hole in 1..=par.len() {
            let _ = write!(out, "{hole:>CELL$}");
        }
        let _ = writeln!(out, "{:>CELL$}", "total");
        let _ = write!(out, "{:>4} {:<width$}", "", "Par");
        for p in par {
            let _ = write!(out, "{p:>CELL$}");
        }
        out.push('\n');

        for (idx, round) in &members {
            let record = round.record();
            let origin = if round.is_remote() { "cloud" } else { "local" };
            for player in &record.players {
                let entries = record.entries_for(player);
                let _ = write!(out, "{:>4} {player:<width$}", idx + 1);
                for hole in 1..=par.len() {
                    let text = entries
                        .iter()
                        .find(|e| e.hole as usize == hole)
                        .map_or_else(|| "-".to_string(), |e| format_saved_diff(e.diff_to_par, e.ob_count));
                    let _ = write!(out, "{text:>CELL$}");
                }
                let _ = writeln!(
                    out,
                    "{:>CELL$}  {} ({origin})",
                    format_vs_par(round_vs_par(record, player)),
                    record.date
                );
            }
        }

        if let Some(avg) = course_averages(&records) {
            let _ = write!(out, "{:>4} {:<width$}", "", "Avg");
            for a in &avg.average_per_hole {
                let _ = write!(out, "{:>CELL$}", format_average(*a));
            }
            let _ = writeln!(
                out,
                "{:>CELL$}  avg strokes {:.1}",
                format_average(Some(avg.average_vs_par)),
                avg.average_total_score
            );
        }
        out.push('\n');
    }
    out
}
