use crate::model::{RoundRecord, SavedRound};
use std::ops::Range;

/// Throw count typed into a scorecard cell, read like `parseInt`: optional
/// sign, then leading digits, trailing text ignored. `None` when there are no
/// digits. Values past the `i32` range clamp to its bounds.
#[must_use]
pub fn parse_throws(raw: &str) -> Option<i32> {
    const CAP: i64 = 1 << 32;
    let text = raw.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits
        .bytes()
        .fold(0i64, |acc, d| (acc * 10 + i64::from(d - b'0')).min(CAP));
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).ok()
}

fn par_as_i32(par: u32) -> i32 {
    i32::try_from(par).unwrap_or(i32::MAX)
}

#[must_use]
pub fn diff_to_par(raw: &str, par: u32) -> Option<i32> {
    parse_throws(raw).map(|throws| throws.saturating_sub(par_as_i32(par)))
}

/// Strokes actually taken. Unparseable cells count as zero.
#[must_use]
pub fn player_total<S: AsRef<str>>(row: &[S]) -> i32 {
    row.iter()
        .map(|cell| parse_throws(cell.as_ref()).unwrap_or(0))
        .fold(0, i32::saturating_add)
}

/// Sum of diff-to-par over holes that have both a parsed score and a par.
/// Unplayed holes are skipped rather than counted as zero throws.
#[must_use]
pub fn vs_par_total<S: AsRef<str>>(row: &[S], par: &[u32]) -> i32 {
    row.iter()
        .zip(par)
        .filter_map(|(cell, p)| diff_to_par(cell.as_ref(), *p))
        .fold(0, i32::saturating_add)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionTotals {
    pub total: i32,
    pub vs_par: i32,
}

/// Totals for one scorecard section; only parsed holes contribute to either figure.
#[must_use]
pub fn section_totals<S: AsRef<str>>(row: &[S], par: &[u32], holes: Range<usize>) -> SectionTotals {
    let end = holes.end.min(row.len()).min(par.len());
    let start = holes.start.min(end);
    let mut totals = SectionTotals { total: 0, vs_par: 0 };
    for i in start..end {
        if let Some(throws) = parse_throws(row[i].as_ref()) {
            totals.total = totals.total.saturating_add(throws);
            totals.vs_par = totals
                .vs_par
                .saturating_add(throws.saturating_sub(par_as_i32(par[i])));
        }
    }
    totals
}

/// Sum of the stored diffs for one player of a saved round.
#[must_use]
pub fn round_vs_par(round: &RoundRecord, player: &str) -> i32 {
    round
        .entries_for(player)
        .iter()
        .map(|e| e.diff_to_par)
        .fold(0, i32::saturating_add)
}

#[must_use]
pub fn round_total_vs_par(round: &RoundRecord) -> i32 {
    round
        .scores
        .values()
        .flatten()
        .map(|e| e.diff_to_par)
        .fold(0, i32::saturating_add)
}

#[derive(Clone, Debug, PartialEq)]
pub struct CourseAverages {
    /// Mean vs-par over every (round, player) pair.
    pub average_vs_par: f64,
    /// `par_total + average_vs_par`, i.e. the mean stroke count.
    pub average_total_score: f64,
    /// Mean diff per hole position; `None` where nobody has an entry.
    pub average_per_hole: Vec<Option<f64>>,
}

/// Averages across every player of every given round. The rounds are expected to
/// share one course. `None` when no player contributes at all.
///
/// Per-hole averages are keyed by the entry's `hole` number, so holes skipped at
/// save time do not shift later holes into the wrong column.
#[must_use]
pub fn course_averages(rounds: &[&RoundRecord]) -> Option<CourseAverages> {
    let hole_count = rounds.iter().map(|r| r.par.len()).max().unwrap_or(0);
    let par_total: f64 = rounds
        .first()
        .map_or(0.0, |r| r.par.iter().map(|p| f64::from(*p)).sum());

    let mut pool: Vec<i32> = Vec::new();
    let mut sums = vec![0i64; hole_count];
    let mut counts = vec![0u32; hole_count];

    for round in rounds {
        for player in &round.players {
            let entries = round.entries_for(player);
            pool.push(round_vs_par(round, player));
            for entry in entries {
                let Some(idx) = (entry.hole as usize).checked_sub(1) else {
                    continue;
                };
                if idx < hole_count {
                    sums[idx] += i64::from(entry.diff_to_par);
                    counts[idx] += 1;
                }
            }
        }
    }

    if pool.is_empty() {
        return None;
    }

    let average_vs_par = pool.iter().map(|v| f64::from(*v)).sum::<f64>() / pool.len() as f64;
    let average_per_hole = sums
        .iter()
        .zip(&counts)
        .map(|(sum, count)| (*count > 0).then(|| *sum as f64 / f64::from(*count)))
        .collect();

    Some(CourseAverages {
        average_vs_par,
        average_total_score: par_total + average_vs_par,
        average_per_hole,
    })
}

/// Saved rounds bucketed by course name, in the order each course first appears.
#[must_use]
pub fn group_by_course(rounds: &[SavedRound]) -> Vec<(String, Vec<(usize, &SavedRound)>)> {
    let mut groups: Vec<(String, Vec<(usize, &SavedRound)>)> = Vec::new();
    for (idx, round) in rounds.iter().enumerate() {
        let course = &round.record().course;
        match groups.iter_mut().find(|(name, _)| name == course) {
            Some((_, members)) => members.push((idx, round)),
            None => groups.push((course.clone(), vec![(idx, round)])),
        }
    }
    groups
}
