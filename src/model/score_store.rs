use ahash::RandomState;
use std::collections::{BTreeMap, HashMap};

use crate::error::CoreError;
use crate::model::{Course, HoleEntry, RoundRecord};
use crate::score::{diff_to_par, parse_throws};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObAction {
    Increment,
    Reset,
}

/// Live, editable scorecard for one course.
///
/// Cells hold the raw text the user entered; an empty string is the unset marker.
/// OB counters track how many strokes of a cell came from OB penalties.
#[derive(Clone, Debug, Default)]
pub struct ScoreStore {
    course: Option<Course>,
    players: Vec<String>,
    scores: HashMap<String, Vec<String>, RandomState>,
    ob_penalties: HashMap<(String, usize), u32, RandomState>,
}

impl ScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to `course` and starts an empty card.
    pub fn select_course(&mut self, course: Course) {
        self.players.clear();
        self.scores.clear();
        self.ob_penalties.clear();
        self.course = Some(course);
    }

    #[must_use]
    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    #[must_use]
    pub fn players(&self) -> &[String] {
        &self.players
    }

    #[must_use]
    pub fn row(&self, player: &str) -> Option<&[String]> {
        self.scores.get(player).map(Vec::as_slice)
    }

    #[must_use]
    pub fn score(&self, player: &str, hole_index: usize) -> Option<&str> {
        self.scores
            .get(player)
            .and_then(|row| row.get(hole_index))
            .map(String::as_str)
    }

    #[must_use]
    pub fn ob_count(&self, player: &str, hole_index: usize) -> u32 {
        self.ob_penalties
            .get(&(player.to_string(), hole_index))
            .copied()
            .unwrap_or(0)
    }

    /// Appends a player with an all-empty row. Names are trimmed; duplicates are
    /// accepted and share one row.
    ///
    /// # Errors
    /// `Precondition` if no course is selected or the name is blank.
    pub fn add_player(&mut self, name: &str) -> Result<(), CoreError> {
        let hole_count = self
            .course
            .as_ref()
            .map(Course::hole_count)
            .ok_or_else(|| CoreError::Precondition("Select a course before adding players.".into()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Precondition("Player name is empty.".into()));
        }
        self.players.push(name.to_string());
        self.scores
            .insert(name.to_string(), vec![String::new(); hole_count]);
        Ok(())
    }

    /// Replaces one cell verbatim. No range check on the value.
    ///
    /// # Errors
    /// `NotFound` for an unknown player or a hole index past the end of the course.
    pub fn set_score(
        &mut self,
        player: &str,
        hole_index: usize,
        raw: impl Into<String>,
    ) -> Result<(), CoreError> {
        let cell = self.cell_mut(player, hole_index)?;
        *cell = raw.into();
        Ok(())
    }

    /// Tap control: one more throw.
    ///
    /// # Errors
    /// Same as [`ScoreStore::set_score`].
    pub fn increment_score(&mut self, player: &str, hole_index: usize) -> Result<i32, CoreError> {
        let next = self.parsed_or_zero(player, hole_index)?.saturating_add(1);
        self.set_score(player, hole_index, next.to_string())?;
        Ok(next)
    }

    /// Long-press control: one throw less, never below 1.
    ///
    /// # Errors
    /// Same as [`ScoreStore::set_score`].
    pub fn decrement_score(&mut self, player: &str, hole_index: usize) -> Result<i32, CoreError> {
        let next = self
            .parsed_or_zero(player, hole_index)?
            .saturating_sub(1)
            .max(1);
        self.set_score(player, hole_index, next.to_string())?;
        Ok(next)
    }

    /// Adds an OB stroke to a hole, or takes all of them back out.
    ///
    /// Reset floors the hole at 1 throw and always zeroes the counter.
    ///
    /// # Errors
    /// `NotFound` for an unknown player or hole.
    pub fn apply_ob_penalty(
        &mut self,
        player: &str,
        hole_index: usize,
        action: ObAction,
    ) -> Result<i32, CoreError> {
        let current = self.parsed_or_zero(player, hole_index)?;
        let key = (player.to_string(), hole_index);
        let next = match action {
            ObAction::Increment => {
                let count = self.ob_penalties.entry(key).or_insert(0);
                *count = count.saturating_add(1);
                current.saturating_add(1)
            }
            ObAction::Reset => {
                let penalty = self.ob_penalties.insert(key, 0).unwrap_or(0);
                current
                    .saturating_sub(i32::try_from(penalty).unwrap_or(i32::MAX))
                    .max(1)
            }
        };
        self.set_score(player, hole_index, next.to_string())?;
        Ok(next)
    }

    /// Flattens the card into a persisted record. Holes without a numeric score are
    /// left out. The store itself is not cleared.
    ///
    /// # Errors
    /// `Precondition` if no course is selected or nobody has been added.
    pub fn snapshot(&self, owner: Option<String>, date: String) -> Result<RoundRecord, CoreError> {
        let Some(course) = self.course.as_ref().filter(|_| !self.players.is_empty()) else {
            return Err(CoreError::Precondition(
                "Please select a course and add players before saving.".into(),
            ));
        };

        let mut scores = BTreeMap::new();
        for player in &self.players {
            let row = self.scores.get(player).map_or(&[][..], Vec::as_slice);
            let entries: Vec<HoleEntry> = course
                .par
                .iter()
                .enumerate()
                .filter_map(|(i, par)| {
                    let diff = diff_to_par(row.get(i)?, *par)?;
                    Some(HoleEntry {
                        hole: i as u32 + 1,
                        diff_to_par: diff,
                        ob_count: self.ob_count(player, i),
                    })
                })
                .collect();
            scores.insert(player.clone(), entries);
        }

        Ok(RoundRecord {
            user_id: owner,
            date,
            course: course.name.clone(),
            par: course.par.clone(),
            players: self.players.clone(),
            scores,
        })
    }

    fn parsed_or_zero(&self, player: &str, hole_index: usize) -> Result<i32, CoreError> {
        let row = self
            .scores
            .get(player)
            .ok_or_else(|| CoreError::NotFound(format!("player '{player}'")))?;
        let cell = row
            .get(hole_index)
            .ok_or_else(|| CoreError::NotFound(format!("hole {}", hole_index + 1)))?;
        Ok(parse_throws(cell).unwrap_or(0))
    }

    fn cell_mut(&mut self, player: &str, hole_index: usize) -> Result<&mut String, CoreError> {
        self.scores
            .get_mut(player)
            .ok_or_else(|| CoreError::NotFound(format!("player '{player}'")))?
            .get_mut(hole_index)
            .ok_or_else(|| CoreError::NotFound(format!("hole {}", hole_index + 1)))
    }
}
