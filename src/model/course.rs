use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

const BUILTIN_COURSES: &str = include_str!("../../static/courses.json");

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub par: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    FrontNine,
    BackNine,
    Extra,
}

impl SectionKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::FrontNine => "F9",
            SectionKind::BackNine => "B9",
            SectionKind::Extra => "Extra",
        }
    }
}

/// A contiguous run of holes shown as one table on the scorecard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoleSection {
    pub kind: SectionKind,
    /// Zero-based hole indexes covered by this section.
    pub holes: Range<usize>,
}

impl Course {
    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.par.len()
    }

    #[must_use]
    pub fn par_total(&self) -> u32 {
        self.par.iter().fold(0, |acc, p| acc.saturating_add(*p))
    }

    /// Front nine, back nine and anything past hole 18. Empty sections are left out.
    #[must_use]
    pub fn sections(&self) -> Vec<HoleSection> {
        let n = self.hole_count();
        [
            (SectionKind::FrontNine, 0..n.min(9)),
            (SectionKind::BackNine, n.min(9)..n.min(18)),
            (SectionKind::Extra, n.min(18)..n),
        ]
        .into_iter()
        .filter(|(_, holes)| !holes.is_empty())
        .map(|(kind, holes)| HoleSection { kind, holes })
        .collect()
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.id.trim().is_empty() {
            return Err(CoreError::Parse(format!(
                "course '{}' has an empty id",
                self.name
            )));
        }
        if self.par.is_empty() {
            return Err(CoreError::Parse(format!("course '{}' has no holes", self.id)));
        }
        if let Some(hole) = self.par.iter().position(|p| *p == 0) {
            return Err(CoreError::Parse(format!(
                "course '{}' hole {} has par 0",
                self.id,
                hole + 1
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct CourseCatalog {
    courses: Vec<Course>,
}

impl CourseCatalog {
    /// The catalog compiled into the binary.
    ///
    /// # Errors
    /// Returns an error if the embedded JSON is malformed.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json_str(BUILTIN_COURSES)
    }

    /// # Errors
    /// Returns an error if the JSON does not parse or a course is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let courses: Vec<Course> = serde_json::from_str(json)?;
        for course in &courses {
            course.validate()?;
        }
        Ok(Self { courses })
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Other(format!("read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(n: usize) -> Course {
        Course {
            id: "c".into(),
            name: "C".into(),
            par: vec![3; n],
        }
    }

    #[test]
    fn sections_split_at_nine_and_eighteen() {
        let kinds: Vec<_> = course(20).sections().into_iter().map(|s| s.holes).collect();
        assert_eq!(kinds, vec![0..9, 9..18, 18..20]);
        assert_eq!(course(9).sections().len(), 1);
        assert_eq!(course(12).sections()[1].holes, 9..12);
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = CourseCatalog::builtin().unwrap();
        assert!(!catalog.courses().is_empty());
        assert!(catalog.find("tuomiojarvi").is_some());
    }

    #[test]
    fn zero_par_is_rejected() {
        let json = r#"[{"id":"x","name":"X","par":[3,0,3]}]"#;
        assert!(CourseCatalog::from_json_str(json).is_err());
    }
}
