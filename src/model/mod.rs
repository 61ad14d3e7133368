pub mod course;
pub mod round;
pub mod score_store;

pub use course::{Course, CourseCatalog, HoleSection, SectionKind};
pub use round::{HoleEntry, RoundRecord, SavedRound, format_round_date, round_date_now};
pub use score_store::{ObAction, ScoreStore};
