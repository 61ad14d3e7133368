mod common;

use common::course;
use fg_scorecard::CoreError;
use fg_scorecard::model::{HoleEntry, ObAction, ScoreStore};
use fg_scorecard::score::{diff_to_par, format_hole_diff};

#[test]
fn test1_rows_match_hole_count() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("kp", &[3; 20]));
    store.add_player("  Ann ")?;

    assert_eq!(store.players(), ["Ann"]);
    let row = store.row("Ann").ok_or("missing row")?;
    assert_eq!(row.len(), 20);
    assert!(row.iter().all(String::is_empty));
    Ok(())
}

#[test]
fn test1_add_player_needs_a_course() {
    let mut store = ScoreStore::new();
    let err = store.add_player("Ann").unwrap_err();
    assert!(matches!(err, CoreError::Precondition(_)));
    assert!(store.players().is_empty());
}

#[test]
fn test1_selecting_a_course_clears_the_card() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3]));
    store.add_player("Ann")?;
    store.set_score("Ann", 0, "4")?;
    store.apply_ob_penalty("Ann", 1, ObAction::Increment)?;

    store.select_course(course("b", &[4, 4, 4]));
    assert!(store.players().is_empty());
    assert_eq!(store.ob_count("Ann", 1), 0);
    assert_eq!(store.course().map(|c| c.id.as_str()), Some("b"));
    Ok(())
}

#[test]
fn test1_scenario_a_display_and_snapshot() -> Result<(), Box<dyn std::error::Error>> {
    let par = [3, 3, 4];
    let mut store = ScoreStore::new();
    store.select_course(course("a", &par));
    store.add_player("Ann")?;
    store.set_score("Ann", 0, "3")?;
    store.set_score("Ann", 1, "5")?;

    let shown: Vec<String> = (0..3)
        .map(|i| {
            let raw = store.score("Ann", i).unwrap_or_default();
            format_hole_diff(diff_to_par(raw, par[i]))
        })
        .collect();
    assert_eq!(shown, ["Par", "+2", "-"]);

    let record = store.snapshot(None, "1.6.2024 10.00.00".into())?;
    assert_eq!(
        record.entries_for("Ann"),
        [
            HoleEntry {
                hole: 1,
                diff_to_par: 0,
                ob_count: 0
            },
            HoleEntry {
                hole: 2,
                diff_to_par: 2,
                ob_count: 0
            },
        ]
    );
    assert_eq!(record.par, vec![3, 3, 4]);
    assert_eq!(record.course, "A");
    Ok(())
}

#[test]
fn test1_scenario_b_ob_penalty_and_reset() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3, 3]));
    store.add_player("Ben")?;
    store.set_score("Ben", 0, "4")?;

    assert_eq!(store.apply_ob_penalty("Ben", 0, ObAction::Increment)?, 5);
    assert_eq!(store.score("Ben", 0), Some("5"));
    assert_eq!(store.ob_count("Ben", 0), 1);

    assert_eq!(store.apply_ob_penalty("Ben", 0, ObAction::Reset)?, 4);
    assert_eq!(store.score("Ben", 0), Some("4"));
    assert_eq!(store.ob_count("Ben", 0), 0);
    Ok(())
}

#[test]
fn test1_ob_reset_never_goes_below_one() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3]));
    store.add_player("Ben")?;
    store.apply_ob_penalty("Ben", 0, ObAction::Increment)?;
    store.apply_ob_penalty("Ben", 0, ObAction::Increment)?;
    assert_eq!(store.score("Ben", 0), Some("2"));
    // the player then corrects the cell by hand
    store.set_score("Ben", 0, "1")?;

    assert_eq!(store.apply_ob_penalty("Ben", 0, ObAction::Reset)?, 1);
    assert_eq!(store.ob_count("Ben", 0), 0);
    Ok(())
}

#[test]
fn test1_tap_controls() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3]));
    store.add_player("Ann")?;

    assert_eq!(store.increment_score("Ann", 0)?, 1);
    assert_eq!(store.increment_score("Ann", 0)?, 2);
    assert_eq!(store.decrement_score("Ann", 0)?, 1);
    assert_eq!(store.decrement_score("Ann", 0)?, 1);
    assert_eq!(store.decrement_score("Ann", 1)?, 1);
    Ok(())
}

#[test]
fn test1_tap_controls_saturate_on_huge_cells() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3]));
    store.add_player("Ann")?;

    store.set_score("Ann", 0, "2147483647")?;
    assert_eq!(store.increment_score("Ann", 0)?, i32::MAX);
    assert_eq!(store.apply_ob_penalty("Ann", 0, ObAction::Increment)?, i32::MAX);
    assert_eq!(store.apply_ob_penalty("Ann", 0, ObAction::Reset)?, i32::MAX - 1);

    store.set_score("Ann", 1, "-2147483648")?;
    assert_eq!(store.decrement_score("Ann", 1)?, 1);

    store.set_score("Ann", 0, "2000000000")?;
    store.set_score("Ann", 1, "2000000000")?;
    let record = store.snapshot(None, "d".into())?;
    assert_eq!(record.entries_for("Ann")[0].diff_to_par, 1_999_999_997);
    Ok(())
}

#[test]
fn test1_trailing_text_still_counts() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3]));
    store.add_player("Ann")?;
    store.set_score("Ann", 0, "4x")?;

    assert_eq!(store.increment_score("Ann", 0)?, 5);
    let record = store.snapshot(None, "d".into())?;
    assert_eq!(
        record.entries_for("Ann"),
        [HoleEntry {
            hole: 1,
            diff_to_par: 2,
            ob_count: 0
        }]
    );
    Ok(())
}

#[test]
fn test1_unknown_player_or_hole() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 3]));
    store.add_player("Ann")?;

    assert!(matches!(
        store.set_score("Bob", 0, "3"),
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        store.increment_score("Ann", 2),
        Err(CoreError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn test1_snapshot_requires_players() {
    let mut store = ScoreStore::new();
    assert!(store.snapshot(None, String::new()).is_err());
    store.select_course(course("a", &[3]));
    let err = store.snapshot(None, String::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please select a course and add players before saving."
    );
}

#[test]
fn test1_snapshot_keeps_ob_counts_and_skips_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = ScoreStore::new();
    store.select_course(course("a", &[3, 4, 3]));
    store.add_player("Ann")?;
    store.add_player("Ben")?;
    store.set_score("Ann", 0, "2")?;
    store.set_score("Ann", 1, "abc")?;
    store.set_score("Ann", 2, "3")?;
    store.apply_ob_penalty("Ann", 2, ObAction::Increment)?;

    let record = store.snapshot(Some("uid1".into()), "d".into())?;
    let holes: Vec<(u32, i32, u32)> = record
        .entries_for("Ann")
        .iter()
        .map(|e| (e.hole, e.diff_to_par, e.ob_count))
        .collect();
    assert_eq!(holes, [(1, -1, 0), (3, 1, 1)]);
    assert!(record.entries_for("Ben").is_empty());
    assert_eq!(record.players, ["Ann", "Ben"]);
    assert_eq!(record.user_id.as_deref(), Some("uid1"));
    Ok(())
}
