mod common;

use common::memory_app;
use fg_scorecard::repl::{ReplOutcome, execute_line};

async fn run(app: &mut fg_scorecard::App, line: &str) -> Result<String, Box<dyn std::error::Error>> {
    match execute_line(app, line).await {
        ReplOutcome::Continue(out) => Ok(out),
        ReplOutcome::Exit => Err(format!("'{line}' exited").into()),
    }
}

#[tokio::test]
async fn test7_round_through_commands() -> Result<(), Box<dyn std::error::Error>> {
    let mut t = memory_app()?;
    let app = &mut t.app;

    assert!(run(app, "courses").await?.contains("tuomiojarvi"));
    assert_eq!(run(app, "course tuomiojarvi").await?.trim(), "Rata: Tuomiojärvi");
    run(app, "add \"Ann Marie\"").await?;
    run(app, "add Ben").await?;
    assert_eq!(app.model.store.players(), ["Ann Marie", "Ben"]);

    run(app, "score \"Ann Marie\" 1 4").await?;
    run(app, "+ Ben 1").await?;
    run(app, "up Ben 1").await?;
    run(app, "ob Ben 1").await?;
    assert_eq!(app.model.store.score("Ann Marie", 0), Some("4"));
    assert_eq!(app.model.store.score("Ben", 0), Some("3"));
    assert_eq!(app.model.store.ob_count("Ben", 0), 1);
    run(app, "ob Ben 1 reset").await?;
    assert_eq!(app.model.store.score("Ben", 0), Some("2"));

    let card = run(app, "card").await?;
    assert!(card.contains("4/+1"));

    assert_eq!(run(app, "tallenna").await?, "Round saved locally!");
    assert!(run(app, "rounds").await?.contains("Tuomiojärvi"));
    assert_eq!(run(app, "delete 1").await?, "Round deleted.");
    assert!(app.model.history.is_empty());

    assert!(matches!(execute_line(app, "q").await, ReplOutcome::Exit));
    Ok(())
}

#[tokio::test]
async fn test7_huge_scores_render() -> Result<(), Box<dyn std::error::Error>> {
    let mut t = memory_app()?;
    let app = &mut t.app;

    run(app, "course tuomiojarvi").await?;
    run(app, "add Ann").await?;
    run(app, "score Ann 1 2147483647").await?;
    run(app, "up Ann 1").await?;
    assert_eq!(app.model.store.score("Ann", 0), Some("2147483647"));
    run(app, "score Ann 2 2000000000").await?;
    run(app, "score Ann 3 2000000000").await?;
    let card = run(app, "card").await?;
    assert!(card.contains(&i32::MAX.to_string()));
    assert_eq!(run(app, "save").await?, "Round saved locally!");
    Ok(())
}

#[tokio::test]
async fn test7_usage_and_errors() -> Result<(), Box<dyn std::error::Error>> {
    let mut t = memory_app()?;
    let app = &mut t.app;

    assert!(run(app, "bogus").await?.starts_with("Unknown command: bogus"));
    assert_eq!(run(app, "course").await?, "usage: course <id>");
    assert_eq!(run(app, "score Ann x 3").await?, "Not a hole number: x");
    assert_eq!(run(app, "add Ann").await?, "! Select a course before adding players.");
    assert_eq!(
        run(app, "save").await?,
        "! Please select a course and add players before saving."
    );
    assert!(run(app, "add 'Ann").await?.starts_with("Invalid character at position 5"));
    assert_eq!(run(app, "delete 0").await?, "usage: delete <n>");
    Ok(())
}

#[tokio::test]
async fn test7_login_switches_backend() -> Result<(), Box<dyn std::error::Error>> {
    let mut t = memory_app()?;
    let app = &mut t.app;

    assert!(run(app, "whoami").await?.starts_with("Not logged in"));
    assert_eq!(
        run(app, "login ann@example.com pw").await?.trim(),
        "! INVALID_LOGIN_CREDENTIALS"
    );
    assert_eq!(
        run(app, "signup ann@example.com pw").await?.trim(),
        "Logged in as ann@example.com."
    );
    assert_eq!(app.model.signed_in_as.as_deref(), Some("ann@example.com"));

    run(app, "course laajavuori").await?;
    run(app, "add Ann").await?;
    run(app, "s Ann 1 3").await?;
    assert_eq!(run(app, "save").await?, "Round saved to cloud!");
    assert_eq!(t.documents.len().await, 1);

    let app = &mut t.app;
    assert_eq!(run(app, "logout").await?.trim(), "Logged out.");
    assert!(app.model.history.is_empty());
    Ok(())
}

#[tokio::test]
async fn test7_export_writes_page() -> Result<(), Box<dyn std::error::Error>> {
    let mut t = memory_app()?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("card.html");

    let out = run(&mut t.app, &format!("export \"{}\"", path.display())).await?;
    assert!(out.starts_with("Wrote "));
    let html = std::fs::read_to_string(&path)?;
    assert!(html.contains("<title>Frisbeegolf tuloslaskuri</title>"));
    Ok(())
}
