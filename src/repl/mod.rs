use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::cell::RefCell;
use std::fmt::Write;
use std::path::Path;
use std::rc::Rc;
use tokio::runtime::Runtime;

use crate::app::App;
use crate::model::ObAction;
use crate::mvu::{Msg, Notice};
use crate::view::{render_card_text, render_history_text, render_page};
use commands::{CommandId, ReplCommand, build_repl_help, find_command, usage_line};
use helper::{ReplHelper, ReplHelperState};
use parse::{format_parse_error, parse_args, parse_hole};

mod commands;
mod helper;
mod parse;

#[derive(Debug, PartialEq, Eq)]
pub enum ReplOutcome {
    Continue(String),
    Exit,
}

/// Interactive loop. Every command runs to completion on `rt` before the next
/// prompt, so edits and backend calls never overlap.
///
/// # Errors
/// Returns an error if the line editor fails.
pub fn run_repl(app: &mut App, rt: &Runtime) -> Result<()> {
    println!("Frisbeegolf tuloslaskuri. Type 'help' for commands, Ctrl-D to quit.");
    let mut rl = Editor::<ReplHelper, DefaultHistory>::new().context("init repl")?;
    let helper_state = Rc::new(RefCell::new(ReplHelperState::default()));
    rl.set_helper(Some(ReplHelper::new(Rc::clone(&helper_state))));

    rt.block_on(app.send(Msg::LoadHistory));
    print_notices(&mut app.model.take_notices());

    loop {
        refresh_helper(app, &helper_state);
        let prompt = match app.store_course_id() {
            Some(id) => format!("fg:{id}> "),
            None => "fg> ".to_string(),
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;
                match rt.block_on(execute_line(app, input)) {
                    ReplOutcome::Continue(output) => {
                        if !output.is_empty() {
                            println!("{}", output.trim_end());
                        }
                    }
                    ReplOutcome::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("read repl input"),
        }
    }
    Ok(())
}

fn refresh_helper(app: &App, helper_state: &Rc<RefCell<ReplHelperState>>) {
    let mut state = helper_state.borrow_mut();
    state.course_ids = app.catalog.courses().iter().map(|c| c.id.clone()).collect();
    state.players = app.model.store.players().to_vec();
}

fn print_notices(notices: &mut Vec<Notice>) {
    for notice in notices.drain(..) {
        match notice {
            Notice::Info(text) => println!("{text}"),
            Notice::Error(text) => println!("! {text}"),
        }
    }
}

impl App {
    fn store_course_id(&self) -> Option<&str> {
        self.model.store.course().map(|c| c.id.as_str())
    }
}

/// Runs one command line against the app and returns what should be printed.
pub async fn execute_line(app: &mut App, input: &str) -> ReplOutcome {
    let args = match parse_args(input) {
        Ok(args) => args,
        Err(err) => return ReplOutcome::Continue(format_parse_error(input, err.index)),
    };
    let Some((command_token, rest)) = args.split_first() else {
        return ReplOutcome::Continue(String::new());
    };
    let Some(command) = find_command(command_token) else {
        return ReplOutcome::Continue(format!("Unknown command: {command_token}\n{}", build_repl_help()));
    };

    let mut out = String::new();
    match command.id {
        CommandId::Exit | CommandId::Quit => return ReplOutcome::Exit,
        CommandId::Help => out.push_str(&build_repl_help()),
        CommandId::Courses => {
            for course in app.catalog.courses() {
                let _ = writeln!(
                    out,
                    "{:<14} {} ({} holes, par {})",
                    course.id,
                    course.name,
                    course.hole_count(),
                    course.par_total()
                );
            }
        }
        CommandId::Course => match rest {
            [id] => match app.catalog.find(id).cloned() {
                Some(course) => {
                    let _ = writeln!(out, "Rata: {}", course.name);
                    app.send(Msg::SelectCourse(course)).await;
                }
                None => {
                    let _ = writeln!(out, "Unknown course: {id}");
                }
            },
            _ => out.push_str(&usage_line(command)),
        },
        CommandId::Add => match rest {
            [name] => app.send(Msg::AddPlayer(name.clone())).await,
            _ => out.push_str(&usage_line(command)),
        },
        CommandId::Score => match hole_args(command, rest) {
            Ok((player, hole, extra)) if extra.len() <= 1 => {
                let raw = extra.first().cloned().unwrap_or_default();
                app.send(Msg::SetScore { player, hole, raw }).await;
            }
            Ok(_) => out.push_str(&usage_line(command)),
            Err(message) => out.push_str(&message),
        },
        CommandId::Up | CommandId::Down => match hole_args(command, rest) {
            Ok((player, hole, [])) => {
                let up = command.id == CommandId::Up;
                app.send(Msg::BumpScore { player, hole, up }).await;
            }
            Ok(_) => out.push_str(&usage_line(command)),
            Err(message) => out.push_str(&message),
        },
        CommandId::Ob => match hole_args(command, rest) {
            Ok((player, hole, extra)) => {
                let action = match extra {
                    [] => Some(ObAction::Increment),
                    [flag] if flag == "reset" => Some(ObAction::Reset),
                    _ => None,
                };
                match action {
                    Some(action) => {
                        app.send(Msg::ApplyOb {
                            player,
                            hole,
                            action,
                        })
                        .await;
                    }
                    None => out.push_str(&usage_line(command)),
                }
            }
            Err(message) => out.push_str(&message),
        },
        CommandId::Card => out.push_str(&render_card_text(&app.model.store)),
        CommandId::Save => app.send(Msg::Save).await,
        CommandId::Rounds => out.push_str(&render_history_text(&app.model.history)),
        CommandId::Delete => match rest {
            [n] => match n.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(idx) => app.send(Msg::Delete(idx)).await,
                None => out.push_str(&usage_line(command)),
            },
            _ => out.push_str(&usage_line(command)),
        },
        CommandId::SignUp | CommandId::Login => match rest {
            [email, password] => {
                let result = if command.id == CommandId::SignUp {
                    app.auth.sign_up(email, password).await
                } else {
                    app.auth.sign_in(email, password).await
                };
                match result {
                    Ok(session) => {
                        let _ = writeln!(out, "Logged in as {}.", session.email);
                    }
                    Err(e) => {
                        let _ = writeln!(out, "! {e}");
                    }
                }
            }
            _ => out.push_str(&usage_line(command)),
        },
        CommandId::Logout => {
            app.auth.sign_out();
            out.push_str("Logged out.\n");
        }
        CommandId::WhoAmI => match app.auth.session().current() {
            Some(session) => {
                let _ = writeln!(out, "{} (rounds saved to cloud)", session.email);
            }
            None => out.push_str("Not logged in (rounds saved on this device).\n"),
        },
        CommandId::Export => match rest {
            [path] => match export_page(app, Path::new(path)).await {
                Ok(()) => {
                    let _ = writeln!(out, "Wrote {path}");
                }
                Err(e) => {
                    let _ = writeln!(out, "! {e:#}");
                }
            },
            _ => out.push_str(&usage_line(command)),
        },
    }

    app.follow_session().await;
    for notice in app.model.take_notices() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        match notice {
            Notice::Info(text) => out.push_str(&text),
            Notice::Error(text) => {
                let _ = write!(out, "! {text}");
            }
        }
    }
    ReplOutcome::Continue(out)
}

fn hole_args<'a>(
    command: &ReplCommand,
    rest: &'a [String],
) -> Result<(String, usize, &'a [String]), String> {
    match rest {
        [player, hole, extra @ ..] => {
            let hole = parse_hole(hole).ok_or_else(|| format!("Not a hole number: {hole}"))?;
            Ok((player.clone(), hole, extra))
        }
        _ => Err(usage_line(command)),
    }
}

async fn export_page(app: &App, path: &Path) -> Result<()> {
    let markup = render_page(&app.model);
    tokio::fs::write(path, markup.into_string())
        .await
        .with_context(|| format!("write {}", path.display()))
}
