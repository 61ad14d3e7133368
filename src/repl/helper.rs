use crate::repl::commands::{CommandId, REPL_COMMANDS, find_command};
use rustyline::Helper;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::cell::RefCell;
use std::rc::Rc;

/// Names the completer can offer, refreshed after every command.
#[derive(Default)]
pub(crate) struct ReplHelperState {
    pub(crate) course_ids: Vec<String>,
    pub(crate) players: Vec<String>,
}

pub(crate) struct ReplHelper {
    state: Rc<RefCell<ReplHelperState>>,
}

impl ReplHelper {
    pub(crate) fn new(state: Rc<RefCell<ReplHelperState>>) -> Self {
        Self { state }
    }
}

fn pairs<'a>(items: impl Iterator<Item = &'a str>, prefix: &str, quote: bool) -> Vec<Pair> {
    items
        .filter(|item| item.starts_with(prefix))
        .map(|item| {
            let replacement = if quote && item.contains(char::is_whitespace) {
                format!("\"{item}\"")
            } else {
                item.to_string()
            };
            Pair {
                display: item.to_string(),
                replacement,
            }
        })
        .collect()
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let Some(space) = prefix.find(char::is_whitespace) else {
            let names = REPL_COMMANDS
                .iter()
                .flat_map(|command| command.aliases.iter().copied().chain([command.name]));
            return Ok((0, pairs(names, prefix, false)));
        };

        let command = find_command(&prefix[..space]).map(|c| c.id);
        let rest = prefix[space..].trim_start();
        // Only the first argument is completed.
        if rest.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let start = pos - rest.len();
        let state = self.state.borrow();
        let candidates = match command {
            Some(CommandId::Course) => pairs(state.course_ids.iter().map(String::as_str), rest, false),
            Some(CommandId::Score | CommandId::Up | CommandId::Down | CommandId::Ob) => {
                pairs(state.players.iter().map(String::as_str), rest, true)
            }
            _ => Vec::new(),
        };
        Ok((start, candidates))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}
