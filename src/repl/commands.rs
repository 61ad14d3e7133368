#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CommandId {
    Help,
    Courses,
    Course,
    Add,
    Score,
    Up,
    Down,
    Ob,
    Card,
    Save,
    Rounds,
    Delete,
    SignUp,
    Login,
    Logout,
    WhoAmI,
    Export,
    Exit,
    Quit,
}

pub(crate) struct ReplCommand {
    pub(crate) id: CommandId,
    pub(crate) name: &'static str,
    pub(crate) usage: &'static str,
    pub(crate) description: &'static str,
    pub(crate) aliases: &'static [&'static str],
}

pub(crate) const REPL_COMMANDS: &[ReplCommand] = &[
    ReplCommand {
        id: CommandId::Help,
        name: "help",
        usage: "",
        description: "Show this help.",
        aliases: &["?", "-h", "--help"],
    },
    ReplCommand {
        id: CommandId::Courses,
        name: "courses",
        usage: "",
        description: "List the course catalog.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Course,
        name: "course",
        usage: "<id>",
        description: "Pick a course and start an empty card.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Add,
        name: "add",
        usage: "<name>",
        description: "Add a player (quote names with spaces).",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Score,
        name: "score",
        usage: "<player> <hole> [throws]",
        description: "Set a hole's throws; leave out throws to clear it.",
        aliases: &["s"],
    },
    ReplCommand {
        id: CommandId::Up,
        name: "up",
        usage: "<player> <hole>",
        description: "One more throw on a hole.",
        aliases: &["+"],
    },
    ReplCommand {
        id: CommandId::Down,
        name: "down",
        usage: "<player> <hole>",
        description: "One throw less on a hole (never below 1).",
        aliases: &["-"],
    },
    ReplCommand {
        id: CommandId::Ob,
        name: "ob",
        usage: "<player> <hole> [reset]",
        description: "Add an OB penalty stroke, or take them all back.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Card,
        name: "card",
        usage: "",
        description: "Show the scorecard.",
        aliases: &["c"],
    },
    ReplCommand {
        id: CommandId::Save,
        name: "save",
        usage: "",
        description: "Save the round (cloud when logged in, this device otherwise).",
        aliases: &["tallenna"],
    },
    ReplCommand {
        id: CommandId::Rounds,
        name: "rounds",
        usage: "",
        description: "Show saved rounds.",
        aliases: &["history"],
    },
    ReplCommand {
        id: CommandId::Delete,
        name: "delete",
        usage: "<n>",
        description: "Delete saved round number n.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::SignUp,
        name: "signup",
        usage: "<email> <password>",
        description: "Create an account and log in.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Login,
        name: "login",
        usage: "<email> <password>",
        description: "Log in; saved rounds switch to the cloud.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Logout,
        name: "logout",
        usage: "",
        description: "Log out; saved rounds switch to this device.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::WhoAmI,
        name: "whoami",
        usage: "",
        description: "Show who is logged in.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Export,
        name: "export",
        usage: "<path>",
        description: "Write the card and history as an HTML page.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Exit,
        name: "exit",
        usage: "",
        description: "Exit.",
        aliases: &[],
    },
    ReplCommand {
        id: CommandId::Quit,
        name: "quit",
        usage: "",
        description: "Exit.",
        aliases: &["q"],
    },
];

pub(crate) fn find_command(name: &str) -> Option<&'static ReplCommand> {
    REPL_COMMANDS
        .iter()
        .find(|command| command.name == name || command.aliases.contains(&name))
}

pub(crate) fn usage_line(command: &ReplCommand) -> String {
    if command.usage.is_empty() {
        format!("usage: {}", command.name)
    } else {
        format!("usage: {} {}", command.name, command.usage)
    }
}

pub(crate) fn build_repl_help() -> String {
    let mut help = String::from("Commands:");
    for command in REPL_COMMANDS {
        let mut names = command.name.to_string();
        for alias in command.aliases {
            names.push_str(", ");
            names.push_str(alias);
        }
        if !command.usage.is_empty() {
            names.push(' ');
            names.push_str(command.usage);
        }
        help.push_str("\n  ");
        help.push_str(&names);
        let padding = 36usize.saturating_sub(names.len());
        help.push_str(&" ".repeat(padding.max(2)));
        help.push_str(command.description);
    }
    help
}
