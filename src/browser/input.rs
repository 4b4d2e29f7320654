use clap::ValueEnum;

use crate::catalog::SortKey;

/// One line typed into an interactive browse session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text replaces the query.
    Query(String),
    Sort(SortKey),
    /// Scroll to the end of the list.
    More,
    Retry,
    /// 1-based row number, as printed.
    Open(usize),
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
Type to search. Commands:
  :sort primary|secondary   change ordering (also title, name, year, birth-date)
  :more                     load the next page
  :retry                    retry a failed page
  :open N                   show details for row N
  :quit                     leave";

pub fn parse_command(line: &str) -> Command {
    let Some(command) = line.strip_prefix(':') else {
        return Command::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();
    match (name, arg) {
        ("sort", Some(value)) => match SortKey::from_str(value, true) {
            Ok(sort) => Command::Sort(sort),
            Err(_) => Command::Invalid(format!("unknown sort {value:?}")),
        },
        ("more", None) => Command::More,
        ("retry", None) => Command::Retry,
        ("open", Some(value)) => match value.parse::<usize>() {
            Ok(row) if row > 0 => Command::Open(row),
            _ => Command::Invalid(format!("not a row number: {value:?}")),
        },
        ("help", None) => Command::Help,
        ("quit" | "q", None) => Command::Quit,
        _ => Command::Invalid(format!("unknown command {line:?}")),
    }
}
