//! Text command intake.
//!
//! Accepted forms:
//!   • `/add BTC/USDT 100000` (leading slash optional)
//!   • `BTCUSDT:100000` shorthand for add
//!   • `/remove <alert id>`, `/list`, `/help`

use corelib::{AlertId, AlertRequest, ValidationError};
use thiserror::Error;

pub const USAGE: &str = "Usage:   add BASE/QUOTE PRICE   |   BASEQUOTE:PRICE   |   remove ID   |   list\nExample:   add BTC/USDT 100000";

const SHORTHAND_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(AlertRequest),
    Remove(AlertId),
    List,
    Help,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("empty command\n{usage}", usage = USAGE)]
    Empty,

    #[error("unknown command '{0}'\n{usage}", usage = USAGE)]
    Unknown(String),

    #[error("wrong number of arguments for '{0}'\n{usage}", usage = USAGE)]
    Arity(&'static str),

    #[error("{0}\n{usage}", usage = USAGE)]
    Invalid(#[from] ValidationError),

    #[error("'{0}' is not an alert id")]
    BadId(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let mut words = line.split_whitespace();

    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = words.collect();
    let name = head.trim_start_matches('/').to_ascii_lowercase();

    match name.as_str() {
        "add" => match args.as_slice() {
            [pair, price] => Ok(Command::Add(AlertRequest::parse(pair, price)?)),
            _ => Err(CommandError::Arity("add")),
        },
        "remove" | "rm" | "delete" => match args.as_slice() {
            [id] => id
                .parse()
                .map(Command::Remove)
                .map_err(|_| CommandError::BadId(id.to_string())),
            _ => Err(CommandError::Arity("remove")),
        },
        "list" | "ls" if args.is_empty() => Ok(Command::List),
        "help" | "start" if args.is_empty() => Ok(Command::Help),
        _ if args.is_empty() && head.contains(SHORTHAND_SEPARATOR) => parse_shorthand(head),
        _ => Err(CommandError::Unknown(head.to_string())),
    }
}

/// `BTCUSDT:100000`
fn parse_shorthand(text: &str) -> Result<Command, CommandError> {
    let (pair, price) = text
        .split_once(SHORTHAND_SEPARATOR)
        .ok_or_else(|| CommandError::Unknown(text.to_string()))?;
    Ok(Command::Add(AlertRequest::parse(pair, price)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Pair;

    fn add(pair: Pair, threshold: f64) -> Command {
        Command::Add(AlertRequest::new(pair, threshold).unwrap())
    }

    #[test]
    fn parses_add_in_both_forms() {
        assert_eq!(
            parse_command("/add btc/usdt 100000").unwrap(),
            add(Pair::new("BTC", "USDT"), 100_000.0)
        );
        assert_eq!(
            parse_command("add ETH/BTC 0.05").unwrap(),
            add(Pair::new("ETH", "BTC"), 0.05)
        );
        assert_eq!(
            parse_command("BTCUSDT:100000").unwrap(),
            add(Pair::new("BTC", "USDT"), 100_000.0)
        );
    }

    #[test]
    fn rejects_malformed_adds() {
        assert!(matches!(
            parse_command("/add BTC/ 5"),
            Err(CommandError::Invalid(ValidationError::MalformedPair(_)))
        ));
        assert!(matches!(
            parse_command("/add BTC/USDT -1"),
            Err(CommandError::Invalid(ValidationError::NonPositivePrice(_)))
        ));
        assert!(matches!(
            parse_command("/add BTC/USDT abc"),
            Err(CommandError::Invalid(ValidationError::InvalidPrice(_)))
        ));
        assert!(matches!(
            parse_command("/add BTC/USDT"),
            Err(CommandError::Arity("add"))
        ));
        assert!(matches!(
            parse_command("BTCUSDT:"),
            Err(CommandError::Invalid(_))
        ));
    }

    #[test]
    fn parses_remove_list_and_help() {
        let id = AlertId::new();
        assert_eq!(
            parse_command(&format!("/remove {id}")).unwrap(),
            Command::Remove(id)
        );
        assert_eq!(parse_command("list").unwrap(), Command::List);
        assert_eq!(parse_command("/help").unwrap(), Command::Help);
        assert!(matches!(
            parse_command("remove 12"),
            Err(CommandError::BadId(_))
        ));
    }

    #[test]
    fn unknown_and_empty_input() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert!(matches!(
            parse_command("/buy BTC"),
            Err(CommandError::Unknown(_))
        ));
    }

    #[test]
    fn errors_carry_usage_hint() {
        let err = parse_command("/add BTC/USDT abc").unwrap_err();
        assert!(err.to_string().contains("Usage:"));
    }
}
