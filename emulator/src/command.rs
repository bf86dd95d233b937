//! Console grammar.
//!
//! One command per line, keywords case-insensitive, arguments separated by
//! whitespace. Parsing is done with `winnow` combinators over the raw line.

use std::fmt;
use std::time::Duration;

use winnow::ascii::{Caseless, digit1, space0, space1};
use winnow::combinator::{alt, eof, opt, preceded, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{literal, rest};

/// Default number of latches listed by `history`.
pub const DEFAULT_HISTORY: usize = 12;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Get { channel: usize },
    Scaled { channel: usize },
    All,
    AllScaled,
    Cursor,
    Stats,
    History { limit: usize },
    Step { count: u64 },
    Pause,
    Resume,
    Watch { duration: Duration },
    Help { topic: Option<String> },
}

/// Rejected command line, with the byte offset where parsing stopped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandError {
    pub offset: usize,
    pub input: String,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (head, tail) = self.input.split_at(self.offset.min(self.input.len()));
        if tail.is_empty() {
            write!(f, "incomplete command `{head}`")
        } else {
            write!(f, "unexpected `{tail}` at column {}", self.offset + 1)
        }
    }
}

/// Parses one console line.
///
/// # Errors
///
/// Returns [`CommandError`] when the line matches no command.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    command.parse(line).map_err(|err| CommandError {
        offset: err.offset(),
        input: line.to_string(),
    })
}

fn command(input: &mut &str) -> ModalResult<Command> {
    terminated(
        alt((
            channel_command("get").map(|channel| Command::Get { channel }),
            channel_command("scaled").map(|channel| Command::Scaled { channel }),
            // Longer keyword first so `all` does not shadow it.
            keyword("all-scaled").value(Command::AllScaled),
            keyword("all").value(Command::All),
            keyword("cursor").value(Command::Cursor),
            keyword("stats").value(Command::Stats),
            history,
            step,
            keyword("pause").value(Command::Pause),
            keyword("resume").value(Command::Resume),
            watch,
            help,
        )),
        (space0, eof),
    )
    .parse_next(input)
}

fn keyword<'i>(name: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    literal(Caseless(name))
}

fn number<'i, T>(input: &mut &'i str) -> ModalResult<T>
where
    T: std::str::FromStr,
{
    digit1.parse_to().parse_next(input)
}

fn channel_command<'i>(name: &'static str) -> impl Parser<&'i str, usize, ErrMode<ContextError>> {
    preceded((keyword(name), space1), number::<usize>)
}

fn history(input: &mut &str) -> ModalResult<Command> {
    preceded(keyword("history"), opt(preceded(space1, number::<usize>)))
        .map(|limit| Command::History {
            limit: limit.unwrap_or(DEFAULT_HISTORY),
        })
        .parse_next(input)
}

fn step(input: &mut &str) -> ModalResult<Command> {
    preceded(keyword("step"), opt(preceded(space1, number::<u64>)))
        .map(|count| Command::Step {
            count: count.unwrap_or(1),
        })
        .parse_next(input)
}

/// `watch <seconds>`, with an optional `s` suffix.
fn watch(input: &mut &str) -> ModalResult<Command> {
    preceded(
        (keyword("watch"), space1),
        terminated(number::<u64>, opt(literal(Caseless("s")))),
    )
    .map(|secs| Command::Watch {
        duration: Duration::from_secs(secs),
    })
    .parse_next(input)
}

fn help(input: &mut &str) -> ModalResult<Command> {
    preceded(keyword("help"), opt(preceded(space1, rest)))
        .map(|topic: Option<&str>| Command::Help {
            topic: topic
                .map(str::trim)
                .filter(|topic| !topic.is_empty())
                .map(str::to_string),
        })
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_commands_take_an_index() {
        assert_eq!(parse("get 3"), Ok(Command::Get { channel: 3 }));
        assert_eq!(parse("  SCALED   5 "), Ok(Command::Scaled { channel: 5 }));
    }

    #[test]
    fn all_scaled_is_not_read_as_all() {
        assert_eq!(parse("all"), Ok(Command::All));
        assert_eq!(parse("all-scaled"), Ok(Command::AllScaled));
    }

    #[test]
    fn optional_counts_fall_back_to_defaults() {
        assert_eq!(
            parse("history"),
            Ok(Command::History {
                limit: DEFAULT_HISTORY
            })
        );
        assert_eq!(parse("history 4"), Ok(Command::History { limit: 4 }));
        assert_eq!(parse("step"), Ok(Command::Step { count: 1 }));
        assert_eq!(parse("step 100"), Ok(Command::Step { count: 100 }));
    }

    #[test]
    fn watch_accepts_a_seconds_suffix() {
        let expected = Ok(Command::Watch {
            duration: Duration::from_secs(2),
        });
        assert_eq!(parse("watch 2"), expected);
        assert_eq!(parse("watch 2s"), expected);
    }

    #[test]
    fn help_keeps_the_topic_text() {
        assert_eq!(parse("help"), Ok(Command::Help { topic: None }));
        assert_eq!(
            parse("help history"),
            Ok(Command::Help {
                topic: Some("history".to_string())
            })
        );
    }

    #[test]
    fn keywords_must_stand_alone() {
        assert!(parse("getx 1").is_err());
        assert!(parse("cursors").is_err());
        assert!(parse("pause now").is_err());
    }

    #[test]
    fn errors_point_at_the_rejected_text() {
        let err = parse("get two").unwrap_err();
        assert_eq!(err.to_string(), "unexpected `get two` at column 1");

        let err = parse("get 3 x").unwrap_err();
        assert_eq!(err.offset, 6);
        assert_eq!(err.to_string(), "unexpected `x` at column 7");
    }
}
