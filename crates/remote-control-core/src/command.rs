//! Command line tokenization
//!
//! A command is one line of text: `GET <path>` or `SET <path> <value>`.
//! Tokens are separated by runs of whitespace; empty tokens are discarded.

/// Reason given for a line with no tokens
pub const EMPTY_COMMAND: &str = "Empty command";

/// Reason given for any line that is not a well-formed GET or SET
pub const INVALID_FORMAT: &str = "Invalid command format. Use: GET /path or SET /path value";

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read the property at `path`
    Get { path: String },
    /// Write `value` to the property at `path`
    Set { path: String, value: String },
    /// Line could not be classified; carries the reason reported to the client
    Invalid(String),
}

impl Command {
    /// Classify one line of input.
    ///
    /// Tokens beyond the ones a verb needs are ignored, so `GET /a /b`
    /// reads `/a` and `SET /a 1 2` writes `1`.
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some(verb) = tokens.first() else {
            return Command::Invalid(EMPTY_COMMAND.to_string());
        };

        if verb.eq_ignore_ascii_case("GET") && tokens.len() >= 2 {
            Command::Get {
                path: tokens[1].to_string(),
            }
        } else if verb.eq_ignore_ascii_case("SET") && tokens.len() >= 3 {
            Command::Set {
                path: tokens[1].to_string(),
                value: tokens[2].to_string(),
            }
        } else {
            Command::Invalid(INVALID_FORMAT.to_string())
        }
    }
}
