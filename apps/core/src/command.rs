use std::fmt::{Display, Formatter};
use std::path::Path;

const EXECUTABLE_SUFFIX: &str = ".exe";

/// An uninstall command split into an executable path and its arguments.
/// Argument tokens keep whatever quoting the registry value carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub path: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    EmptyCommand,
    UnterminatedQuote(String),
    NoExecutable(String),
    MissingExecutable(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCommand => write!(f, "uninstall command is empty"),
            Self::UnterminatedQuote(command) => {
                write!(f, "invalid command format: {command}")
            }
            Self::NoExecutable(command) => {
                write!(f, "no executable found in command: {command}")
            }
            Self::MissingExecutable(path) => write!(f, "executable not found: {path}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a raw uninstall command against the real filesystem.
pub fn parse(command: &str) -> Result<ParsedCommand, ParseError> {
    parse_with(command, |candidate| Path::new(candidate).exists())
}

/// Parses a raw uninstall command, using `exists` to decide whether a
/// candidate executable path is present on disk.
///
/// Exactly two shapes are recognized, in order: a quoted path followed by
/// arguments, and an unquoted path found by accumulating space-separated
/// chunks until the text ends in `.exe`. This is deliberately not a shell
/// grammar; escaped quotes, nesting, and variable expansion are rejected
/// territory.
pub fn parse_with<F>(command: &str, exists: F) -> Result<ParsedCommand, ParseError>
where
    F: Fn(&str) -> bool,
{
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    if let Some(rest) = trimmed.strip_prefix('"') {
        let Some(end_quote) = rest.find('"') else {
            return Err(ParseError::UnterminatedQuote(trimmed.to_string()));
        };
        let path = &rest[..end_quote];
        if !exists(path) {
            return Err(ParseError::MissingExecutable(path.to_string()));
        }
        let args = split_argument_tokens(rest[end_quote + 1..].trim());
        return Ok(ParsedCommand {
            path: path.to_string(),
            args,
        });
    }

    parse_unquoted(trimmed, exists)
}

fn parse_unquoted<F>(command: &str, exists: F) -> Result<ParsedCommand, ParseError>
where
    F: Fn(&str) -> bool,
{
    let chunks: Vec<&str> = command.split(' ').filter(|part| !part.is_empty()).collect();

    let mut accumulated = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        if !accumulated.is_empty() {
            accumulated.push(' ');
        }
        accumulated.push_str(chunk);

        if !accumulated.to_ascii_lowercase().ends_with(EXECUTABLE_SUFFIX) {
            continue;
        }
        if !exists(&accumulated) {
            return Err(ParseError::MissingExecutable(accumulated));
        }
        let args = chunks[index + 1..].iter().map(|s| s.to_string()).collect();
        return Ok(ParsedCommand {
            path: accumulated,
            args,
        });
    }

    Err(ParseError::NoExecutable(command.to_string()))
}

/// Splits an argument string on unquoted spaces. Spaces inside a quoted
/// span stay in the token, and the quote characters are kept verbatim.
fn split_argument_tokens(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in args.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
