use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::core::{Command, NoteRef};
use crate::render::PreviewFormat;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// List the notes in the store
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the raw Markdown of a note (NAME, #INDEX, or the selection)
    Show {
        #[arg(value_name = "NOTE")]
        target: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Create or overwrite a note; content is read from stdin unless --text is given
    Write {
        #[arg(value_name = "NAME")]
        name: Option<String>,
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Rename a note without overwriting an existing one
    #[command(alias = "mv")]
    Rename {
        #[arg(value_name = "NOTE")]
        from: String,
        #[arg(value_name = "NEW_NAME")]
        to: String,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        #[arg(value_name = "NOTE")]
        target: Option<String>,
    },
    /// Render a note for reading
    Preview {
        #[arg(value_name = "NOTE")]
        target: Option<String>,
        #[arg(long, value_enum)]
        format: Option<PreviewFormat>,
    },
    /// Select a note in the current listing
    Select {
        #[arg(value_name = "NOTE")]
        target: String,
    },
    /// Print the store directory
    Path,
    /// Read commands line by line from stdin
    Shell,
}

#[derive(Parser, Debug)]
#[command(name = "mdnotes", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("unterminated quote in {0:?}")]
    UnterminatedQuote(String),
    #[error("{0}")]
    Clap(#[from] clap::Error),
}

/// `None` for actions that are not note commands (the shell itself).
pub fn map_action(action: Action) -> Option<Command> {
    let cmd = match action {
        Action::List { json } => Command::List { json },
        Action::Show { target, json } => Command::Show {
            target: NoteRef::parse(target.as_deref()),
            json,
        },
        Action::Write { name, text } => Command::Write {
            name: name.map(|n| n.trim().to_string()),
            content: text,
        },
        Action::Rename { from, to } => Command::Rename {
            from: NoteRef::parse(Some(&from)),
            to: to.trim().to_string(),
        },
        Action::Delete { target } => Command::Delete(NoteRef::parse(target.as_deref())),
        Action::Preview { target, format } => Command::Preview {
            target: NoteRef::parse(target.as_deref()),
            format,
        },
        Action::Select { target } => Command::Select(NoteRef::parse(Some(&target))),
        Action::Path => Command::ShowRoot,
        Action::Shell => return None,
    };
    Some(cmd)
}

pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let words = split_words(line)?;
    let parsed = ShellLine::try_parse_from(words)?;
    Ok(map_action(parsed.action))
}

fn split_words(line: &str) -> Result<Vec<String>, InputError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(InputError::UnterminatedQuote(line.to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
