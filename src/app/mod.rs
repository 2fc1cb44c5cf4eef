mod config;

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::{Command, Listing, NoteName, NoteRef};
use crate::input::{Action, map_action, parse_line};
use crate::io::{NoteStore, ReadMode, StoreError};
use crate::render::PreviewFormat;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "mdnotes - Markdown notes in a flat directory")]
struct Cli {
    /// Store directory (overrides the config file)
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Report missing or undecodable notes instead of reading them as empty
    #[arg(long, global = true)]
    strict: bool,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    action: Action,
}

pub struct App {
    store: NoteStore,
    listing: Listing,
    preview_format: PreviewFormat,
}

impl App {
    pub fn new(store: NoteStore, preview_format: PreviewFormat) -> Self {
        let listing = match store.list() {
            Ok(names) => Listing::new(names),
            Err(err) => {
                tracing::warn!(error = %err, "starting with an empty note listing");
                Listing::default()
            }
        };
        Self {
            store,
            listing,
            preview_format,
        }
    }

    fn refresh_listing(&mut self) {
        match self.store.list() {
            Ok(names) => self.listing.replace(names),
            Err(err) => tracing::warn!(error = %err, "keeping previous note listing"),
        }
    }

    /// Turns a reference into a concrete name against the current snapshot.
    fn resolve(&self, target: &NoteRef) -> Result<NoteName> {
        match target {
            NoteRef::Name(raw) => {
                NoteName::parse(raw).with_context(|| format!("invalid note name {raw:?}"))
            }
            NoteRef::Index(index) => index
                .checked_sub(1)
                .and_then(|i| self.listing.get(i))
                .cloned()
                .with_context(|| {
                    format!(
                        "no note #{index} in the current listing ({} notes)",
                        self.listing.len()
                    )
                }),
            NoteRef::Selected => self
                .listing
                .selected()
                .cloned()
                .context("no note selected"),
        }
    }

    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<()> {
        match cmd {
            Command::List { json } => {
                self.refresh_listing();
                if json {
                    serde_json::to_writer_pretty(&mut *out, self.listing.entries())
                        .context("serializing listing")?;
                    writeln!(out)?;
                } else if self.listing.is_empty() {
                    writeln!(out, "(no notes)")?;
                } else {
                    let selected = self.listing.selected();
                    for (idx, name) in self.listing.entries().iter().enumerate() {
                        let mark = if selected == Some(name) { '*' } else { ' ' };
                        writeln!(out, "{mark} {:>3}  {name}", idx + 1)?;
                    }
                }
            }
            Command::Show { target, json } => {
                let name = self.resolve(&target)?;
                let note = self.store.load(name.as_str())?;
                if json {
                    serde_json::to_writer_pretty(&mut *out, &note).context("serializing note")?;
                    writeln!(out)?;
                } else {
                    out.write_all(note.content.as_bytes())?;
                    if !note.content.is_empty() && !note.content.ends_with('\n') {
                        writeln!(out)?;
                    }
                }
                self.listing.select(&name);
            }
            Command::Write { name, content } => {
                let content = content.context("no note content given; pass --text")?;
                let assigned = self.store.write(name.as_deref(), &content)?;
                self.refresh_listing();
                self.listing.select(&assigned);
                writeln!(out, "{assigned}")?;
            }
            Command::Rename { from, to } => {
                let from = self.resolve(&from)?;
                let renamed = self.store.rename(from.as_str(), &to)?;
                self.refresh_listing();
                self.listing.select(&renamed);
                writeln!(out, "renamed {from} -> {renamed}")?;
            }
            Command::Delete(target) => {
                let name = self.resolve(&target)?;
                match self.store.delete(name.as_str()) {
                    Ok(()) => {}
                    Err(err @ StoreError::NotFound { .. }) => {
                        self.listing.remove(&name);
                        return Err(err.into());
                    }
                    Err(err) => return Err(err.into()),
                }
                self.listing.remove(&name);
                writeln!(out, "deleted {name}")?;
            }
            Command::Preview { target, format } => {
                let name = self.resolve(&target)?;
                let content = self.store.read(name.as_str())?;
                let renderer = format.unwrap_or(self.preview_format).renderer();
                out.write_all(renderer.render(&content).as_bytes())?;
                self.listing.select(&name);
            }
            Command::Select(target) => {
                let name = self.resolve(&target)?;
                if !self.listing.contains(&name) {
                    bail!("{name} is not in the current listing");
                }
                self.listing.select(&name);
                writeln!(out, "selected {name}")?;
            }
            Command::ShowRoot => {
                writeln!(out, "{}", self.store.root().display())?;
            }
        }
        Ok(())
    }

    /// Runs commands read line by line until `quit`, `exit`, or end of input.
    pub fn run_shell<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading shell input")?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if matches!(trimmed, "quit" | "exit") {
                break;
            }

            match parse_line(trimmed) {
                Ok(Some(cmd)) => {
                    if let Err(err) = self.execute(cmd, out) {
                        writeln!(out, "error: {err:#}")?;
                    }
                }
                Ok(None) => writeln!(out, "error: already in a shell")?,
                Err(err) => writeln!(out, "{}", err.to_string().trim_end())?,
            }
            out.flush()?;
        }
        Ok(())
    }
}

fn init_logging(verbose: u8, config: &AppConfig) -> Result<()> {
    let level = match verbose {
        0 => config.log_filter()?,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(level)
        .try_init();
    Ok(())
}

fn read_stdin_content(cmd: Command) -> Result<Command> {
    match cmd {
        Command::Write {
            name,
            content: None,
        } => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("reading note content from stdin")?;
            Ok(Command::Write {
                name,
                content: Some(content),
            })
        }
        other => Ok(other),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(cli.verbose, &config)?;

    let notes_root = match cli.root {
        Some(root) => root,
        None => config.notes_root()?,
    };
    let read_mode = if cli.strict {
        ReadMode::Strict
    } else {
        config.read_mode
    };
    let store = NoteStore::open(&notes_root)
        .with_context(|| format!("opening notes root {}", notes_root.display()))?
        .with_read_mode(read_mode);
    tracing::debug!(root = %notes_root.display(), ?read_mode, "opened note store");

    let mut app = App::new(store, config.preview_format);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match map_action(cli.action) {
        Some(cmd) => app.execute(read_stdin_content(cmd)?, &mut out),
        None => app.run_shell(io::stdin().lock(), &mut out),
    }
}
