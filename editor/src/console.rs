use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

use assembly_tree::{ItemId, Position};
use parking_lot::Mutex;
use thiserror::Error;

use crate::history_listing;
use crate::log_capture::LogBuffer;
use crate::session::{ProjectSession, SessionError};

pub const HELP: &str = "\
commands:
  tree                                 show the assembly
  mv <item>... to <group> [start|end|after <item>]
  rename <item> <new name>
  mkgroup <name> in <group> [start|end|after <item>]
  group <name> <item>...               wrap items into a new group
  ungroup <group>
  rm <group>                           delete an empty group
  fuse <group>                         toggle fused
  collapse <group> | expand <group>
  undo | redo | history
  log [error|warn|info|debug|trace] [filter]
  quit
items are named by display name or by id (#3); quote names with spaces";

/// A console line that could not be carried out.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What the caller should do after a line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

/// Text front end of a [`ProjectSession`].
pub struct Console {
    session: ProjectSession,
    log: Option<Arc<Mutex<LogBuffer>>>,
    /// Reference time for displaying elapsed seconds.
    start_time: Instant,
}

impl Console {
    pub fn new(session: ProjectSession, log: Option<Arc<Mutex<LogBuffer>>>) -> Self {
        Self {
            session,
            log,
            start_time: Instant::now(),
        }
    }

    pub fn session(&self) -> &ProjectSession {
        &self.session
    }

    /// Runs one console line.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, ConsoleError> {
        let words = split_words(line);
        let Some((command, args)) = words.split_first() else {
            return Ok(Outcome::Print(String::new()));
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let message = match command.as_str() {
            "help" => HELP.to_owned(),
            "quit" | "exit" => return Ok(Outcome::Quit),
            "tree" => self.render_tree(),
            "mv" => self.move_items(&args)?,
            "rename" => self.rename(&args)?,
            "mkgroup" => self.make_group(&args)?,
            "group" => self.group(&args)?,
            "ungroup" => {
                let [group] = args.as_slice() else {
                    return Err(ConsoleError::Usage("ungroup <group>"));
                };
                let id = self.item(group)?;
                self.session.ungroup(id)?;
                self.render_tree()
            }
            "rm" => {
                let [group] = args.as_slice() else {
                    return Err(ConsoleError::Usage("rm <group>"));
                };
                let id = self.item(group)?;
                self.session.delete_group(id)?;
                self.render_tree()
            }
            "fuse" => {
                let [group] = args.as_slice() else {
                    return Err(ConsoleError::Usage("fuse <group>"));
                };
                let id = self.item(group)?;
                self.session.toggle_fuse(id)?;
                self.render_tree()
            }
            "collapse" | "expand" => {
                let [group] = args.as_slice() else {
                    return Err(ConsoleError::Usage("collapse|expand <group>"));
                };
                let id = self.item(group)?;
                let expanded = command == "expand";
                self.session
                    .display_mut()
                    .set_expanded(id, expanded)
                    .map_err(SessionError::from)?;
                self.render_tree()
            }
            "undo" => self.step(true)?,
            "redo" => self.step(false)?,
            "history" => history_listing::render(self.session.history()),
            "log" => self.render_log(&args),
            other => return Err(ConsoleError::UnknownCommand(other.to_owned())),
        };
        Ok(Outcome::Print(message))
    }

    /// The visible rows of the display tree.
    pub fn render_tree(&self) -> String {
        let model = self.session.model();
        let mut out = String::new();
        let root = model.root();
        let _ = writeln!(
            out,
            "{}{}",
            model.display().label(root).unwrap_or_default(),
            if self.session.has_unsaved_changes() { " *" } else { "" }
        );
        for row in model.display().rows() {
            let marker = match (row.is_group, row.expanded, row.child_count) {
                (false, ..) => "-",
                (true, _, 0) => "o",
                (true, true, _) => "v",
                (true, false, _) => ">",
            };
            let _ = writeln!(
                out,
                "{}{marker} {} {}{}",
                "  ".repeat(row.depth + 1),
                row.label,
                row.id,
                if row.fused { " [fused]" } else { "" }
            );
        }
        out
    }

    fn move_items(&mut self, args: &[&str]) -> Result<String, ConsoleError> {
        const USAGE: &str = "mv <item>... to <group> [start|end|after <item>]";
        let Some(to) = args.iter().position(|&a| a == "to") else {
            return Err(ConsoleError::Usage(USAGE));
        };
        let (items, rest) = (&args[..to], &args[to + 1..]);
        let Some((parent, place)) = rest.split_first() else {
            return Err(ConsoleError::Usage(USAGE));
        };
        if items.is_empty() {
            return Err(ConsoleError::Usage(USAGE));
        }

        let ids = items
            .iter()
            .map(|name| self.item(name))
            .collect::<Result<Vec<_>, _>>()?;
        let parent = self.item(parent)?;
        let position = self.position(place, USAGE)?;

        if self.session.move_items(&ids, parent, position)? {
            Ok(self.render_tree())
        } else {
            Ok("already there".to_owned())
        }
    }

    fn rename(&mut self, args: &[&str]) -> Result<String, ConsoleError> {
        let [item, name @ ..] = args else {
            return Err(ConsoleError::Usage("rename <item> <new name>"));
        };
        let id = self.item(item)?;
        if self.session.rename(id, &name.join(" "))? {
            Ok(self.render_tree())
        } else {
            Ok("name unchanged".to_owned())
        }
    }

    fn make_group(&mut self, args: &[&str]) -> Result<String, ConsoleError> {
        const USAGE: &str = "mkgroup <name> in <group> [start|end|after <item>]";
        let [name, "in", parent, place @ ..] = args else {
            return Err(ConsoleError::Usage(USAGE));
        };
        let parent = self.item(parent)?;
        let position = self.position(place, USAGE)?;
        self.session.create_group(name, parent, position)?;
        Ok(self.render_tree())
    }

    fn group(&mut self, args: &[&str]) -> Result<String, ConsoleError> {
        let [name, items @ ..] = args else {
            return Err(ConsoleError::Usage("group <name> <item>..."));
        };
        let ids = items
            .iter()
            .map(|item| self.item(item))
            .collect::<Result<Vec<_>, _>>()?;
        self.session.group_selection(&ids, name)?;
        Ok(self.render_tree())
    }

    fn step(&mut self, undo: bool) -> Result<String, ConsoleError> {
        let moved = if undo {
            self.session.undo()?
        } else {
            self.session.redo()?
        };
        if !moved {
            return Ok(if undo { "nothing to undo" } else { "nothing to redo" }.to_owned());
        }
        Ok(self.render_tree())
    }

    fn render_log(&self, args: &[&str]) -> String {
        let Some(buffer) = &self.log else {
            return "log capture is not installed".to_owned();
        };
        let (level, filter) = match args.split_first() {
            Some((first, rest)) => match first.parse::<log::Level>() {
                Ok(level) => (level, rest.join(" ")),
                Err(_) => (log::Level::Info, args.join(" ")),
            },
            None => (log::Level::Info, String::new()),
        };
        buffer
            .lock()
            .render(self.start_time, level, &filter)
            .join("\n")
    }

    /// Resolves `#n` or a display name.
    fn item(&self, reference: &str) -> Result<ItemId, ConsoleError> {
        if let Some(raw) = reference.strip_prefix('#')
            && let Ok(raw) = raw.parse::<u64>()
        {
            let id = ItemId::new(raw);
            if self.session.model().domain().contains(id) {
                return Ok(id);
            }
        }
        Ok(self.session.find_by_name(reference)?)
    }

    fn position(&self, place: &[&str], usage: &'static str) -> Result<Position, ConsoleError> {
        match place {
            [] | ["end"] => Ok(Position::AtEnd),
            ["start"] => Ok(Position::AtStart),
            ["after", item] => Ok(Position::After(self.item(item)?)),
            _ => Err(ConsoleError::Usage(usage)),
        }
    }
}

/// Splits a line on whitespace, keeping double-quoted runs together.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_word = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                has_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if has_word {
        words.push(current);
    }
    words
}
