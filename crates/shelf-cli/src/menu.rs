//! Interactive menu
//!
//! The numbered text menu shown when `shelf` runs without a subcommand.
//! Every action returns to the menu; no error ends the session. End of
//! input behaves like choosing Quit.

use std::io::{self, BufRead, Write};
use std::num::{IntErrorKind, ParseIntError};

use anyhow::{bail, Context};
use shelf_core::{
    CollectionError, Config, LoadOrigin, MediaKind, Position, PositionError, Record, RecordPatch,
    SearchField, StorageError, Store, StoreError,
};
use thiserror::Error;
use tracing::debug;

use crate::output::{entry_lines, SEPARATOR};
use crate::prompt::Prompter;

/// Typed in an edit prompt to clear a field
pub const CLEAR_MARKER: &str = "-";

const MAIN_OPTIONS: usize = 7;

const MOVE_ASIDE_STARTUP: &str =
    "Move the unreadable file aside and start with an empty collection?";
const MOVE_ASIDE_RELOAD: &str = "Move the unreadable file aside and save the records shown here?";

/// Why a menu selection was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("Please enter a valid number.")]
    NotANumber,
    #[error("Invalid option.")]
    OutOfRange,
}

/// Parse a selection from a menu with options numbered `1..=options`
pub fn parse_choice(input: &str, options: usize) -> Result<usize, ChoiceError> {
    let n: i64 = input.trim().parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ChoiceError::OutOfRange,
        _ => ChoiceError::NotANumber,
    })?;
    usize::try_from(n)
        .ok()
        .filter(|n| (1..=options).contains(n))
        .ok_or(ChoiceError::OutOfRange)
}

/// Interpret an edit prompt answer
///
/// Blank keeps the current value, [`CLEAR_MARKER`] clears it, anything
/// else replaces it.
pub fn parse_field_edit(input: &str) -> Option<String> {
    match input.trim() {
        "" => None,
        CLEAR_MARKER => Some(String::new()),
        value => Some(value.to_string()),
    }
}

/// Open the collection for an interactive session
///
/// Reports a missing or empty file. An unreadable file is moved aside
/// only if the user agrees; otherwise opening fails and the file is left
/// untouched.
pub fn open_session<R: BufRead, W: Write>(
    config: Config,
    io: &mut Prompter<R, W>,
) -> anyhow::Result<Store> {
    let store = match Store::open_with_config(config.clone()) {
        Ok(store) => store,
        Err(e) if e.is_unreadable_document() => {
            io.say(e.to_string())?;
            if let Some(hint) = e.recovery_suggestion() {
                io.say(hint)?;
            }
            if io.confirm(MOVE_ASIDE_STARTUP)? != Some(true) {
                bail!("Aborted; the collection file was left untouched.");
            }
            let (store, backup_path) = Store::recover(config)
                .context("Failed to move the unreadable collection aside")?;
            io.say(format!("Moved the old file to {}.", backup_path.display()))?;
            return Ok(store);
        }
        Err(e) => return Err(e).context("Failed to open collection"),
    };

    match store.origin() {
        LoadOrigin::Missing => io.say(format!(
            "No collection file found at {}. A new one will be created when you add a record.",
            store.path().display()
        ))?,
        LoadOrigin::Empty => io.say(format!(
            "Collection file {} is empty; starting with an empty collection.",
            store.path().display()
        ))?,
        LoadOrigin::Existing => {}
    }
    Ok(store)
}

/// Whether the session continues after a sub-menu returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Back,
    Exit,
}

/// Outcome of reading one answer
enum Answer<T> {
    Value(T),
    Invalid,
    Eof,
}

/// Menu session over a store
pub struct Menu<R, W> {
    store: Store,
    io: Prompter<R, W>,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(store: Store, input: R, output: W) -> Self {
        Self {
            store,
            io: Prompter::new(input, output),
        }
    }

    /// Run until the user quits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.io.say(SEPARATOR)?;
            self.io.say("        +-+-+-+-+ Welcome +-+-+-+-+")?;
            self.io.say(SEPARATOR)?;
            self.io.say("1. Add a record")?;
            self.io.say("2. List records")?;
            self.io.say("3. Search records")?;
            self.io.say("4. Edit a record")?;
            self.io.say("5. Delete a record")?;
            self.io.say("6. Reload from disk")?;
            self.io.say("7. Quit")?;
            self.io.say(SEPARATOR)?;

            let choice = match self.choose("Choose an option: ", MAIN_OPTIONS)? {
                Answer::Value(choice) => choice,
                Answer::Invalid => continue,
                Answer::Eof => return self.quit(),
            };
            debug!("Main menu choice {}", choice);

            let flow = match choice {
                1 => self.add_menu()?,
                2 => self.list_menu()?,
                3 => self.search_menu()?,
                4 => self.edit_menu()?,
                5 => self.delete_menu()?,
                6 => {
                    self.reload()?;
                    Flow::Back
                }
                _ => Flow::Exit,
            };

            if flow == Flow::Exit {
                return self.quit();
            }
        }
    }

    /// Finish the session, returning the store and the streams
    pub fn into_parts(self) -> (Store, R, W) {
        let (input, output) = self.io.into_parts();
        (self.store, input, output)
    }

    // ==================== Sub-menus ====================

    fn add_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.heading("*** ADD ***")?;
            self.io.say("1. Add a book")?;
            self.io.say("2. Add a film")?;
            self.io.say("3. Add music")?;
            self.io.say("4. Back")?;
            self.io.say(SEPARATOR)?;

            let kind = match self.choose("Choose an option: ", 4)? {
                Answer::Value(4) => return self.back(),
                Answer::Value(n) => MediaKind::ALL[n - 1],
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            };

            let creator_prompt = format!("Enter the {}: ", kind.creator_role());
            let mut fields = Vec::with_capacity(4);
            let prompts = [
                "Enter the title: ",
                creator_prompt.as_str(),
                "Enter the genre: ",
                "Enter the rating: ",
            ];
            for prompt in prompts {
                match self.io.ask(prompt)? {
                    Some(value) => fields.push(value.trim().to_string()),
                    None => return Ok(Flow::Exit),
                }
            }
            let mut fields = fields.into_iter();
            let mut next = || fields.next().unwrap_or_default();
            let record = Record::new(kind, next())
                .with_creator(next())
                .with_genre(next())
                .with_rating(next());

            match self.store.add(record) {
                Ok(_) => self.io.say(format!("{} added.", kind))?,
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn list_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.heading("*** LIST ***")?;
            self.io.say("1. All records")?;
            self.io.say("2. Grouped by category")?;
            self.io.say("3. Back")?;
            self.io.say(SEPARATOR)?;

            match self.choose("Choose an option: ", 3)? {
                Answer::Value(1) => {
                    self.io.say(SEPARATOR)?;
                    self.show_collection()?;
                    self.io.say(SEPARATOR)?;
                }
                Answer::Value(2) => {
                    for kind in MediaKind::ALL {
                        self.io.say(SEPARATOR)?;
                        self.io.say(format!("=== {} ===", kind.plural()))?;
                        let entries = self.store.list(Some(kind));
                        let lines = entry_lines(&entries, "The collection is empty.");
                        self.say_all(lines)?;
                    }
                }
                Answer::Value(_) => return self.back(),
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            }
        }
    }

    fn search_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.heading("*** SEARCH ***")?;
            self.io.say("1. By title")?;
            self.io.say("2. By creator or genre")?;
            self.io.say("3. Back")?;
            self.io.say(SEPARATOR)?;

            let (field, prompt) = match self.choose("Choose an option: ", 3)? {
                Answer::Value(1) => (SearchField::Title, "Enter the title to search for: "),
                Answer::Value(2) => (
                    SearchField::CreatorOrGenre,
                    "Enter the creator or genre to search for: ",
                ),
                Answer::Value(_) => return self.back(),
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            };

            let Some(needle) = self.io.ask(prompt)? else {
                return Ok(Flow::Exit);
            };
            let hits = self.store.search(field, needle.trim());
            let lines = entry_lines(&hits, "No matching records.");
            self.say_all(lines)?;
        }
    }

    fn edit_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.heading("*** EDIT ***")?;
            self.show_collection()?;
            self.io.say(SEPARATOR)?;
            self.io.say("1. Edit a record")?;
            self.io.say("2. Back")?;
            self.io.say(SEPARATOR)?;

            match self.choose("Choose an option: ", 2)? {
                Answer::Value(1) => {}
                Answer::Value(_) => return self.back(),
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            }

            if self.store.is_empty() {
                self.io.say("The collection is empty.")?;
                continue;
            }

            let prompt = "Enter the number of the record to edit: ";
            let (position, current) = match self.pick_position(prompt)? {
                Answer::Value(picked) => picked,
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            };

            self.io.say(format!(
                "Editing: {} (leave blank to keep, '{}' to clear)",
                current.title, CLEAR_MARKER
            ))?;

            let prompts = [
                format!("New title [{}]: ", current.title),
                format!("New {} [{}]: ", current.kind.creator_role(), current.creator),
                format!("New genre [{}]: ", current.genre),
                format!("New rating [{}]: ", current.rating),
            ];
            let mut answers = Vec::with_capacity(prompts.len());
            for prompt in &prompts {
                match self.io.ask(prompt)? {
                    Some(answer) => answers.push(parse_field_edit(&answer)),
                    None => return Ok(Flow::Exit),
                }
            }
            let mut answers = answers.into_iter();
            let patch = RecordPatch {
                title: answers.next().flatten(),
                creator: answers.next().flatten(),
                genre: answers.next().flatten(),
                rating: answers.next().flatten(),
            };

            if patch.is_empty() {
                self.io.say("Nothing changed.")?;
                continue;
            }

            match self.store.edit(position, patch) {
                Ok(_) => self.io.say("Record updated.")?,
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn delete_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.heading("*** DELETE ***")?;
            self.show_collection()?;
            self.io.say(SEPARATOR)?;
            self.io.say("1. Delete a record")?;
            self.io.say("2. Back")?;
            self.io.say(SEPARATOR)?;

            match self.choose("Choose an option: ", 2)? {
                Answer::Value(1) => {}
                Answer::Value(_) => return self.back(),
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            }

            if self.store.is_empty() {
                self.io.say("The collection is empty.")?;
                continue;
            }

            let prompt = "Enter the number of the record to delete: ";
            let (position, current) = match self.pick_position(prompt)? {
                Answer::Value(picked) => picked,
                Answer::Invalid => continue,
                Answer::Eof => return Ok(Flow::Exit),
            };

            match self.store.delete(position) {
                Ok(removed) => self.io.say(format!("'{}' deleted.", removed.title))?,
                Err(e @ StoreError::NotSaved(_)) => {
                    self.io.say(format!("'{}' deleted.", current.title))?;
                    self.report(&e)?;
                }
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn reload(&mut self) -> io::Result<()> {
        match self.store.reload() {
            Ok(_) => self.io.say(format!(
                "Reloaded {} record(s) from {}.",
                self.store.len(),
                self.store.path().display()
            )),
            Err(StoreError::Storage(e)) if e.is_unreadable_document() => {
                self.io.say(format!("Could not read the collection: {}", e))?;
                if self.io.confirm(MOVE_ASIDE_RELOAD)? != Some(true) {
                    return self.io.say(
                        "The file was left untouched. Changes are disabled until it is fixed \
                         and reloaded.",
                    );
                }
                match self.store.set_aside_unreadable() {
                    Ok(backup_path) => self.io.say(format!(
                        "Moved the old file to {} and saved {} record(s).",
                        backup_path.display(),
                        self.store.len()
                    )),
                    Err(e) => self.report(&StoreError::NotSaved(e)),
                }
            }
            Err(e) => self.report(&e),
        }
    }

    fn quit(&mut self) -> io::Result<()> {
        if self.store.is_dirty() {
            if let Err(e) = self.store.flush() {
                self.io.say(format!("Unsaved changes could not be written: {}", e))?;
            }
        }
        self.io.say("Goodbye.")
    }

    // ==================== Helpers ====================

    fn heading(&mut self, title: &str) -> io::Result<()> {
        self.io.say(SEPARATOR)?;
        self.io.say(title)?;
        self.io.say(SEPARATOR)
    }

    fn back(&mut self) -> io::Result<Flow> {
        self.io.say("Going back...")?;
        Ok(Flow::Back)
    }

    fn show_collection(&mut self) -> io::Result<()> {
        let lines = entry_lines(&self.store.list(None), "The collection is empty.");
        self.say_all(lines)
    }

    fn say_all(&mut self, lines: Vec<String>) -> io::Result<()> {
        for line in lines {
            self.io.say(line)?;
        }
        Ok(())
    }

    /// Read a menu selection, reporting rejected input
    fn choose(&mut self, prompt: &str, options: usize) -> io::Result<Answer<usize>> {
        let Some(input) = self.io.ask(prompt)? else {
            return Ok(Answer::Eof);
        };
        match parse_choice(&input, options) {
            Ok(choice) => Ok(Answer::Value(choice)),
            Err(e) => {
                self.io.say(e.to_string())?;
                Ok(Answer::Invalid)
            }
        }
    }

    /// Read a record position and look the record up
    fn pick_position(&mut self, prompt: &str) -> io::Result<Answer<(Position, Record)>> {
        let Some(input) = self.io.ask(prompt)? else {
            return Ok(Answer::Eof);
        };
        let position = match Position::parse(&input) {
            Ok(position) => position,
            Err(PositionError::NotANumber(_)) => {
                self.io.say(ChoiceError::NotANumber.to_string())?;
                return Ok(Answer::Invalid);
            }
            Err(PositionError::Invalid(_)) => {
                self.io.say("Invalid number.")?;
                return Ok(Answer::Invalid);
            }
        };
        match self.store.get(position) {
            Some(record) => Ok(Answer::Value((position, record.clone()))),
            None => {
                self.io.say("Invalid number.")?;
                Ok(Answer::Invalid)
            }
        }
    }

    fn report(&mut self, error: &StoreError) -> io::Result<()> {
        match error {
            StoreError::Collection(CollectionError::InvalidPosition { .. }) => {
                self.io.say("Invalid number.")
            }
            StoreError::NotSaved(e) => {
                self.io.say(format!("Could not save the collection: {}", e))?;
                if let Some(hint) = e.recovery_suggestion() {
                    self.io.say(hint)?;
                }
                Ok(())
            }
            StoreError::Storage(e @ StorageError::SavesHeld { .. }) => {
                self.io.say(format!("Changes are disabled: {}", e))?;
                if let Some(hint) = e.recovery_suggestion() {
                    self.io.say(hint)?;
                }
                Ok(())
            }
            StoreError::Storage(e) => {
                self.io.say(format!("Could not read the collection: {}", e))?;
                if let Some(hint) = e.recovery_suggestion() {
                    self.io.say(hint)?;
                }
                Ok(())
            }
        }
    }
}
