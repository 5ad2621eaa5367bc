//! Record command handlers

use anyhow::{bail, Context, Result};

use shelf_core::{Entry, MediaKind, Position, Record, RecordPatch, SearchField, Store};

use crate::output::Output;
use crate::prompt::confirm;

/// Fields for a new record
pub struct NewRecord {
    pub kind: MediaKind,
    pub title: String,
    pub creator: String,
    pub genre: String,
    pub rating: String,
}

/// Add a record at the end of the collection
pub fn add(store: &mut Store, new: NewRecord, output: &Output) -> Result<()> {
    let record = Record::new(new.kind, new.title)
        .with_creator(new.creator)
        .with_genre(new.genre)
        .with_rating(new.rating);

    let position = store.add(record).context("Failed to add record")?;

    output.success(&format!("{} added at position {}", new.kind, position));
    if let Some(record) = store.get(position) {
        output.print_record(Entry { position, record });
    }

    Ok(())
}

/// List records, optionally filtered by kind or grouped into sections
pub fn list(
    store: &Store,
    kind: Option<MediaKind>,
    grouped: bool,
    output: &Output,
) -> Result<()> {
    if grouped {
        let kinds: Vec<MediaKind> = match kind {
            Some(k) => vec![k],
            None => MediaKind::ALL.to_vec(),
        };
        let groups: Vec<_> = kinds
            .into_iter()
            .map(|k| (k, store.list(Some(k))))
            .collect();
        output.print_grouped(&groups);
    } else {
        output.print_entries(&store.list(kind));
    }
    Ok(())
}

/// Search records
pub fn search(store: &Store, needle: String, field: SearchField, output: &Output) -> Result<()> {
    let entries = store.search(field, &needle);
    output.print_entries(&entries);
    Ok(())
}

/// Apply a partial update to one record
pub fn edit(
    store: &mut Store,
    position: Position,
    patch: RecordPatch,
    output: &Output,
) -> Result<()> {
    if patch.is_empty() {
        bail!(
            "Nothing to change. Pass at least one of --title, --creator, --genre or --rating \
             (an empty value clears the field)."
        );
    }

    let record = store
        .edit(position, patch)
        .context("Failed to update record")?;

    output.success("Record updated");
    output.print_record(Entry {
        position,
        record: &record,
    });

    Ok(())
}

/// Delete one record
pub fn delete(store: &mut Store, position: Position, output: &Output) -> Result<()> {
    let record = store
        .get(position)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid number: there is no record at position {} (collection has {})",
                position,
                store.len()
            )
        })?
        .clone();

    // Confirm deletion
    if output.should_prompt() {
        println!("Delete {}. {} - {}", position, record.kind, record.title);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    store.delete(position).context("Failed to delete record")?;

    output.success(&format!("'{}' deleted", record.title));

    Ok(())
}
