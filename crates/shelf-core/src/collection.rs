//! In-memory collection
//!
//! An ordered list of records in insertion order. The 1-based position of
//! a record in this list is the only way to address it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MediaKind, Position, Record, RecordPatch};

/// Errors from collection operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Position is past the end of the collection
    #[error("Invalid number: there is no record at position {position} (collection has {len})")]
    InvalidPosition { position: Position, len: usize },
}

/// Which fields a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    /// Match the title only
    Title,
    /// Match the creator or the genre
    CreatorOrGenre,
}

/// A record together with its position in the full collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry<'a> {
    pub position: Position,
    pub record: &'a Record,
}

/// Ordered sequence of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record at a position, if any
    pub fn get(&self, position: Position) -> Option<&Record> {
        self.records.get(position.index())
    }

    /// Append a record at the end; duplicates are allowed
    pub fn add(&mut self, record: Record) -> Position {
        self.records.push(record);
        Position::from_index(self.records.len() - 1)
    }

    /// Records in original order, optionally restricted to one kind
    pub fn list(&self, kind: Option<MediaKind>) -> Vec<Entry<'_>> {
        self.entries()
            .filter(|entry| kind.map_or(true, |k| entry.record.kind == k))
            .collect()
    }

    /// Case-insensitive substring search, preserving original order
    ///
    /// The empty needle matches every record.
    pub fn search(&self, field: SearchField, needle: &str) -> Vec<Entry<'_>> {
        let needle = needle.to_lowercase();
        self.entries()
            .filter(|entry| {
                let record = entry.record;
                match field {
                    SearchField::Title => contains_folded(&record.title, &needle),
                    SearchField::CreatorOrGenre => {
                        contains_folded(&record.creator, &needle)
                            || contains_folded(&record.genre, &needle)
                    }
                }
            })
            .collect()
    }

    /// Apply a partial update to the record at `position`
    pub fn edit(
        &mut self,
        position: Position,
        patch: RecordPatch,
    ) -> Result<&Record, CollectionError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(position.index())
            .ok_or(CollectionError::InvalidPosition { position, len })?;
        record.apply(patch);
        Ok(record)
    }

    /// Remove and return the record at `position`
    ///
    /// Every later record moves up one position.
    pub fn delete(&mut self, position: Position) -> Result<Record, CollectionError> {
        self.check(position)?;
        Ok(self.records.remove(position.index()))
    }

    /// Ensure `position` addresses an existing record
    pub fn check(&self, position: Position) -> Result<(), CollectionError> {
        if position.index() < self.records.len() {
            Ok(())
        } else {
            Err(CollectionError::InvalidPosition {
                position,
                len: self.records.len(),
            })
        }
    }

    fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| Entry {
                position: Position::from_index(index),
                record,
            })
    }
}

impl From<Vec<Record>> for Collection {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    fn sample() -> Collection {
        Collection::from(vec![
            Record::new(MediaKind::Book, "Dune")
                .with_creator("Frank Herbert")
                .with_genre("Sci-Fi")
                .with_rating("5"),
            Record::new(MediaKind::Film, "Blade Runner")
                .with_creator("Ridley Scott")
                .with_genre("Sci-Fi")
                .with_rating("4"),
            Record::new(MediaKind::Music, "Kind of Blue")
                .with_creator("Miles Davis")
                .with_genre("Jazz")
                .with_rating("great"),
            Record::new(MediaKind::Book, "Emma")
                .with_creator("Jane Austen")
                .with_genre("Romance")
                .with_rating("3"),
        ])
    }

    fn titles(entries: &[Entry<'_>]) -> Vec<String> {
        entries.iter().map(|e| e.record.title.clone()).collect()
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut collection = Collection::new();
        let first = collection.add(Record::new(MediaKind::Book, "A"));
        let second = collection.add(Record::new(MediaKind::Book, "A"));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        // No duplicate check
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_list_all() {
        let collection = sample();
        let entries = collection.list(None);
        assert_eq!(entries.len(), 4);
        assert_eq!(titles(&entries), vec!["Dune", "Blade Runner", "Kind of Blue", "Emma"]);
    }

    #[test]
    fn test_list_by_kind_keeps_global_positions() {
        let collection = sample();
        let books = collection.list(Some(MediaKind::Book));
        assert_eq!(titles(&books), vec!["Dune", "Emma"]);
        assert_eq!(books[1].position.get(), 4);

        assert!(Collection::new().list(Some(MediaKind::Film)).is_empty());
    }

    #[test]
    fn test_search_title_case_insensitive() {
        let collection = sample();
        for needle in ["dune", "DUNE", "uN"] {
            let results = collection.search(SearchField::Title, needle);
            assert_eq!(titles(&results), vec!["Dune"], "needle {needle}");
        }
    }

    #[test]
    fn test_search_empty_needle_returns_everything() {
        let collection = sample();
        assert_eq!(collection.search(SearchField::Title, "").len(), collection.len());
    }

    #[test]
    fn test_search_creator_or_genre() {
        let collection = sample();
        let sci_fi = collection.search(SearchField::CreatorOrGenre, "sci-fi");
        assert_eq!(titles(&sci_fi), vec!["Dune", "Blade Runner"]);

        let davis = collection.search(SearchField::CreatorOrGenre, "DAVIS");
        assert_eq!(titles(&davis), vec!["Kind of Blue"]);

        // Title is not consulted in this mode
        assert!(collection.search(SearchField::CreatorOrGenre, "dune").is_empty());
    }

    #[test]
    fn test_search_non_ascii() {
        let collection = Collection::from(vec![Record::new(MediaKind::Music, "Canción Única")]);
        assert_eq!(collection.search(SearchField::Title, "ÚNICA").len(), 1);
    }

    #[test]
    fn test_list_and_search_do_not_mutate() {
        let collection = sample();
        let before = collection.clone();
        let _ = collection.list(Some(MediaKind::Music));
        let _ = collection.search(SearchField::Title, "e");
        assert_eq!(collection, before);
    }

    #[test]
    fn test_edit_partial() {
        let mut collection = sample();
        let edited = collection
            .edit(pos(1), RecordPatch::new().creator("New Author"))
            .unwrap();
        assert_eq!(edited.title, "Dune");
        assert_eq!(edited.creator, "New Author");
        assert_eq!(edited.genre, "Sci-Fi");
    }

    #[test]
    fn test_edit_out_of_range_leaves_collection_unchanged() {
        let mut collection = sample();
        let before = collection.clone();
        let err = collection
            .edit(pos(5), RecordPatch::new().title("X"))
            .unwrap_err();
        assert_eq!(
            err,
            CollectionError::InvalidPosition {
                position: pos(5),
                len: 4
            }
        );
        assert_eq!(collection, before);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let original = sample();
        for n in 1..=original.len() {
            let mut collection = original.clone();
            let removed = collection.delete(pos(n)).unwrap();
            assert_eq!(removed, original.records()[n - 1]);

            let mut expected = original.records().to_vec();
            expected.remove(n - 1);
            assert_eq!(collection.records(), expected.as_slice());
        }
    }

    #[test]
    fn test_delete_shifts_positions() {
        let mut collection = sample();
        collection.delete(pos(2)).unwrap();
        assert_eq!(collection.get(pos(2)).unwrap().title, "Kind of Blue");
        assert!(collection.get(pos(4)).is_none());
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut collection = sample();
        assert!(collection.delete(pos(9)).is_err());
        assert_eq!(collection.len(), 4);

        let mut empty = Collection::new();
        assert!(empty.delete(pos(1)).is_err());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let collection = Collection::from(vec![Record::new(MediaKind::Book, "Dune")]);
        let json = serde_json::to_value(&collection).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["titulo"], "Dune");
    }
}
