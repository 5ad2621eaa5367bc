//! Data models for shelf
//!
//! Defines the core data structures: MediaKind, Record, RecordPatch and
//! Position. Records serialize with the field names used by the on-disk
//! collection file (`tipo`, `titulo`, `autor`, `genero`, `valoracion`).

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "Libro")]
    Book,
    #[serde(rename = "Película")]
    Film,
    #[serde(rename = "Música")]
    Music,
}

impl MediaKind {
    /// All kinds, in the order grouped listings are rendered
    pub const ALL: [MediaKind; 3] = [MediaKind::Book, MediaKind::Film, MediaKind::Music];

    /// Singular display label
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Book => "Book",
            MediaKind::Film => "Film",
            MediaKind::Music => "Music",
        }
    }

    /// Section heading for grouped listings
    pub fn plural(self) -> &'static str {
        match self {
            MediaKind::Book => "Books",
            MediaKind::Film => "Films",
            MediaKind::Music => "Music",
        }
    }

    /// What the `creator` field means for this kind
    pub fn creator_role(self) -> &'static str {
        match self {
            MediaKind::Book => "author",
            MediaKind::Film => "director",
            MediaKind::Music => "artist",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string does not name a media kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown media kind '{0}'. Expected one of: book, film, music")]
pub struct ParseKindError(String);

impl FromStr for MediaKind {
    type Err = ParseKindError;

    /// Accepts English names and the labels stored on disk
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "book" | "libro" => Ok(MediaKind::Book),
            "film" | "movie" | "película" | "pelicula" => Ok(MediaKind::Film),
            "music" | "música" | "musica" => Ok(MediaKind::Music),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// One catalogued item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Book, film or music
    #[serde(rename = "tipo")]
    pub kind: MediaKind,
    /// Title of the work
    #[serde(rename = "titulo")]
    pub title: String,
    /// Author, director or artist depending on `kind`
    #[serde(rename = "autor")]
    pub creator: String,
    /// Free-form genre
    #[serde(rename = "genero")]
    pub genre: String,
    /// Free-text rating, never parsed as a number
    #[serde(rename = "valoracion")]
    pub rating: String,
}

impl Record {
    /// Create a record with the given kind and title; other fields empty
    pub fn new(kind: MediaKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            creator: String::new(),
            genre: String::new(),
            rating: String::new(),
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = rating.into();
        self
    }

    /// Apply a patch; fields the patch leaves as `None` are untouched
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(creator) = patch.creator {
            self.creator = creator;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

/// A partial update to a record
///
/// `None` means "keep the current value". `Some(String::new())` clears
/// the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    /// True if applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.creator.is_none()
            && self.genre.is_none()
            && self.rating.is_none()
    }
}

/// A 1-based position in the collection listing
///
/// Positions are not stable identifiers: deleting a record shifts every
/// later position down by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Position(usize);

/// Errors from turning user input into a position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Input is not an integer at all
    #[error("'{0}' is not a number")]
    NotANumber(String),
    /// Input is an integer but can never be a position (zero or negative)
    #[error("{0} is not a valid position")]
    Invalid(String),
}

impl Position {
    /// Create a position from a 1-based number; zero is rejected
    pub fn new(number: usize) -> Option<Self> {
        (number >= 1).then_some(Self(number))
    }

    /// Position of the element at a 0-based index
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// The 1-based number shown to the user
    pub fn get(self) -> usize {
        self.0
    }

    /// The 0-based index into the collection
    pub fn index(self) -> usize {
        self.0 - 1
    }

    /// Parse user input, separating non-numbers from invalid numbers
    pub fn parse(input: &str) -> Result<Self, PositionError> {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(n) if n >= 1 => usize::try_from(n)
                .map(Self)
                .map_err(|_| PositionError::Invalid(trimmed.to_string())),
            Ok(_) => Err(PositionError::Invalid(trimmed.to_string())),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    Err(PositionError::Invalid(trimmed.to_string()))
                }
                _ => Err(PositionError::NotANumber(trimmed.to_string())),
            },
        }
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Record {
        Record::new(MediaKind::Book, "Dune")
            .with_creator("Frank Herbert")
            .with_genre("Sci-Fi")
            .with_rating("5")
    }

    #[test]
    fn test_record_new() {
        let record = Record::new(MediaKind::Film, "Alien");
        assert_eq!(record.kind, MediaKind::Film);
        assert_eq!(record.title, "Alien");
        assert!(record.creator.is_empty());
        assert!(record.genre.is_empty());
        assert!(record.rating.is_empty());
    }

    #[test]
    fn test_record_serializes_with_file_field_names() {
        let json = serde_json::to_value(dune()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tipo": "Libro",
                "titulo": "Dune",
                "autor": "Frank Herbert",
                "genero": "Sci-Fi",
                "valoracion": "5"
            })
        );
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&MediaKind::Film).unwrap(), "\"Película\"");
        assert_eq!(serde_json::to_string(&MediaKind::Music).unwrap(), "\"Música\"");
        let kind: MediaKind = serde_json::from_str("\"Libro\"").unwrap();
        assert_eq!(kind, MediaKind::Book);
    }

    #[test]
    fn test_record_missing_field_is_rejected() {
        let result: Result<Record, _> =
            serde_json::from_str(r#"{"tipo": "Libro", "titulo": "Dune"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("book".parse::<MediaKind>().unwrap(), MediaKind::Book);
        assert_eq!("Película".parse::<MediaKind>().unwrap(), MediaKind::Film);
        assert_eq!(" MUSIC ".parse::<MediaKind>().unwrap(), MediaKind::Music);
        assert!("podcast".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_kind_order() {
        assert_eq!(
            MediaKind::ALL,
            [MediaKind::Book, MediaKind::Film, MediaKind::Music]
        );
        assert_eq!(MediaKind::Film.creator_role(), "director");
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut record = dune();
        record.apply(RecordPatch::new().creator("New Author"));
        assert_eq!(record.title, "Dune");
        assert_eq!(record.creator, "New Author");
        assert_eq!(record.rating, "5");
    }

    #[test]
    fn test_apply_patch_can_clear_field() {
        let mut record = dune();
        record.apply(RecordPatch::new().genre(""));
        assert_eq!(record.genre, "");
        assert_eq!(record.title, "Dune");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(RecordPatch::new().is_empty());
        assert!(!RecordPatch::new().rating("").is_empty());
    }

    #[test]
    fn test_position_parse() {
        assert_eq!(Position::parse("1").unwrap().index(), 0);
        assert_eq!(Position::parse(" 12 \n").unwrap().get(), 12);
        assert_eq!(
            Position::parse("abc"),
            Err(PositionError::NotANumber("abc".to_string()))
        );
        assert_eq!(
            Position::parse(""),
            Err(PositionError::NotANumber(String::new()))
        );
        assert_eq!(Position::parse("0"), Err(PositionError::Invalid("0".to_string())));
        assert_eq!(Position::parse("-3"), Err(PositionError::Invalid("-3".to_string())));
        assert!(matches!(
            Position::parse("99999999999999999999999"),
            Err(PositionError::Invalid(_))
        ));
    }

    #[test]
    fn test_position_new_and_index() {
        assert!(Position::new(0).is_none());
        assert_eq!(Position::new(3).unwrap().index(), 2);
        assert_eq!(Position::from_index(0).get(), 1);
        assert_eq!(Position::from_index(4).to_string(), "5");
    }
}
