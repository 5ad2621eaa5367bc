//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::BTreeMap;

use shelf_core::{Entry, MediaKind, Record};

/// Line separating menu sections
pub const SEPARATOR: &str = "=============================================";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single record with its position
    pub fn print_record(&self, entry: Entry<'_>) {
        match self.format {
            OutputFormat::Human => {
                let role = capitalize(entry.record.kind.creator_role());
                println!("Position: {}", entry.position);
                println!("Kind:     {}", entry.record.kind);
                println!("Title:    {}", entry.record.title);
                println!("{:<9} {}", format!("{}:", role), entry.record.creator);
                println!("Genre:    {}", entry.record.genre);
                println!("Rating:   {}", entry.record.rating);
            }
            OutputFormat::Json => {
                println!("{}", to_json(&entry));
            }
            OutputFormat::Quiet => {
                println!("{}", entry.position);
            }
        }
    }

    /// Print a list of records
    pub fn print_entries(&self, entries: &[Entry<'_>]) {
        match self.format {
            OutputFormat::Human => {
                for line in entry_lines(entries, "No records found.") {
                    println!("{}", line);
                }
                if !entries.is_empty() {
                    println!("\n{} record(s)", entries.len());
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(&entries));
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.position);
                }
            }
        }
    }

    /// Print records in three sections: books, films, music
    pub fn print_grouped(&self, groups: &[(MediaKind, Vec<Entry<'_>>)]) {
        match self.format {
            OutputFormat::Human => {
                for (kind, entries) in groups {
                    println!("=== {} ===", kind.plural());
                    for line in entry_lines(entries, "The collection is empty.") {
                        println!("{}", line);
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(&sections(groups)));
            }
            OutputFormat::Quiet => {
                for (_, entries) in groups {
                    for entry in entries {
                        println!("{}", entry.position);
                    }
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One listing line: `1. Book: Dune - Frank Herbert - Sci-Fi - 5`
pub fn record_line(entry: Entry<'_>) -> String {
    format!("{}. {}", entry.position, describe(entry.record))
}

/// Listing lines, or a single placeholder line when there is nothing to show
pub fn entry_lines(entries: &[Entry<'_>], empty: &str) -> Vec<String> {
    if entries.is_empty() {
        vec![empty.to_string()]
    } else {
        entries.iter().map(|e| record_line(*e)).collect()
    }
}

/// `Book: Dune - Frank Herbert - Sci-Fi - 5`
pub fn describe(record: &Record) -> String {
    format!(
        "{}: {} - {} - {} - {}",
        record.kind, record.title, record.creator, record.genre, record.rating
    )
}

/// Grouped entries keyed by lowercase kind label
fn sections<'a>(
    groups: &'a [(MediaKind, Vec<Entry<'a>>)],
) -> BTreeMap<String, &'a [Entry<'a>]> {
    groups
        .iter()
        .map(|(kind, entries)| (kind.label().to_lowercase(), entries.as_slice()))
        .collect()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::Position;

    fn dune() -> Record {
        Record::new(MediaKind::Book, "Dune")
            .with_creator("Frank Herbert")
            .with_genre("Sci-Fi")
            .with_rating("5")
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_record_line() {
        let record = dune();
        let entry = Entry {
            position: Position::new(3).unwrap(),
            record: &record,
        };
        assert_eq!(record_line(entry), "3. Book: Dune - Frank Herbert - Sci-Fi - 5");
    }

    #[test]
    fn test_entry_lines_empty() {
        assert_eq!(entry_lines(&[], "Nothing."), vec!["Nothing."]);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("director"), "Director");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_entry_json_shape() {
        let record = dune();
        let entry = Entry {
            position: Position::new(1).unwrap(),
            record: &record,
        };
        let value: serde_json::Value = serde_json::from_str(&to_json(&entry)).unwrap();
        assert_eq!(value["position"], 1);
        assert_eq!(value["record"]["titulo"], "Dune");
    }

    #[test]
    fn test_grouped_json_sections() {
        let record = dune();
        let books = vec![Entry {
            position: Position::new(2).unwrap(),
            record: &record,
        }];
        let groups = [(MediaKind::Book, books), (MediaKind::Film, Vec::new())];
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&sections(&groups))).unwrap();
        assert_eq!(value["book"][0]["position"], 2);
        assert_eq!(value["film"], serde_json::json!([]));
    }
}
