//! shelf CLI
//!
//! Command-line interface for shelf - a personal catalogue of books,
//! films and music. Runs the interactive menu when no command is given.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shelf_core::{Config, MediaKind, Position, RecordPatch, SearchField, Store};

mod commands;
mod menu;
mod output;
mod prompt;

use commands::record::NewRecord;
use menu::Menu;
use output::{Output, OutputFormat};
use prompt::Prompter;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "shelf - Keep track of your books, films and music")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu (default)
    Menu,
    /// Add a record
    Add {
        /// book, film or music
        #[arg(short, long)]
        kind: MediaKind,
        /// Title
        #[arg(short = 'T', long)]
        title: String,
        /// Author, director or artist
        #[arg(short, long, default_value = "")]
        creator: String,
        /// Genre
        #[arg(short, long, default_value = "")]
        genre: String,
        /// Rating (free text)
        #[arg(short, long, default_value = "")]
        rating: String,
    },
    /// List records
    #[command(alias = "ls")]
    List {
        /// Only show one kind
        #[arg(short, long)]
        kind: Option<MediaKind>,
        /// Show books, films and music as separate sections
        #[arg(short, long)]
        grouped: bool,
    },
    /// Search records (case-insensitive)
    Search {
        /// Text to look for
        needle: String,
        /// Fields to match against
        #[arg(long, value_enum, default_value_t = SearchBy::Title)]
        by: SearchBy,
    },
    /// Edit a record; omitted fields are kept, empty values clear the field
    Edit {
        /// Position shown by `shelf list`
        position: Position,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        creator: Option<String>,
        #[arg(short, long)]
        genre: Option<String>,
        #[arg(short, long)]
        rating: Option<String>,
    },
    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Position shown by `shelf list`
        position: Position,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SearchBy {
    /// Match the title
    Title,
    /// Match the author/director/artist or the genre
    CreatorGenre,
}

impl From<SearchBy> for SearchField {
    fn from(by: SearchBy) -> Self {
        match by {
            SearchBy::Title => SearchField::Title,
            SearchBy::CreatorGenre => SearchField::CreatorOrGenre,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let command = match cli.command {
        None | Some(Commands::Menu) => return run_menu(config),
        Some(command) => command,
    };

    let mut store = open_store(config)?;

    match command {
        Commands::Menu | Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Add {
            kind,
            title,
            creator,
            genre,
            rating,
        } => commands::record::add(
            &mut store,
            NewRecord {
                kind,
                title,
                creator,
                genre,
                rating,
            },
            &output,
        ),
        Commands::List { kind, grouped } => commands::record::list(&store, kind, grouped, &output),
        Commands::Search { needle, by } => {
            commands::record::search(&store, needle, by.into(), &output)
        }
        Commands::Edit {
            position,
            title,
            creator,
            genre,
            rating,
        } => {
            let patch = RecordPatch {
                title,
                creator,
                genre,
                rating,
            };
            commands::record::edit(&mut store, position, patch, &output)
        }
        Commands::Delete { position } => commands::record::delete(&mut store, position, &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Open the store for a one-shot command
fn open_store(config: Config) -> Result<Store> {
    match Store::open_with_config(config) {
        Ok(store) => Ok(store),
        Err(e) => {
            if let Some(hint) = e.recovery_suggestion() {
                eprintln!("hint: {}", hint);
            }
            Err(e).context("Failed to open collection")
        }
    }
}

/// Open the store and run the interactive menu on stdin/stdout
fn run_menu(config: Config) -> Result<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let store = menu::open_session(config, &mut prompter)?;

    let (input, output) = prompter.into_parts();
    let mut menu = Menu::new(store, input, output);
    menu.run().context("Terminal I/O failed")?;
    Ok(())
}

/// Initialize logging
///
/// Only initializes if SHELF_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log) so the
/// menu output stays clean.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("shelf_core={},shelf_cli={}", log_level, log_level));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "shelf", "add", "--kind", "film", "-T", "Alien", "--creator", "Ridley Scott",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add {
                kind,
                title,
                creator,
                genre,
                ..
            }) => {
                assert_eq!(kind, MediaKind::Film);
                assert_eq!(title, "Alien");
                assert_eq!(creator, "Ridley Scott");
                assert_eq!(genre, "");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_edit_distinguishes_missing_from_empty() {
        let cli = Cli::try_parse_from(["shelf", "edit", "2", "--genre", ""]).unwrap();
        match cli.command {
            Some(Commands::Edit {
                position,
                title,
                genre,
                ..
            }) => {
                assert_eq!(position.get(), 2);
                assert_eq!(title, None);
                assert_eq!(genre, Some(String::new()));
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_position_and_kind() {
        assert!(Cli::try_parse_from(["shelf", "delete", "zero"]).is_err());
        assert!(Cli::try_parse_from(["shelf", "delete", "0"]).is_err());
        assert!(Cli::try_parse_from(["shelf", "add", "--kind", "podcast", "-T", "x"]).is_err());
    }

    #[test]
    fn test_search_by_maps_to_field() {
        let cli =
            Cli::try_parse_from(["shelf", "search", "jazz", "--by", "creator-genre"]).unwrap();
        match cli.command {
            Some(Commands::Search { needle, by }) => {
                assert_eq!(needle, "jazz");
                assert_eq!(SearchField::from(by), SearchField::CreatorOrGenre);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_no_command_means_menu() {
        let cli = Cli::try_parse_from(["shelf"]).unwrap();
        assert!(cli.command.is_none());
    }
}
