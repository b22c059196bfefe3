//! Command-line commands over a loaded library and its stores.

use std::fs;
use std::io::Write;
use std::path::{Path as FsPath, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tunedex_core::enumeration::LIST_STYLE_FIELD;
use tunedex_core::track::field;
use tunedex_core::{
    Collection, Cursor, CursorStore, FlagStore, Group, HistoryStore, IndexConfig, Key, Library,
    Path, PlaylistStore, Rating, RatingStore, TrackRecord,
};

/// Browse and annotate a music library index.
#[derive(Debug, Parser)]
#[command(name = "tunedex")]
#[command(about = "Browse a music library index from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log debug output to the console
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON file holding a list of track records
    pub library: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Errors surfaced by the command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Library or store operation failed.
    #[error(transparent)]
    Core(#[from] tunedex_core::Error),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for command execution.
pub type CliResult<T> = Result<T, CliError>;

/// On/off switch for flag commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    /// Set the flag.
    On,
    /// Clear the flag.
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        switch == Switch::On
    }
}

fn parse_rating(s: &str) -> Result<Rating, String> {
    let value: u8 = s.parse().map_err(|_| format!("not a rating: {s}"))?;
    Rating::new(value).map_err(|e| e.to_string())
}

/// Commands run against the loaded library.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the library tree
    Tree,
    /// List recently added albums
    Recent {
        /// Number of albums, defaults to the configured count
        n: Option<usize>,
    },
    /// Show the group at a path
    Resolve {
        /// Encoded path, e.g. Root:1a2b3c:0
        #[arg(value_parser = Path::decode)]
        path: Path,
    },
    /// Manage playlists
    Playlist {
        #[command(subcommand)]
        command: PlaylistCommand,
    },
    /// Show or set a rating
    Rate {
        #[arg(value_parser = Path::decode)]
        path: Path,
        /// Stars from 0 to 5, 0 clears the rating
        #[arg(value_parser = parse_rating)]
        rating: Option<Rating>,
    },
    /// Show or set a favourite
    Favourite {
        #[arg(value_parser = Path::decode)]
        path: Path,
        #[arg(value_enum)]
        switch: Option<Switch>,
    },
    /// List favourites
    Favourites,
    /// Show or set a checklist mark
    Check {
        #[arg(value_parser = Path::decode)]
        path: Path,
        #[arg(value_enum)]
        switch: Option<Switch>,
    },
    /// List the checklist
    Checklist,
    /// List filters, the values of a filter, or the albums holding a value
    Filter {
        /// Filter attribute, e.g. Composer
        name: Option<String>,
        /// Attribute value
        value: Option<String>,
    },
    /// Record a play of a path
    Play {
        #[arg(value_parser = Path::decode)]
        path: Path,
    },
    /// Show play times of a path, or the latest play of every path
    History {
        #[arg(value_parser = Path::decode)]
        path: Option<Path>,
    },
    /// Manage cursors
    Cursor {
        #[command(subcommand)]
        command: CursorCommand,
    },
}

/// Playlist subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum PlaylistCommand {
    /// List playlist names
    List,
    /// Show playlist items
    Show { name: String },
    /// Create an empty playlist
    Create { name: String },
    /// Delete a playlist
    Delete { name: String },
    /// Append a path
    Add {
        name: String,
        #[arg(value_parser = Path::decode)]
        path: Path,
    },
    /// Remove the item at an index
    Remove {
        name: String,
        index: usize,
        /// The item, or a path below it
        #[arg(value_parser = Path::decode)]
        path: Path,
    },
}

/// Cursor subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CursorCommand {
    /// List cursor names
    List,
    /// Show a cursor
    Show { name: String },
    /// Create or move a cursor
    Set {
        name: String,
        #[arg(value_parser = Path::decode)]
        path: Path,
        index: usize,
    },
    /// Delete a cursor
    Delete { name: String },
}

/// Loaded library together with its persisted stores.
pub struct AppState {
    library: Library,
    playlists: PlaylistStore,
    ratings: RatingStore,
    favourites: FlagStore,
    checklist: FlagStore,
    history: HistoryStore,
    cursors: CursorStore,
}

impl AppState {
    /// Build the library from `library_file` and open the stores under the
    /// configured data directory.
    pub fn open(library_file: &FsPath, config: &IndexConfig) -> CliResult<Self> {
        let content = fs::read_to_string(library_file).map_err(tunedex_core::Error::from)?;
        let records: Vec<TrackRecord> =
            serde_json::from_str(&content).map_err(tunedex_core::Error::from)?;
        info!(
            "Loaded {} track records from {}",
            records.len(),
            library_file.display()
        );

        config.ensure_data_directory()?;
        Ok(Self {
            library: Library::new(records, config)?,
            playlists: PlaylistStore::open(config.playlists_file())?,
            ratings: RatingStore::open(config.ratings_file())?,
            favourites: FlagStore::open("favourites", config.favourites_file())?,
            checklist: FlagStore::open("checklist", config.checklist_file())?,
            history: HistoryStore::open(config.history_file())?,
            cursors: CursorStore::open(config.cursors_file())?,
        })
    }

    /// The built library.
    pub const fn library(&self) -> &Library {
        &self.library
    }

    /// Run `command`, writing its output to `out`.
    pub fn execute(&self, command: &Command, out: &mut impl Write) -> CliResult<()> {
        debug!("Executing {:?}", command);
        match command {
            Command::Tree => {
                for (key, group) in self.library.root().iter() {
                    write_group(out, key, group, 0)?;
                }
            }
            Command::Recent { n } => {
                let paths = match n {
                    Some(n) => tunedex_core::recent(self.library.root(), *n),
                    None => self.library.recent().to_vec(),
                };
                write_paths(out, &self.library.expand_paths(&paths), &paths)?;
            }
            Command::Resolve { path } => {
                let group = self.library.resolve(path)?;
                let key = path.keys().last().cloned().unwrap_or_else(Key::root);
                write_group(out, &key, &group, 0)?;
            }
            Command::Playlist { command } => self.execute_playlist(command, out)?,
            Command::Rate { path, rating } => {
                self.library.resolve(path)?;
                if let Some(rating) = rating {
                    self.ratings.set(path, *rating)?;
                }
                let rating = self.ratings.get(path)?;
                writeln!(out, "{path}  {rating} ({})", rating.value())?;
            }
            Command::Favourite { path, switch } => {
                write_flag(out, &self.favourites, path, switch.map(bool::from))?;
            }
            Command::Check { path, switch } => {
                write_flag(out, &self.checklist, path, switch.map(bool::from))?;
            }
            Command::Favourites => {
                for path in self.favourites.list()? {
                    writeln!(out, "{path}")?;
                }
            }
            Command::Checklist => {
                for path in self.checklist.list()? {
                    writeln!(out, "{path}")?;
                }
            }
            Command::Filter { name, value } => {
                self.execute_filter(name.as_deref(), value.as_deref(), out)?;
            }
            Command::Play { path } => {
                self.library.resolve(path)?;
                let played_at = self.history.record(path)?;
                writeln!(out, "{path}  {played_at}")?;
            }
            Command::History { path: Some(path) } => {
                for played_at in self.history.get(path)? {
                    writeln!(out, "{played_at}")?;
                }
            }
            Command::History { path: None } => {
                for (path, played_at) in self.history.latest()? {
                    writeln!(out, "{path}  {played_at}")?;
                }
            }
            Command::Cursor { command } => self.execute_cursor(command, out)?,
        }
        Ok(())
    }

    fn execute_playlist(&self, command: &PlaylistCommand, out: &mut impl Write) -> CliResult<()> {
        match command {
            PlaylistCommand::List => {
                for name in self.playlists.names()? {
                    writeln!(out, "{name}")?;
                }
            }
            PlaylistCommand::Show { name } => {
                let playlist = self
                    .playlists
                    .get(name)?
                    .ok_or_else(|| tunedex_core::Error::PlaylistNotFound(name.clone()))?;
                for (i, item) in playlist.items().iter().enumerate() {
                    writeln!(out, "{i}  {item}  {}", self.label(item))?;
                }
            }
            PlaylistCommand::Create { name } => self.playlists.create(name)?,
            PlaylistCommand::Delete { name } => self.playlists.delete(name)?,
            PlaylistCommand::Add { name, path } => {
                self.library.resolve(path)?;
                self.playlists.add_item(name, path.clone())?;
            }
            PlaylistCommand::Remove { name, index, path } => {
                let removed = self.playlists.remove_item(name, *index, path)?;
                writeln!(out, "removed {removed}")?;
            }
        }
        Ok(())
    }

    fn execute_filter(
        &self,
        name: Option<&str>,
        value: Option<&str>,
        out: &mut impl Write,
    ) -> CliResult<()> {
        let Some(name) = name else {
            for name in self.library.filter_names() {
                writeln!(out, "{name}")?;
            }
            return Ok(());
        };
        let items = self
            .library
            .filter(name)
            .ok_or_else(|| tunedex_core::Error::NotFound {
                key: name.to_string(),
                path: "filters".to_string(),
            })?;
        match value {
            None => {
                for item in items {
                    writeln!(out, "{}  ({})", item.name(), item.paths().len())?;
                }
            }
            Some(value) => {
                let item = items.iter().find(|item| item.name() == value).ok_or_else(|| {
                    tunedex_core::Error::NotFound {
                        key: value.to_string(),
                        path: format!("filters:{name}"),
                    }
                })?;
                write_paths(out, &self.library.expand_paths(item.paths()), item.paths())?;
            }
        }
        Ok(())
    }

    fn execute_cursor(&self, command: &CursorCommand, out: &mut impl Write) -> CliResult<()> {
        match command {
            CursorCommand::List => {
                for name in self.cursors.names()? {
                    writeln!(out, "{name}")?;
                }
            }
            CursorCommand::Show { name } => match self.cursors.get(name)? {
                Some(cursor) => {
                    let path = cursor.path();
                    writeln!(out, "{path}  {}  {}", cursor.index(), self.label(path))?;
                }
                None => writeln!(out, "no cursor {name}")?,
            },
            CursorCommand::Set { name, path, index } => {
                self.library.resolve(path)?;
                self.cursors.set(name, Cursor::new(path.clone(), *index))?;
            }
            CursorCommand::Delete { name } => {
                if !self.cursors.delete(name)? {
                    writeln!(out, "no cursor {name}")?;
                }
            }
        }
        Ok(())
    }

    fn label(&self, path: &Path) -> String {
        self.library
            .resolve(path)
            .map_or_else(|_| "(missing)".to_string(), |g| g.name().to_string())
    }
}

fn write_group(out: &mut impl Write, key: &Key, group: &Group, depth: usize) -> CliResult<()> {
    let indent = "  ".repeat(depth);
    match group {
        Group::Collection(col) => {
            writeln!(out, "{indent}{key}  {}/", col.name())?;
            for (child_key, child) in col.iter() {
                write_group(out, child_key, child, depth + 1)?;
            }
        }
        Group::Leaf(leaf) => {
            match leaf.field(LIST_STYLE_FIELD) {
                Some(style) => writeln!(out, "{indent}{key}  {} [{style}]", leaf.name())?,
                None => writeln!(out, "{indent}{key}  {}", leaf.name())?,
            }
            for (i, track) in leaf.tracks().iter().enumerate() {
                let name = track.try_string(field::NAME).unwrap_or_default();
                writeln!(out, "{indent}  {i}  {name}")?;
            }
        }
    }
    Ok(())
}

fn write_paths(out: &mut impl Write, expanded: &Collection, paths: &[Path]) -> CliResult<()> {
    for path in paths {
        let name = path
            .get(1)
            .and_then(|key| expanded.get(key))
            .map_or("(missing)", Group::name);
        writeln!(out, "{path}  {name}")?;
    }
    Ok(())
}

fn write_flag(
    out: &mut impl Write,
    store: &FlagStore,
    path: &Path,
    flag: Option<bool>,
) -> CliResult<()> {
    if let Some(on) = flag {
        store.set(path, on)?;
    }
    let state = if store.get(path)? { "on" } else { "off" };
    writeln!(out, "{path}  {state}")?;
    Ok(())
}
