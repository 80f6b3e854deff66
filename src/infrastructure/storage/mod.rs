//! File-based storage implementation

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::application::errors::StorageError;
use crate::application::services::QuoteStore;
use crate::domain::traits::Store;
use crate::infrastructure::database::{CounterDb, ResponseDb};

const QUOTES_DIR: &str = "quotes";
const NICKNAMES_FILE: &str = "nicknames.txt";
const COUNTERS_FILE: &str = "counters.db";
const RESPONSES_FILE: &str = "responses.db";

/// Everything the bot persists, owned by the router and lent to handlers.
pub struct Storage {
    pub quotes: QuoteStore,
    pub counters: CounterDb,
    pub responses: ResponseDb,
}

impl Storage {
    pub fn new(quotes: QuoteStore, counters: CounterDb, responses: ResponseDb) -> Self {
        Self {
            quotes,
            counters,
            responses,
        }
    }

    /// Opens (creating if needed) the data directory layout under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let quotes = QuoteStore::open(Box::new(FileStore::open(dir)?))?;
        let counters = CounterDb::new(dir.join(COUNTERS_FILE))?;
        let responses = ResponseDb::new(dir.join(RESPONSES_FILE))?;
        tracing::info!("Storage opened at {}", dir.display());
        Ok(Self::new(quotes, counters, responses))
    }

    pub fn close(&mut self) {
        if let Err(e) = self.counters.close() {
            tracing::error!("Failed to close counter database: {}", e);
        }
        if let Err(e) = self.responses.close() {
            tracing::error!("Failed to close response command database: {}", e);
        }
    }
}

/// Plain-text store: one log file per channel plus a `channel=nickname` file.
pub struct FileStore {
    quotes_dir: PathBuf,
    nicknames_path: PathBuf,
}

impl FileStore {
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        let quotes_dir = base_path.join(QUOTES_DIR);
        fs::create_dir_all(&quotes_dir)?;

        let nicknames_path = base_path.join(NICKNAMES_FILE);
        if !nicknames_path.exists() {
            File::create(&nicknames_path)?;
            tracing::debug!("Created {}", nicknames_path.display());
        }

        Ok(Self {
            quotes_dir,
            nicknames_path,
        })
    }

    fn log_path(&self, channel: &str) -> Result<PathBuf, StorageError> {
        let valid = !channel.is_empty()
            && channel
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(channel.to_string()));
        }
        Ok(self.quotes_dir.join(channel))
    }
}

/// Writes `contents` next to `path` and renames it into place.
fn replace_file(path: &Path, contents: &str) -> Result<(), StorageError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let mut file = File::create(&tmp)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn join_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.trim_end_matches(['\r', '\n']));
        out.push('\n');
    }
    out
}

impl Store for FileStore {
    fn read_log(&self, channel: &str) -> Result<Vec<String>, StorageError> {
        let path = self.log_path(channel)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn touch_log(&self, channel: &str) -> Result<(), StorageError> {
        let path = self.log_path(channel)?;
        if !path.exists() {
            File::create(&path)?;
            tracing::debug!("Created empty quote log for channel: {}", channel);
        }
        Ok(())
    }

    fn append_log(&self, channel: &str, line: &str) -> Result<(), StorageError> {
        let path = self.log_path(channel)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(join_lines(std::iter::once(line)).as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    fn write_log(&self, channel: &str, lines: &[String]) -> Result<(), StorageError> {
        let path = self.log_path(channel)?;
        replace_file(&path, &join_lines(lines.iter().map(String::as_str)))
    }

    fn read_nicknames(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = fs::read_to_string(&self.nicknames_path)?;
        let mut nicknames = BTreeMap::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((channel, nickname)) if !nickname.trim().is_empty() => {
                    nicknames.insert(channel.trim().to_lowercase(), nickname.trim().to_string());
                }
                _ => tracing::warn!(
                    "Issue loading nickname on line #{} of {}",
                    index + 1,
                    self.nicknames_path.display()
                ),
            }
        }
        Ok(nicknames)
    }

    fn write_nicknames(&self, nicknames: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let lines: Vec<String> = nicknames
            .iter()
            .map(|(channel, nickname)| format!("{}={}", channel, nickname))
            .collect();
        replace_file(&self.nicknames_path, &join_lines(lines.iter().map(String::as_str)))
    }
}
