//! Quote store - index-addressed quote logs with tombstoned deletion

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rand::Rng;

use crate::application::errors::{QuoteError, StorageError};
use crate::domain::entities::{QuoteRecord, QuoteView, DELETED_FILL};
use crate::domain::traits::Store;

/// What an edit did to its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Edited { previous: QuoteRecord },
    /// The slot was a tombstone and is live again with a fresh date.
    Revived,
}

/// What a delete did to its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { previous: QuoteRecord },
    AlreadyDeleted { date: NaiveDate },
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Quote logs and nickname bindings for every channel.
///
/// Users address quotes from 1; slot `n` lives at position `n - 1`. Slots are
/// never removed, deletion overwrites them with a tombstone. Every change is
/// written through the [`Store`] before the in-memory copy is touched.
pub struct QuoteStore {
    store: Box<dyn Store>,
    logs: HashMap<String, Vec<QuoteRecord>>,
    nicknames: BTreeMap<String, String>,
    today: fn() -> NaiveDate,
}

fn channel_log<'a>(
    logs: &'a mut HashMap<String, Vec<QuoteRecord>>,
    store: &dyn Store,
    channel: &str,
) -> Result<&'a mut Vec<QuoteRecord>, StorageError> {
    match logs.entry(channel.to_string()) {
        Entry::Occupied(e) => Ok(e.into_mut()),
        Entry::Vacant(e) => {
            tracing::info!("Loading quotes for: {}", channel);
            let mut records = Vec::new();
            for (line_no, line) in store.read_log(channel)?.iter().enumerate() {
                match QuoteRecord::parse_line(line) {
                    Some(record) => records.push(record),
                    None => tracing::warn!(
                        "Skipping unreadable quote on line #{} for channel {}",
                        line_no + 1,
                        channel
                    ),
                }
            }
            Ok(e.insert(records))
        }
    }
}

/// Maps an external 1-based index onto a storage position.
fn slot(index: i64, len: usize) -> Result<usize, QuoteError> {
    if index < 0 {
        return Err(QuoteError::NegativeIndex(index));
    }
    if index == 0 {
        return Err(QuoteError::ZeroIndex);
    }
    let position = (index - 1) as usize;
    if position >= len {
        return Err(QuoteError::IndexTooLarge { index, len });
    }
    Ok(position)
}

fn check_text(text: &str) -> Result<(), QuoteError> {
    if text.trim().is_empty() {
        return Err(QuoteError::InvalidText("A quote needs some text.".to_string()));
    }
    if text.trim() == DELETED_FILL {
        return Err(QuoteError::InvalidText(
            "That text is reserved for deleted quotes.".to_string(),
        ));
    }
    if text.contains(['\n', '\r']) {
        return Err(QuoteError::InvalidText(
            "Quotes have to fit on a single line.".to_string(),
        ));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), QuoteError> {
    if QuoteRecord::valid_name(name) {
        Ok(())
    } else {
        Err(QuoteError::InvalidText(format!(
            "'{}' can't be used as a name.",
            name
        )))
    }
}

impl QuoteStore {
    pub fn open(store: Box<dyn Store>) -> Result<Self, StorageError> {
        let nicknames = store.read_nicknames()?;
        Ok(Self {
            store,
            logs: HashMap::new(),
            nicknames,
            today: local_today,
        })
    }

    /// Overrides the source of "today" used for new and deleted quotes.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Makes sure the channel has a log on disk and in memory.
    pub fn open_channel(&mut self, channel: &str) -> Result<(), StorageError> {
        let channel = channel.to_lowercase();
        self.store.touch_log(&channel)?;
        channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        Ok(())
    }

    /// Display name for the channel's streamer; the channel name when unset.
    pub fn nickname(&self, channel: &str) -> String {
        let channel = channel.to_lowercase();
        self.nicknames.get(&channel).cloned().unwrap_or(channel)
    }

    /// Appends a quote and returns its external index.
    pub fn add(&mut self, channel: &str, text: &str, attributed: &str) -> Result<usize, QuoteError> {
        let channel = channel.to_lowercase();
        let text = text.trim();
        check_text(text)?;
        check_name(attributed)?;

        let record = QuoteRecord::new(text, attributed.trim(), (self.today)());
        if !record.fits_message() {
            return Err(QuoteError::TooLarge);
        }

        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        let needle = text.to_lowercase();
        if let Some(position) = log
            .iter()
            .position(|r| r.text.trim().to_lowercase() == needle)
        {
            return Err(QuoteError::Duplicate {
                existing: position + 1,
            });
        }

        self.store.append_log(&channel, &record.to_line())?;
        log.push(record);
        Ok(log.len())
    }

    pub fn get(&mut self, channel: &str, index: i64) -> Result<QuoteView, QuoteError> {
        let channel = channel.to_lowercase();
        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        let position = match slot(index, log.len()) {
            Ok(position) => position,
            Err(QuoteError::IndexTooLarge { .. }) => return Ok(QuoteView::Missing { index }),
            Err(e) => return Err(e),
        };

        let record = &log[position];
        let index = position + 1;
        Ok(if record.is_tombstone() {
            QuoteView::Deleted {
                index,
                date: record.date,
            }
        } else {
            QuoteView::Live {
                index,
                record: record.clone(),
            }
        })
    }

    pub fn random(&mut self, channel: &str) -> Result<QuoteView, StorageError> {
        self.random_with(channel, &mut rand::rng())
    }

    /// Draws uniformly among live quotes.
    pub fn random_with<R: Rng>(
        &mut self,
        channel: &str,
        rng: &mut R,
    ) -> Result<QuoteView, StorageError> {
        let channel = channel.to_lowercase();
        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        if log.is_empty() {
            return Ok(QuoteView::Empty);
        }
        if log.iter().all(QuoteRecord::is_tombstone) {
            return Ok(QuoteView::NoLive);
        }

        loop {
            let position = rng.random_range(0..log.len());
            let record = &log[position];
            if !record.is_tombstone() {
                return Ok(QuoteView::Drawn {
                    index: position + 1,
                    record: record.clone(),
                });
            }
        }
    }

    /// Rewrites a slot in place.
    ///
    /// A live quote keeps its date, and its name unless `attributed` is given.
    /// A tombstoned slot is revived: it takes `attributed` (or the channel
    /// nickname) and today's date.
    pub fn edit(
        &mut self,
        channel: &str,
        index: i64,
        text: &str,
        attributed: Option<&str>,
    ) -> Result<EditOutcome, QuoteError> {
        let channel = channel.to_lowercase();
        let text = text.trim();
        check_text(text)?;
        if let Some(name) = attributed {
            check_name(name)?;
        }
        let nickname = self.nickname(&channel);
        let today = (self.today)();

        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        let position = slot(index, log.len())?;
        let current = &log[position];
        let revived = current.is_tombstone();
        let record = if revived {
            QuoteRecord::new(text, attributed.unwrap_or(&nickname).trim(), today)
        } else {
            QuoteRecord::new(
                text,
                attributed.unwrap_or(&current.attributed).trim(),
                current.date,
            )
        };
        if !record.fits_message() {
            return Err(QuoteError::TooLarge);
        }

        let mut lines: Vec<String> = log.iter().map(QuoteRecord::to_line).collect();
        lines[position] = record.to_line();
        self.store.write_log(&channel, &lines)?;

        let previous = std::mem::replace(&mut log[position], record);
        Ok(if revived {
            EditOutcome::Revived
        } else {
            EditOutcome::Edited { previous }
        })
    }

    /// Tombstones a slot. Deleting a deleted slot changes nothing.
    pub fn delete(&mut self, channel: &str, index: i64, actor: &str) -> Result<DeleteOutcome, QuoteError> {
        let channel = channel.to_lowercase();
        let today = (self.today)();
        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        let position = slot(index, log.len())?;

        if log[position].is_tombstone() {
            return Ok(DeleteOutcome::AlreadyDeleted {
                date: log[position].date,
            });
        }

        let tombstone = QuoteRecord::tombstone(today);
        let mut lines: Vec<String> = log.iter().map(QuoteRecord::to_line).collect();
        lines[position] = tombstone.to_line();
        self.store.write_log(&channel, &lines)?;

        let previous = std::mem::replace(&mut log[position], tombstone);
        tracing::info!(
            "User {} has deleted quote #{} in channel {}, which said: {}",
            actor,
            index,
            channel,
            previous
        );
        Ok(DeleteOutcome::Deleted { previous })
    }

    /// `(total slots, tombstoned slots)`
    pub fn count(&mut self, channel: &str) -> Result<(usize, usize), StorageError> {
        let channel = channel.to_lowercase();
        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        let deleted = log.iter().filter(|r| r.is_tombstone()).count();
        Ok((log.len(), deleted))
    }

    /// Rebinds the channel nickname and moves every live quote attributed to
    /// the old binding over to the new one. Returns how many quotes moved.
    pub fn set_nickname(&mut self, channel: &str, nickname: &str) -> Result<usize, QuoteError> {
        let channel = channel.to_lowercase();
        let nickname = nickname.trim();
        check_name(nickname)?;
        let previous = self.nickname(&channel);

        let log = channel_log(&mut self.logs, self.store.as_ref(), &channel)?;
        let moved: Vec<usize> = log
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_tombstone() && r.attributed == previous)
            .map(|(i, _)| i)
            .collect();

        let mut renamed = log.clone();
        for &i in &moved {
            renamed[i].attributed = nickname.to_string();
            if !renamed[i].fits_message() {
                return Err(QuoteError::TooLarge);
            }
        }

        // The binding goes first; the quotes follow it, or the binding is put back.
        let mut nicknames = self.nicknames.clone();
        nicknames.insert(channel.clone(), nickname.to_string());
        self.store.write_nicknames(&nicknames)?;

        if !moved.is_empty() {
            let lines: Vec<String> = renamed.iter().map(QuoteRecord::to_line).collect();
            if let Err(e) = self.store.write_log(&channel, &lines) {
                if let Err(restore) = self.store.write_nicknames(&self.nicknames) {
                    tracing::error!(
                        "Failed to restore nickname of channel {} after a failed rename: {}",
                        channel,
                        restore
                    );
                }
                return Err(e.into());
            }
            *log = renamed;
        }

        self.nicknames = nicknames;
        Ok(moved.len())
    }

    /// Rewrites every loaded log from memory.
    pub fn save_all(&self) -> Result<(), StorageError> {
        for (channel, log) in &self.logs {
            let lines: Vec<String> = log.iter().map(QuoteRecord::to_line).collect();
            self.store.write_log(channel, &lines)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DELETED_FILL;
    use crate::infrastructure::storage::FileStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use tempfile::TempDir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn test_store() -> (QuoteStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = QuoteStore::open(Box::new(FileStore::open(temp.path()).unwrap()))
            .unwrap()
            .with_today(day);
        (store, temp)
    }

    fn raw_log(temp: &TempDir, channel: &str) -> String {
        fs::read_to_string(temp.path().join("quotes").join(channel)).unwrap()
    }

    /// Always fails to write, for checking that memory is left alone.
    struct ReadOnlyStore;

    impl Store for ReadOnlyStore {
        fn read_log(&self, _channel: &str) -> Result<Vec<String>, StorageError> {
            Ok(vec!["old|bob|2024-01-01".to_string()])
        }
        fn touch_log(&self, _channel: &str) -> Result<(), StorageError> {
            Ok(())
        }
        fn append_log(&self, _channel: &str, _line: &str) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("read only".to_string()))
        }
        fn write_log(&self, _channel: &str, _lines: &[String]) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("read only".to_string()))
        }
        fn read_nicknames(&self) -> Result<BTreeMap<String, String>, StorageError> {
            Ok(BTreeMap::new())
        }
        fn write_nicknames(&self, _nicknames: &BTreeMap<String, String>) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("read only".to_string()))
        }
    }

    #[test]
    fn add_get_delete_edit_scenario() {
        let (mut quotes, temp) = test_store();

        assert_eq!(quotes.add("chan", "funny", "bob").unwrap(), 1);
        assert_eq!(
            quotes.get("chan", 1).unwrap().to_string(),
            "\"funny\" - bob (2024-05-01)"
        );

        let outcome = quotes.delete("chan", 1, "mod").unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted { .. }));
        assert_eq!(
            quotes.get("chan", 1).unwrap().to_string(),
            "Quote #1 was deleted on 2024-05-01."
        );
        assert_eq!(
            raw_log(&temp, "chan"),
            format!("{f}|{f}|2024-05-01\n", f = DELETED_FILL)
        );

        let outcome = quotes.edit("chan", 1, "still funny", Some("alice")).unwrap();
        assert_eq!(outcome, EditOutcome::Revived);
        assert_eq!(
            quotes.get("chan", 1).unwrap(),
            QuoteView::Live {
                index: 1,
                record: QuoteRecord::new("still funny", "alice", day()),
            }
        );
        assert_eq!(raw_log(&temp, "chan"), "still funny|alice|2024-05-01\n");
    }

    #[test]
    fn edit_then_get_returns_written_content() {
        let (mut quotes, _temp) = test_store();
        quotes.add("chan", "one", "bob").unwrap();
        quotes.add("chan", "two", "bob").unwrap();
        quotes.add("chan", "three", "bob").unwrap();

        quotes.edit("chan", 2, "deux", None).unwrap();
        assert_eq!(
            quotes.get("chan", 2).unwrap().to_string(),
            "\"deux\" - bob (2024-05-01)"
        );
        quotes.edit("chan", 3, "trois", Some("amy")).unwrap();
        assert_eq!(
            quotes.get("chan", 3).unwrap().to_string(),
            "\"trois\" - amy (2024-05-01)"
        );
        assert_eq!(quotes.get("chan", 1).unwrap().to_string(), "\"one\" - bob (2024-05-01)");
    }

    #[test]
    fn live_edit_keeps_original_date() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("quotes")).unwrap();
        fs::write(temp.path().join("quotes").join("chan"), "old|bob|2020-02-02\n").unwrap();
        let mut quotes = QuoteStore::open(Box::new(FileStore::open(temp.path()).unwrap()))
            .unwrap()
            .with_today(day);

        let outcome = quotes.edit("chan", 1, "new", None).unwrap();
        assert_eq!(
            outcome,
            EditOutcome::Edited {
                previous: QuoteRecord::new("old", "bob", NaiveDate::from_ymd_opt(2020, 2, 2).unwrap())
            }
        );
        assert_eq!(raw_log(&temp, "chan"), "new|bob|2020-02-02\n");
    }

    #[test]
    fn delete_is_idempotent_and_keeps_length() {
        let (mut quotes, _temp) = test_store();
        quotes.add("chan", "a", "bob").unwrap();
        quotes.add("chan", "b", "bob").unwrap();

        assert!(matches!(
            quotes.delete("chan", 2, "mod").unwrap(),
            DeleteOutcome::Deleted { .. }
        ));
        assert_eq!(
            quotes.delete("chan", 2, "mod").unwrap(),
            DeleteOutcome::AlreadyDeleted { date: day() }
        );
        assert_eq!(quotes.count("chan").unwrap(), (2, 1));
    }

    #[test]
    fn index_bounds() {
        let (mut quotes, _temp) = test_store();
        quotes.add("chan", "a", "bob").unwrap();

        assert!(matches!(quotes.get("chan", -1), Err(QuoteError::NegativeIndex(-1))));
        assert!(matches!(quotes.get("chan", 0), Err(QuoteError::ZeroIndex)));
        assert_eq!(quotes.get("chan", 2).unwrap(), QuoteView::Missing { index: 2 });

        assert!(matches!(
            quotes.edit("chan", 2, "x", None),
            Err(QuoteError::IndexTooLarge { index: 2, len: 1 })
        ));
        assert!(matches!(quotes.edit("chan", -3, "x", None), Err(QuoteError::NegativeIndex(-3))));
        assert!(matches!(
            quotes.delete("chan", 5, "mod"),
            Err(QuoteError::IndexTooLarge { .. })
        ));
    }

    #[test]
    fn duplicates_are_refused_case_insensitively() {
        let (mut quotes, _temp) = test_store();
        quotes.add("chan", "Hello There", "bob").unwrap();
        assert!(matches!(
            quotes.add("chan", "  hello there ", "amy"),
            Err(QuoteError::Duplicate { existing: 1 })
        ));
        // Other channels are independent.
        assert_eq!(quotes.add("other", "hello there", "amy").unwrap(), 1);
        assert_eq!(quotes.count("chan").unwrap(), (1, 0));
    }

    #[test]
    fn deleted_marker_cannot_be_written_as_content() {
        let (mut quotes, temp) = test_store();
        assert!(matches!(
            quotes.set_nickname("chan", DELETED_FILL),
            Err(QuoteError::InvalidText(_))
        ));
        assert!(matches!(
            quotes.add("chan", DELETED_FILL, "bob"),
            Err(QuoteError::InvalidText(_))
        ));
        assert!(matches!(
            quotes.add("chan", "fine", &format!(" {} ", DELETED_FILL)),
            Err(QuoteError::InvalidText(_))
        ));

        quotes.add("chan", "live", "bob").unwrap();
        assert!(matches!(
            quotes.edit("chan", 1, DELETED_FILL, Some(DELETED_FILL)),
            Err(QuoteError::InvalidText(_))
        ));
        assert!(matches!(quotes.get("chan", 1).unwrap(), QuoteView::Live { .. }));
        assert_eq!(raw_log(&temp, "chan"), "live|bob|2024-05-01
");
        assert_eq!(quotes.nickname("chan"), "chan");
    }

    #[test]
    fn oversized_quotes_are_not_written() {
        let (mut quotes, temp) = test_store();
        assert!(matches!(
            quotes.add("chan", &"x".repeat(480), "bob"),
            Err(QuoteError::TooLarge)
        ));
        quotes.add("chan", "short", "bob").unwrap();
        assert!(matches!(
            quotes.edit("chan", 1, &"y".repeat(480), None),
            Err(QuoteError::TooLarge)
        ));
        assert_eq!(raw_log(&temp, "chan"), "short|bob|2024-05-01\n");
    }

    #[test]
    fn random_never_returns_a_tombstone() {
        let (mut quotes, _temp) = test_store();
        for text in ["a", "b", "c", "d"] {
            quotes.add("chan", text, "bob").unwrap();
        }
        quotes.delete("chan", 1, "mod").unwrap();
        quotes.delete("chan", 3, "mod").unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            match quotes.random_with("chan", &mut rng).unwrap() {
                QuoteView::Drawn { index, record } => {
                    assert!(index == 2 || index == 4);
                    assert!(!record.is_tombstone());
                }
                other => panic!("unexpected draw: {:?}", other),
            }
        }
    }

    #[test]
    fn random_on_empty_and_all_deleted_logs() {
        let (mut quotes, _temp) = test_store();
        assert_eq!(quotes.random("chan").unwrap(), QuoteView::Empty);
        quotes.add("chan", "a", "bob").unwrap();
        quotes.delete("chan", 1, "mod").unwrap();
        assert_eq!(quotes.random("chan").unwrap(), QuoteView::NoLive);
    }

    #[test]
    fn nickname_rename_rewrites_only_the_old_binding() {
        let (mut quotes, temp) = test_store();
        quotes.set_nickname("chan", "bob").unwrap();
        quotes.add("chan", "one", "bob").unwrap();
        quotes.add("chan", "two", "carol").unwrap();
        quotes.add("chan", "three", "bob").unwrap();

        assert_eq!(quotes.set_nickname("chan", "bobby").unwrap(), 2);
        assert_eq!(quotes.nickname("chan"), "bobby");
        assert_eq!(
            raw_log(&temp, "chan"),
            "one|bobby|2024-05-01\ntwo|carol|2024-05-01\nthree|bobby|2024-05-01\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("nicknames.txt")).unwrap(),
            "chan=bobby\n"
        );
    }

    #[test]
    fn nickname_defaults_to_channel_name() {
        let (mut quotes, _temp) = test_store();
        assert_eq!(quotes.nickname("SpicyChan"), "spicychan");
        quotes.add("spicychan", "one", "spicychan").unwrap();
        assert_eq!(quotes.set_nickname("spicychan", "Spicy").unwrap(), 1);
    }

    #[test]
    fn revival_without_name_uses_nickname() {
        let (mut quotes, _temp) = test_store();
        quotes.set_nickname("chan", "Streamer").unwrap();
        quotes.add("chan", "a", "someone").unwrap();
        quotes.delete("chan", 1, "mod").unwrap();
        quotes.edit("chan", 1, "b", None).unwrap();
        assert_eq!(
            quotes.get("chan", 1).unwrap().to_string(),
            "\"b\" - Streamer (2024-05-01)"
        );
    }

    #[test]
    fn logs_survive_reopen() {
        let (mut quotes, temp) = test_store();
        quotes.add("chan", "persisted", "bob").unwrap();
        quotes.delete("chan", 1, "mod").unwrap();
        quotes.add("chan", "second", "bob").unwrap();
        drop(quotes);

        let mut reopened = QuoteStore::open(Box::new(FileStore::open(temp.path()).unwrap())).unwrap();
        assert_eq!(reopened.count("chan").unwrap(), (2, 1));
        assert_eq!(
            reopened.get("chan", 2).unwrap().to_string(),
            "\"second\" - bob (2024-05-01)"
        );
    }

    /// Nickname writes succeed, log rewrites fail.
    struct LogFailsStore {
        inner: FileStore,
    }

    impl Store for LogFailsStore {
        fn read_log(&self, channel: &str) -> Result<Vec<String>, StorageError> {
            self.inner.read_log(channel)
        }
        fn touch_log(&self, channel: &str) -> Result<(), StorageError> {
            self.inner.touch_log(channel)
        }
        fn append_log(&self, channel: &str, line: &str) -> Result<(), StorageError> {
            self.inner.append_log(channel, line)
        }
        fn write_log(&self, _channel: &str, _lines: &[String]) -> Result<(), StorageError> {
            Err(StorageError::Corrupt("disk full".to_string()))
        }
        fn read_nicknames(&self) -> Result<BTreeMap<String, String>, StorageError> {
            self.inner.read_nicknames()
        }
        fn write_nicknames(&self, nicknames: &BTreeMap<String, String>) -> Result<(), StorageError> {
            self.inner.write_nicknames(nicknames)
        }
    }

    #[test]
    fn failed_rename_keeps_binding_and_quotes_together() {
        let temp = TempDir::new().unwrap();
        let inner = FileStore::open(temp.path()).unwrap();
        let mut quotes = QuoteStore::open(Box::new(LogFailsStore { inner }))
            .unwrap()
            .with_today(day);
        quotes.add("chan", "one", "chan").unwrap();

        assert!(matches!(
            quotes.set_nickname("chan", "Spicy"),
            Err(QuoteError::Storage(_))
        ));
        assert_eq!(quotes.nickname("chan"), "chan");
        assert_eq!(quotes.get("chan", 1).unwrap().to_string(), "\"one\" - chan (2024-05-01)");
        assert_eq!(raw_log(&temp, "chan"), "one|chan|2024-05-01\n");
        assert_eq!(fs::read_to_string(temp.path().join("nicknames.txt")).unwrap(), "");

        // Nothing to move, so only the binding is written.
        assert_eq!(quotes.set_nickname("other", "Pepper").unwrap(), 0);
        assert_eq!(quotes.nickname("other"), "Pepper");
    }

    #[test]
    fn failed_writes_leave_memory_untouched() {
        let mut quotes = QuoteStore::open(Box::new(ReadOnlyStore)).unwrap().with_today(day);

        assert!(matches!(quotes.add("chan", "new", "bob"), Err(QuoteError::Storage(_))));
        assert!(matches!(quotes.delete("chan", 1, "mod"), Err(QuoteError::Storage(_))));
        assert!(matches!(quotes.edit("chan", 1, "x", None), Err(QuoteError::Storage(_))));
        assert!(quotes.set_nickname("chan", "bob").is_err());

        assert_eq!(quotes.count("chan").unwrap(), (1, 0));
        assert_eq!(quotes.get("chan", 1).unwrap().to_string(), "\"old\" - bob (2024-01-01)");
        assert_eq!(quotes.nickname("chan"), "chan");
    }
}
