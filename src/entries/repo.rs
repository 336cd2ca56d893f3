use super::key::DateKey;
use super::store::Entry;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Date;

/// Durable home of entries.  The session seeds its store from here whenever
/// a new month comes into view and hands every save back to it.
pub(crate) trait EntryRepository {
    /// Returns the stored entries dated from `first` through `last`,
    /// inclusive
    fn load_range(&self, first: Date, last: Date) -> Result<Vec<(DateKey, Entry)>, RepoError>;

    fn save(&mut self, key: DateKey, entry: &Entry) -> Result<(), RepoError>;
}

/// Keeps entries for the lifetime of the process only
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MemoryRepository(BTreeMap<DateKey, Entry>);

impl MemoryRepository {
    pub(crate) fn new() -> MemoryRepository {
        MemoryRepository::default()
    }
}

impl EntryRepository for MemoryRepository {
    fn load_range(&self, first: Date, last: Date) -> Result<Vec<(DateKey, Entry)>, RepoError> {
        Ok(load_range(&self.0, first, last))
    }

    fn save(&mut self, key: DateKey, entry: &Entry) -> Result<(), RepoError> {
        self.0.insert(key, entry.clone());
        Ok(())
    }
}

/// Keeps entries in a JSON object mapping `YYYY-MM-DD` keys to entries.  The
/// whole file is rewritten on every save.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct JsonFileRepository {
    path: PathBuf,
    entries: BTreeMap<DateKey, Entry>,
}

impl JsonFileRepository {
    /// Reads the journal at `path`.  A missing or blank file is an empty
    /// journal.
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<JsonFileRepository, RepoError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(s) if s.trim().is_empty() => BTreeMap::new(),
            Ok(s) => serde_json::from_str(&s).map_err(|source| RepoError::Decode {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(RepoError::Read { path, source }),
        };
        info!(
            "event=journal_open path={} entries={}",
            path.display(),
            entries.len()
        );
        Ok(JsonFileRepository { path, entries })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), RepoError> {
        let write_err = |source| RepoError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut src = serde_json::to_string_pretty(&self.entries).map_err(RepoError::Encode)?;
        src.push('\n');
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, src).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        debug!(
            "event=journal_flush path={} entries={}",
            self.path.display(),
            self.entries.len()
        );
        Ok(())
    }
}

impl EntryRepository for JsonFileRepository {
    fn load_range(&self, first: Date, last: Date) -> Result<Vec<(DateKey, Entry)>, RepoError> {
        Ok(load_range(&self.entries, first, last))
    }

    /// On failure the previous entry for `key` is restored, so the
    /// repository never reports entries the file does not hold.
    fn save(&mut self, key: DateKey, entry: &Entry) -> Result<(), RepoError> {
        let previous = self.entries.insert(key, entry.clone());
        if let Err(e) = self.flush() {
            match previous {
                Some(prev) => {
                    self.entries.insert(key, prev);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

fn load_range(
    entries: &BTreeMap<DateKey, Entry>,
    first: Date,
    last: Date,
) -> Vec<(DateKey, Entry)> {
    if first > last {
        return Vec::new();
    }
    entries
        .range(DateKey::from(first)..=DateKey::from(last))
        .map(|(k, e)| (*k, e.clone()))
        .collect()
}

#[derive(Debug, Error)]
pub(crate) enum RepoError {
    #[error("failed to read journal {}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write journal {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to decode journal {}", .path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode journal")]
    Encode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::PhotoRef;
    use time::macros::date;

    fn note(s: &str) -> Entry {
        Entry::new(None, Some(s.to_owned()))
    }

    #[test]
    fn test_memory_load_range_is_inclusive() {
        let mut repo = MemoryRepository::new();
        for (d, n) in [
            (date!(2024 - 02 - 24), "before"),
            (date!(2024 - 02 - 25), "first"),
            (date!(2024 - 03 - 15), "middle"),
            (date!(2024 - 04 - 06), "last"),
            (date!(2024 - 04 - 07), "after"),
        ] {
            repo.save(DateKey::from(d), &note(n)).unwrap();
        }
        let loaded = repo
            .load_range(date!(2024 - 02 - 25), date!(2024 - 04 - 06))
            .unwrap();
        let notes = loaded
            .iter()
            .map(|(_, e)| e.note.as_deref().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(notes, ["first", "middle", "last"]);
    }

    #[test]
    fn test_memory_load_range_reversed_bounds() {
        let mut repo = MemoryRepository::new();
        repo.save(DateKey::from(date!(2024 - 03 - 01)), &note("x"))
            .unwrap();
        let loaded = repo
            .load_range(date!(2024 - 03 - 31), date!(2024 - 03 - 01))
            .unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_json_missing_file_is_empty() {
        let tmpdir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(tmpdir.path().join("journal.json")).unwrap();
        assert!(repo
            .load_range(Date::MIN, Date::MAX)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_json_save_and_reopen() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("nested").join("journal.json");
        let mut repo = JsonFileRepository::open(&path).unwrap();
        let dentist = note("Dentist");
        let beach = Entry::new(Some(PhotoRef::new("https://example.com/beach.jpg")), None);
        repo.save(DateKey::from(date!(2024 - 03 - 07)), &dentist)
            .unwrap();
        repo.save(DateKey::from(date!(2024 - 03 - 09)), &beach)
            .unwrap();
        assert_eq!(repo.path(), path);

        let src = fs::read_to_string(&path).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&src).unwrap(),
            serde_json::json!({
                "2024-03-07": {"note": "Dentist"},
                "2024-03-09": {"photo": "https://example.com/beach.jpg"},
            })
        );

        let reopened = JsonFileRepository::open(&path).unwrap();
        let loaded = reopened
            .load_range(date!(2024 - 03 - 01), date!(2024 - 03 - 08))
            .unwrap();
        assert_eq!(loaded, [(DateKey::from(date!(2024 - 03 - 07)), dentist)]);
    }

    #[test]
    fn test_json_save_overwrites() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("journal.json");
        let key = DateKey::from(date!(2024 - 03 - 07));
        let mut repo = JsonFileRepository::open(&path).unwrap();
        repo.save(key, &note("Dentist")).unwrap();
        repo.save(key, &Entry::default()).unwrap();
        let reopened = JsonFileRepository::open(&path).unwrap();
        assert_eq!(
            reopened.load_range(key.date(), key.date()).unwrap(),
            [(key, Entry::default())]
        );
    }

    #[test]
    fn test_json_blank_file_is_empty() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("journal.json");
        fs::write(&path, "\n").unwrap();
        let repo = JsonFileRepository::open(&path).unwrap();
        assert!(repo
            .load_range(Date::MIN, Date::MAX)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_json_failed_save_keeps_previous_entry() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("journal.json");
        let mut repo = JsonFileRepository::open(&path).unwrap();
        let day = DateKey::from(date!(2024 - 03 - 07));
        let other = DateKey::from(date!(2024 - 03 - 08));
        repo.save(day, &note("Dentist")).unwrap();
        // A directory in the way of the temporary file makes every write fail
        fs::create_dir(tmpdir.path().join("journal.json.tmp")).unwrap();
        let err = repo.save(day, &note("Cancelled")).unwrap_err();
        assert!(matches!(err, RepoError::Write { .. }), "{err:?}");
        assert!(repo.save(other, &note("Rain")).is_err());
        assert_eq!(
            repo.load_range(date!(2024 - 03 - 01), date!(2024 - 03 - 31))
                .unwrap(),
            [(day, note("Dentist"))]
        );
        let reopened = JsonFileRepository::open(&path).unwrap();
        assert_eq!(
            reopened
                .load_range(date!(2024 - 03 - 01), date!(2024 - 03 - 31))
                .unwrap(),
            [(day, note("Dentist"))]
        );
    }

    #[test]
    fn test_json_signed_year_key_is_rejected() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("journal.json");
        fs::write(
            &path,
            r#"{"+2024-03-07": {"note": "Old"}, "2024-03-07": {"note": "New"}}"#,
        )
        .unwrap();
        let err = JsonFileRepository::open(&path).unwrap_err();
        assert!(matches!(err, RepoError::Decode { .. }), "{err:?}");
    }

    #[test]
    fn test_json_malformed_file() {
        let tmpdir = tempfile::tempdir().unwrap();
        let path = tmpdir.path().join("journal.json");
        fs::write(&path, r#"{"2024-3-7": {"note": "Dentist"}}"#).unwrap();
        let err = JsonFileRepository::open(&path).unwrap_err();
        assert!(matches!(err, RepoError::Decode { .. }), "{err:?}");
        assert_eq!(
            err.to_string(),
            format!("failed to decode journal {}", path.display())
        );
    }
}
