use super::key::DateKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque reference to a day's photo: a local path before upload or a URL
/// after.  Never inspected.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct PhotoRef(String);

impl PhotoRef {
    pub(crate) fn new<S: Into<String>>(s: S) -> PhotoRef {
        PhotoRef(s.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the user has attached to a single day
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) photo: Option<PhotoRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) note: Option<String>,
}

impl Entry {
    pub(crate) fn new(photo: Option<PhotoRef>, note: Option<String>) -> Entry {
        Entry { photo, note }
    }

    /// An entry with both fields cleared still exists but draws like a day
    /// without one
    pub(crate) fn is_empty(&self) -> bool {
        self.photo.is_none() && self.note.is_none()
    }
}

/// The entries known to the current session, keyed by date.
///
/// `revision` is bumped by every mutation so that anything derived from the
/// store can tell when it is stale.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct EntryStore {
    entries: BTreeMap<DateKey, Entry>,
    revision: u64,
}

impl EntryStore {
    pub(crate) fn new() -> EntryStore {
        EntryStore::default()
    }

    /// Inserts `entry` for `key`, replacing whatever was there
    pub(crate) fn upsert(&mut self, key: DateKey, entry: Entry) {
        self.entries.insert(key, entry);
        self.revision += 1;
    }

    pub(crate) fn lookup(&self, key: &DateKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Loads records supplied by persistence.  Keys not mentioned in
    /// `records` are kept as they are.
    pub(crate) fn seed<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = (DateKey, Entry)>,
    {
        self.entries.extend(records);
        self.revision += 1;
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
