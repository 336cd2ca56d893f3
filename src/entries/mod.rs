mod key;
mod repo;
mod store;
pub(crate) use self::key::DateKey;
pub(crate) use self::repo::{EntryRepository, JsonFileRepository, MemoryRepository, RepoError};
pub(crate) use self::store::{Entry, EntryStore, PhotoRef};
