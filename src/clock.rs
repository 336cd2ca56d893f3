use time::{error::IndeterminateOffset, Date, OffsetDateTime, UtcOffset};

/// Source of the current date
pub(crate) trait Clock {
    fn today(&self) -> Date;
}

/// Reads the wall clock in the local time zone.
///
/// The local offset is captured once, at construction, because `time` can
/// only determine it soundly while the process is single-threaded, and the
/// log writer starts a thread of its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub(crate) fn new() -> Result<LocalClock, IndeterminateOffset> {
        let offset = UtcOffset::current_local_offset()?;
        Ok(LocalClock { offset })
    }
}

impl Clock for LocalClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }
}

#[cfg(test)]
pub(crate) use self::testing::FixedClock;
