#![forbid(unsafe_code)]

use std::collections::VecDeque;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const DEFAULT_CAPACITY: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    /// RFC 3339, UTC.
    pub at: String,
}

/// Bounded queue of user-facing notices. The oldest entry is evicted when full.
#[derive(Debug)]
pub struct Notices {
    queue: VecDeque<Notice>,
    capacity: usize,
}

impl Default for Notices {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

impl Notices {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            level,
            text: text.into(),
            at: now_rfc3339(),
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text);
    }

    pub fn failure(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Failure, text);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    /// Take every queued notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_notice_is_evicted() {
        let mut notices = Notices::with_capacity(2);
        notices.success("one");
        notices.failure("two");
        notices.failure("three");

        let texts: Vec<_> = notices.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(notices.latest().map(|n| n.level), Some(NoticeLevel::Failure));
    }

    #[test]
    fn drain_empties_and_timestamps_parse() {
        let mut notices = Notices::default();
        notices.success("saved");
        let drained = notices.drain();
        assert!(notices.is_empty());
        assert_eq!(drained.len(), 1);
        OffsetDateTime::parse(&drained[0].at, &Rfc3339).expect("rfc3339 timestamp");
    }
}
