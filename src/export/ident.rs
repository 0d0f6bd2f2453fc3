//! Sequential 4-digit artifact identifiers that avoid recently used values.

use std::collections::{HashSet, VecDeque};

use crate::{
    export::storage::KvStore,
    foundation::error::ForgeResult,
};

pub const COUNTER_KEY: &str = "layerforge:export:counter";
pub const RECENT_KEY: &str = "layerforge:export:recent";

/// Size of the identifier space; values wrap modulo this.
pub const ID_SPACE: u32 = 10_000;

const FIRST_ID: u32 = 1;

/// An allocated identifier in `0..10000`, displayed zero-padded to four digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(u16);

impl ArtifactId {
    pub fn new(v: u32) -> Self {
        Self((v % ID_SPACE) as u16)
    }

    pub fn value(self) -> u32 {
        u32::from(self.0)
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Next-candidate counter plus a bounded history of issued identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactCounter {
    next: u32,
    recent: VecDeque<u32>,
    history_len: usize,
}

impl ArtifactCounter {
    pub fn new(history_len: usize) -> Self {
        Self {
            next: FIRST_ID,
            recent: VecDeque::new(),
            history_len,
        }
    }

    /// Restore from `store`. Missing or unreadable values fall back to a fresh counter.
    pub fn load(store: &dyn KvStore, history_len: usize) -> Self {
        let mut counter = Self::new(history_len);

        match store.get(COUNTER_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u32>() {
                Ok(v) => counter.next = v % ID_SPACE,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring stored counter"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "counter unavailable"),
        }

        match store.get(RECENT_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<u32>>(&raw) {
                Ok(ids) => {
                    counter.recent = ids.into_iter().filter(|v| *v < ID_SPACE).collect();
                    counter.trim_history();
                }
                Err(e) => tracing::warn!(error = %e, "ignoring stored history"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "history unavailable"),
        }
        counter
    }

    pub fn persist(&self, store: &mut dyn KvStore) -> ForgeResult<()> {
        store.set(COUNTER_KEY, &self.next.to_string())?;
        let recent: Vec<u32> = self.recent.iter().copied().collect();
        store.set(RECENT_KEY, &serde_json::to_string(&recent)?)?;
        Ok(())
    }

    /// Candidate the next allocation starts from.
    pub fn peek_next(&self) -> u32 {
        self.next
    }

    pub fn recent(&self) -> impl Iterator<Item = ArtifactId> + '_ {
        self.recent.iter().map(|v| ArtifactId::new(*v))
    }

    /// Take the first value at or after the counter that is not in the history.
    ///
    /// After a full lap without a free value, the counter's own value is reused.
    pub fn allocate(&mut self) -> ArtifactId {
        let used: HashSet<u32> = self.recent.iter().copied().collect();
        let mut candidate = self.next;
        let mut chosen = None;
        for _ in 0..ID_SPACE {
            if !used.contains(&candidate) {
                chosen = Some(candidate);
                break;
            }
            candidate = (candidate + 1) % ID_SPACE;
        }
        let id = chosen.unwrap_or_else(|| {
            tracing::warn!(next = self.next, "identifier space exhausted; reusing");
            self.next
        });

        self.next = (id + 1) % ID_SPACE;
        self.recent.push_back(id);
        self.trim_history();
        ArtifactId::new(id)
    }

    fn trim_history(&mut self) {
        while self.recent.len() > self.history_len {
            self.recent.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/ident.rs"]
mod tests;
