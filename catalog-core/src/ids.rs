//! Identifier generation
//!
//! Ids look like millisecond timestamps (so they sort with ids written by
//! older snapshots) but are strictly increasing: two entities created within
//! the same clock tick still get distinct ids.
//!
//! Once the sequence reaches `i64::MAX`, ids are handed out from the gaps
//! between the ids that existed when the session started, counting up from
//! the current time. They never repeat within the session.

use crate::model::EntityId;
use chrono::Utc;
use std::collections::HashSet;

/// Monotonic id source for one catalog session
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: EntityId,
    /// Sequence ids are all above this; gap ids are all below it
    floor: EntityId,
    /// Ids known to be in use at or below `floor`
    reserved: HashSet<EntityId>,
    /// Next gap candidate
    gap_cursor: EntityId,
}

impl IdGenerator {
    /// Create a generator whose first id is at least the current time in ms
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that never issues an id `<= floor`
    pub fn starting_after(floor: EntityId) -> Self {
        Self {
            last: floor,
            floor,
            ..Self::default()
        }
    }

    /// Create a generator for a dataset already holding `existing` ids
    ///
    /// New ids start above the largest of them and never collide with any.
    pub fn for_existing(existing: impl IntoIterator<Item = EntityId>) -> Self {
        let reserved: HashSet<EntityId> = existing.into_iter().collect();
        let floor = reserved.iter().copied().max().unwrap_or(0);
        Self {
            reserved,
            ..Self::starting_after(floor)
        }
    }

    /// Ensure `id` is never issued
    pub fn observe(&mut self, id: EntityId) {
        if id > self.last {
            self.last = id;
        }
        if id <= self.floor {
            self.reserved.insert(id);
        }
    }

    /// Issue the next id, or `None` once every id is used up
    pub fn next_id(&mut self) -> Option<EntityId> {
        match self.last.checked_add(1) {
            Some(next) => {
                let id = next.max(now_millis());
                self.last = id;
                Some(id)
            }
            None => self.next_gap_id(),
        }
    }

    /// The most recently issued sequence id (or observed id)
    pub fn last(&self) -> EntityId {
        self.last
    }

    fn next_gap_id(&mut self) -> Option<EntityId> {
        let mut candidate = self.gap_cursor.max(now_millis()).max(0);
        while candidate < self.floor {
            if !self.reserved.contains(&candidate) {
                self.gap_cursor = candidate + 1;
                return Some(candidate);
            }
            candidate += 1;
        }
        None
    }
}

fn now_millis() -> EntityId {
    Utc::now().timestamp_millis()
}
