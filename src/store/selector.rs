//! Selector - the "find by type and state" filter pushed down to the store.

use crate::record::{RecordKind, RecordState, Timestamp};

use super::StoredRecord;

/// Filter evaluated by the store against row header columns.
///
/// An empty kind set matches every kind. The date range is inclusive on both
/// ends and only matches rows that carry a business date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    pub kinds: Vec<RecordKind>,
    pub state: Option<RecordState>,
    pub between: Option<(Timestamp, Timestamp)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: RecordKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    pub fn kinds(mut self, kinds: &[RecordKind]) -> Self {
        for kind in kinds {
            self = self.kind(*kind);
        }
        self
    }

    pub fn state(mut self, state: RecordState) -> Self {
        self.state = Some(state);
        self
    }

    /// Shorthand for `state(RecordState::Active)`.
    pub fn active(self) -> Self {
        self.state(RecordState::Active)
    }

    pub fn between(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.between = Some((start, end));
        self
    }

    /// Restrict the kind set to `allowed`. Kinds outside it are dropped; an
    /// empty set becomes `allowed`.
    pub(crate) fn restricted_to(&self, allowed: &[RecordKind]) -> Selector {
        let kinds = if self.kinds.is_empty() {
            allowed.to_vec()
        } else {
            self.kinds
                .iter()
                .copied()
                .filter(|kind| allowed.contains(kind))
                .collect()
        };
        Selector {
            kinds,
            state: self.state,
            between: self.between,
        }
    }

    /// Whether the restricted kind set ended up empty.
    pub(crate) fn matches_nothing(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn matches(&self, row: &StoredRecord) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&row.kind) {
            return false;
        }
        if let Some(state) = self.state {
            if row.state != state {
                return false;
            }
        }
        if let Some((start, end)) = self.between {
            match row.occurred_at_ms {
                Some(at) => {
                    if at < start.timestamp_millis() || at > end.timestamp_millis() {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}
