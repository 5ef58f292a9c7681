//! Linear undo/redo over whole-scene snapshots.

pub const DEFAULT_LIMIT: usize = 50;

/// Ordered snapshots plus the index of the one currently shown.
///
/// The first entry is the baseline the editor started from, so a history
/// holding `[A, B, C]` at index 2 can undo twice.
#[derive(Clone, Debug)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, DEFAULT_LIMIT)
    }

    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Drops any redo tail, appends `snapshot` and makes it current.
    pub fn commit(&mut self, snapshot: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Lowering the limit drops the oldest entries first.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
            self.index = self.index.saturating_sub(overflow);
        }
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Forgets everything and starts over from `baseline`.
    pub fn reset(&mut self, baseline: T) {
        self.entries.clear();
        self.entries.push(baseline);
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_after_undo_truncates_redo_tail() {
        let mut h = History::new('A');
        h.commit('B');
        h.commit('C');
        assert_eq!(h.index(), 2);
        assert_eq!(h.undo(), Some(&'B'));
        h.commit('D');
        assert_eq!(h.entries(), &['A', 'B', 'D']);
        assert!(!h.can_redo());
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut h = History::new(0);
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);
        h.commit(1);
        assert_eq!(h.undo(), Some(&0));
        assert_eq!(h.undo(), None);
        assert_eq!(h.index(), 0);
    }

    #[test]
    fn oldest_entries_fall_off_past_the_limit() {
        let mut h = History::with_limit(0, 3);
        for i in 1..=5 {
            h.commit(i);
        }
        assert_eq!(h.entries(), &[3, 4, 5]);
        assert_eq!(h.index(), 2);
        assert_eq!(h.undo(), Some(&4));
        assert_eq!(h.undo(), Some(&3));
        assert_eq!(h.undo(), None);
    }
}
