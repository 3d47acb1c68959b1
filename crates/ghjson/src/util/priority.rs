//! Priority-ordered handler list shared by the property and object handler
//! registries.

use std::sync::Arc;

/// A handler that can be placed in a [`PriorityList`].
pub trait Ranked {
    fn rank_name(&self) -> &str;
    fn rank(&self) -> i32;
}

/// Handlers sorted by descending priority, ties broken by registration
/// order. Readers take cheap snapshots of the current order.
pub struct PriorityList<H: ?Sized> {
    entries: Vec<(Arc<H>, u64)>,
    next_seq: u64,
    ordered: Arc<[Arc<H>]>,
}

impl<H: ?Sized + Ranked> PriorityList<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
            ordered: Arc::from(Vec::new()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(h, _)| h.rank_name() == name)
    }

    /// Inserts without a uniqueness check.
    pub fn push(&mut self, handler: Arc<H>) {
        self.entries.push((handler, self.next_seq));
        self.next_seq += 1;
        self.reorder();
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<H>> {
        let pos = self.entries.iter().position(|(h, _)| h.rank_name() == name)?;
        let (removed, _) = self.entries.remove(pos);
        self.reorder();
        Some(removed)
    }

    /// Current order, highest priority first.
    pub fn snapshot(&self) -> Arc<[Arc<H>]> {
        self.ordered.clone()
    }

    fn reorder(&mut self) {
        self.entries
            .sort_by(|(a, sa), (b, sb)| b.rank().cmp(&a.rank()).then(sa.cmp(sb)));
        self.ordered = self.entries.iter().map(|(h, _)| h.clone()).collect();
    }
}

impl<H: ?Sized + Ranked> Default for PriorityList<H> {
    fn default() -> Self {
        Self::new()
    }
}
