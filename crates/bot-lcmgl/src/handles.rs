/// Arena mapping producer-chosen small integer IDs to sink handles.
///
/// IDs may be sparse and reused. Slots grow on demand up to the highest ID seen; the caller bounds
/// IDs (see `DecoderConfig::max_resource_id`) before inserting.
#[derive(Debug, Clone)]
pub struct HandleTable<H> {
    slots: Vec<Option<H>>,
    live: usize,
}

impl<H> Default for HandleTable<H> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }
}

impl<H: Copy> HandleTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<H> {
        self.slots.get(id as usize).copied().flatten()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Stores `handle` under `id`, returning the handle it replaced.
    pub fn insert(&mut self, id: u32, handle: H) -> Option<H> {
        let idx = id as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        let prev = self.slots[idx].replace(handle);
        if prev.is_none() {
            self.live += 1;
        }
        prev
    }

    pub fn remove(&mut self, id: u32) -> Option<H> {
        let prev = self.slots.get_mut(id as usize)?.take();
        if prev.is_some() {
            self.live -= 1;
        }
        prev
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Removes every entry, yielding `(id, handle)` in ascending ID order.
    pub fn drain(&mut self) -> impl Iterator<Item = (u32, H)> + '_ {
        self.live = 0;
        self.slots
            .drain(..)
            .enumerate()
            .filter_map(|(idx, slot)| slot.map(|h| (idx as u32, h)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_ids_round_trip() {
        let mut t = HandleTable::new();
        assert_eq!(t.insert(7, 70u32), None);
        assert_eq!(t.insert(2, 20), None);
        assert_eq!(t.get(7), Some(70));
        assert_eq!(t.get(3), None);
        assert_eq!(t.get(1000), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn reinsert_returns_previous_handle() {
        let mut t = HandleTable::new();
        t.insert(1, 10u32);
        assert_eq!(t.insert(1, 11), Some(10));
        assert_eq!(t.len(), 1);
        assert_eq!(t.remove(1), Some(11));
        assert_eq!(t.remove(1), None);
        assert!(t.is_empty());
    }

    #[test]
    fn drain_yields_ascending_ids() {
        let mut t = HandleTable::new();
        t.insert(5, 'b');
        t.insert(0, 'a');
        let drained: Vec<_> = t.drain().collect();
        assert_eq!(drained, vec![(0, 'a'), (5, 'b')]);
        assert!(t.is_empty());
        assert_eq!(t.get(5), None);
    }
}
