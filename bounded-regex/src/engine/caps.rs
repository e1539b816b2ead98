//! Capture slots, keyed by each group's body offset. Slot 0 is reserved
//! for the whole match and filled by the driver on success.

use crate::{error::ErrorKind, MAX_CAPTURES};

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    key: Option<usize>,
    start: usize,
    len: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct CapSet {
    slots: [Slot; MAX_CAPTURES],
    len: usize,
}

impl CapSet {
    pub(crate) fn new() -> CapSet {
        CapSet { slots: [Slot::default(); MAX_CAPTURES], len: 1 }
    }

    /// Forgets every group capture, keeping only the reserved whole-match
    /// slot.
    pub(crate) fn reset(&mut self) {
        self.slots = [Slot::default(); MAX_CAPTURES];
        self.len = 1;
    }

    /// Saves a group capture. A later save for the same group overwrites
    /// the slot: captures hold the last successful match of each group.
    pub(crate) fn save(&mut self, key: usize, start: usize, len: usize) -> Result<(), ErrorKind> {
        let mut target = None;
        for i in 1..self.len {
            if self.slots[i].key == Some(key) || self.slots[i].key.is_none() {
                target = Some(i);
                break;
            }
        }
        let i = match target {
            Some(i) => i,
            None => {
                if self.len >= MAX_CAPTURES {
                    return Err(ErrorKind::TooManyCaptures);
                }
                self.len += 1;
                self.len - 1
            }
        };
        self.slots[i] = Slot { key: Some(key), start, len };
        Ok(())
    }

    /// Clears every slot keyed strictly after `pos`. The segment retrying
    /// at `pos` keeps its own last successful capture; everything nested in
    /// or right of the retried region is stale.
    pub(crate) fn remove_after(&mut self, pos: usize) {
        for slot in &mut self.slots[..self.len] {
            if matches!(slot.key, Some(key) if key > pos) {
                slot.key = None;
            }
        }
    }

    pub(crate) fn set_whole(&mut self, start: usize, len: usize) {
        self.slots[0] = Slot { key: Some(0), start, len };
    }

    /// Compacts cleared slots away and orders the survivors by key, i.e.
    /// by the position of each group's opening paren. Returns the spans and
    /// their count, slot 0 included.
    pub(crate) fn compact(&self) -> ([(usize, usize); MAX_CAPTURES], usize) {
        let mut live = [Slot::default(); MAX_CAPTURES];
        let mut live_len = 0;
        for slot in &self.slots[1..self.len] {
            if slot.key.is_some() {
                live[live_len] = *slot;
                live_len += 1;
            }
        }
        for i in 1..live_len {
            let mut j = i;
            while j > 0 && live[j].key < live[j - 1].key {
                live.swap(j, j - 1);
                j -= 1;
            }
        }

        let mut spans = [(0, 0); MAX_CAPTURES];
        spans[0] = (self.slots[0].start, self.slots[0].start + self.slots[0].len);
        for (i, slot) in live[..live_len].iter().enumerate() {
            spans[i + 1] = (slot.start, slot.start + slot.len);
        }
        (spans, live_len + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_save_wins_per_key() {
        let mut caps = CapSet::new();
        caps.save(3, 0, 2).unwrap();
        caps.save(3, 4, 1).unwrap();
        caps.save(9, 5, 2).unwrap();
        caps.set_whole(0, 7);
        let (spans, len) = caps.compact();
        assert_eq!(len, 3);
        assert_eq!(&spans[..3], &[(0, 7), (4, 5), (5, 7)]);
    }

    #[test]
    fn compact_orders_by_key() {
        let mut caps = CapSet::new();
        // inner groups close before outer ones, so they save first
        caps.save(5, 2, 1).unwrap();
        caps.save(3, 1, 3).unwrap();
        caps.save(1, 0, 5).unwrap();
        caps.set_whole(0, 6);
        let (spans, len) = caps.compact();
        assert_eq!(len, 4);
        assert_eq!(&spans[..4], &[(0, 6), (0, 5), (1, 4), (2, 3)]);
    }

    #[test]
    fn remove_after_keeps_own_key() {
        let mut caps = CapSet::new();
        caps.save(3, 0, 2).unwrap();
        caps.save(7, 2, 2).unwrap();
        caps.remove_after(3);
        caps.set_whole(0, 4);
        let (spans, len) = caps.compact();
        assert_eq!(len, 2);
        assert_eq!(spans[1], (0, 2));
    }

    #[test]
    fn cleared_slots_are_reused() {
        let mut caps = CapSet::new();
        for key in 0..MAX_CAPTURES - 1 {
            caps.save(key * 10 + 1, key, 1).unwrap();
        }
        assert_eq!(caps.save(999, 0, 1), Err(ErrorKind::TooManyCaptures));
        caps.remove_after(0);
        caps.save(999, 0, 1).unwrap();
    }
}
